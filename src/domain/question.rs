use serde::{Deserialize, Serialize};

/// The seven supported question types.
///
/// Grading and presentation both match exhaustively on this enum, so a new
/// type cannot silently fall through to some default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
  MultipleChoice,
  TrueFalse,
  ShortAnswer,
  Ordering,
  Matching,
  FillInBlank,
  Flashcard,
}

impl QuestionType {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "multiple-choice" => Some(Self::MultipleChoice),
      "true-false" => Some(Self::TrueFalse),
      "short-answer" => Some(Self::ShortAnswer),
      "ordering" => Some(Self::Ordering),
      "matching" => Some(Self::Matching),
      "fill-in-blank" => Some(Self::FillInBlank),
      "flashcard" => Some(Self::Flashcard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multiple-choice",
      Self::TrueFalse => "true-false",
      Self::ShortAnswer => "short-answer",
      Self::Ordering => "ordering",
      Self::Matching => "matching",
      Self::FillInBlank => "fill-in-blank",
      Self::Flashcard => "flashcard",
    }
  }

  /// Choice-style types carry an option list.
  pub fn has_options(&self) -> bool {
    matches!(self, Self::MultipleChoice | Self::TrueFalse)
  }

  /// Flashcards are self-reported and never run against the countdown.
  pub fn supports_timing(&self) -> bool {
    !matches!(self, Self::Flashcard)
  }

  pub const ALL: [QuestionType; 7] = [
    Self::MultipleChoice,
    Self::TrueFalse,
    Self::ShortAnswer,
    Self::Ordering,
    Self::Matching,
    Self::FillInBlank,
    Self::Flashcard,
  ];
}

/// One left/right pairing of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
  pub left: String,
  pub right: String,
}

/// A single generated quiz question.
///
/// `correct_answer` semantics vary by type: the literal option text for
/// choice types, the expected text for short-answer, the missing token for
/// fill-in-blank, the back of the card for flashcards. Ordering and matching
/// ignore it entirely; `ordering_items`/`matching_pairs` are authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: String,
  #[serde(rename = "type")]
  pub question_type: QuestionType,
  pub prompt: String,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub simplified_explanation: String,
  #[serde(default)]
  pub hint: String,
  /// Canonical sequence for ordering questions (3-5 items).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ordering_items: Option<Vec<String>>,
  /// Canonical pairs for matching questions (exactly 4).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub matching_pairs: Option<Vec<MatchingPair>>,
  /// Suggested external search query for further reading.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub search_query: Option<String>,
}

impl QuizQuestion {
  pub fn new(id: impl Into<String>, question_type: QuestionType, prompt: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      question_type,
      prompt: prompt.into(),
      options: Vec::new(),
      correct_answer: String::new(),
      explanation: String::new(),
      simplified_explanation: String::new(),
      hint: String::new(),
      ordering_items: None,
      matching_pairs: None,
      search_query: None,
    }
  }

  /// Right-hand column of a matching question, in canonical order.
  pub fn matching_rights(&self) -> Vec<String> {
    self
      .matching_pairs
      .as_deref()
      .unwrap_or_default()
      .iter()
      .map(|p| p.right.clone())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_question_type_from_str() {
    assert_eq!(QuestionType::from_str("multiple-choice"), Some(QuestionType::MultipleChoice));
    assert_eq!(QuestionType::from_str("true-false"), Some(QuestionType::TrueFalse));
    assert_eq!(QuestionType::from_str("short-answer"), Some(QuestionType::ShortAnswer));
    assert_eq!(QuestionType::from_str("ordering"), Some(QuestionType::Ordering));
    assert_eq!(QuestionType::from_str("matching"), Some(QuestionType::Matching));
    assert_eq!(QuestionType::from_str("fill-in-blank"), Some(QuestionType::FillInBlank));
    assert_eq!(QuestionType::from_str("flashcard"), Some(QuestionType::Flashcard));
  }

  #[test]
  fn test_question_type_from_str_invalid() {
    assert_eq!(QuestionType::from_str("essay"), None);
    assert_eq!(QuestionType::from_str(""), None);
    assert_eq!(QuestionType::from_str("Multiple-Choice"), None);
  }

  #[test]
  fn test_question_type_roundtrip() {
    for qt in QuestionType::ALL {
      assert_eq!(QuestionType::from_str(qt.as_str()), Some(qt));
    }
  }

  #[test]
  fn test_supports_timing() {
    assert!(QuestionType::MultipleChoice.supports_timing());
    assert!(QuestionType::Ordering.supports_timing());
    assert!(!QuestionType::Flashcard.supports_timing());
  }

  #[test]
  fn test_question_defaults() {
    let q = QuizQuestion::new("q1", QuestionType::ShortAnswer, "Capital of France?");
    assert_eq!(q.id, "q1");
    assert!(q.options.is_empty());
    assert!(q.correct_answer.is_empty());
    assert!(q.ordering_items.is_none());
    assert!(q.matching_pairs.is_none());
  }

  #[test]
  fn test_matching_rights_order() {
    let mut q = QuizQuestion::new("q1", QuestionType::Matching, "Match");
    q.matching_pairs = Some(vec![
      MatchingPair { left: "a".into(), right: "1".into() },
      MatchingPair { left: "b".into(), right: "2".into() },
    ]);
    assert_eq!(q.matching_rights(), vec!["1".to_string(), "2".to_string()]);
  }

  #[test]
  fn test_wire_deserialization_tolerates_missing_fields() {
    let json = r#"{"id":"x","type":"multiple-choice","prompt":"Pick one"}"#;
    let q: QuizQuestion = serde_json::from_str(json).expect("should parse");
    assert_eq!(q.question_type, QuestionType::MultipleChoice);
    assert!(q.correct_answer.is_empty());
    assert!(q.hint.is_empty());
  }
}
