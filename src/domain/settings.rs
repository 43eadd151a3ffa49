use serde::{Deserialize, Serialize};

use super::QuestionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "easy" => Some(Self::Easy),
      "medium" => Some(Self::Medium),
      "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }
}

/// Game mode for a session. Boss battle adds the health/lives layer on top
/// of the normal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
  #[default]
  Standard,
  BossBattle,
}

impl QuizMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Standard => "standard",
      Self::BossBattle => "boss-battle",
    }
  }
}

/// User-chosen settings for a quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
  pub difficulty: Difficulty,
  /// Per-question time limit in seconds; 0 means unlimited.
  pub time_limit_secs: u32,
  /// Which question types generation may produce. Must be non-empty.
  pub allowed_types: Vec<QuestionType>,
  /// Persona voice used for prompt construction and unlock display.
  pub persona: String,
  /// Whether to offer the explain-back step after revealing an answer.
  pub explain_back: bool,
}

impl Default for QuizSettings {
  fn default() -> Self {
    Self {
      difficulty: Difficulty::Medium,
      time_limit_secs: 0,
      allowed_types: QuestionType::ALL.to_vec(),
      persona: "scholar".to_string(),
      explain_back: false,
    }
  }
}

impl QuizSettings {
  /// Restore the invariant that the allowed-type filter is non-empty.
  pub fn normalized(mut self) -> Self {
    if self.allowed_types.is_empty() {
      self.allowed_types = QuestionType::ALL.to_vec();
    } else {
      self.allowed_types.dedup();
    }
    self
  }

  pub fn allows(&self, question_type: QuestionType) -> bool {
    self.allowed_types.contains(&question_type)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_difficulty_roundtrip() {
    for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
      assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
    }
    assert_eq!(Difficulty::from_str("brutal"), None);
  }

  #[test]
  fn test_default_settings_allow_everything() {
    let settings = QuizSettings::default();
    assert_eq!(settings.allowed_types.len(), 7);
    for qt in QuestionType::ALL {
      assert!(settings.allows(qt));
    }
  }

  #[test]
  fn test_normalized_restores_empty_filter() {
    let settings = QuizSettings {
      allowed_types: vec![],
      ..QuizSettings::default()
    };
    let settings = settings.normalized();
    assert!(!settings.allowed_types.is_empty());
  }

  #[test]
  fn test_normalized_keeps_explicit_filter() {
    let settings = QuizSettings {
      allowed_types: vec![QuestionType::Flashcard],
      ..QuizSettings::default()
    };
    let settings = settings.normalized();
    assert_eq!(settings.allowed_types, vec![QuestionType::Flashcard]);
    assert!(!settings.allows(QuestionType::Matching));
  }
}
