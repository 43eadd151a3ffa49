//! Answer grading with tolerant matching for AI-generated questions.
//!
//! Generated option and answer text is noisy: list markers ("A. ", "1) "),
//! trailing punctuation, verbose rephrasings. Grading normalizes both sides
//! before comparing, and free-text answers additionally get containment and
//! edit-distance tolerance.

use std::collections::HashMap;

use crate::domain::{MatchingPair, QuestionType, QuizQuestion};

/// The user's response to the current question, one variant per input style.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
  /// Choice types: the selected option text.
  Selected(String),
  /// Short answer / fill-in-blank: the free-text buffer.
  Text(String),
  /// Ordering: the user's current working sequence.
  Order(Vec<String>),
  /// Matching: left item -> right item assignments.
  Matches(HashMap<String, String>),
  /// Flashcard: self-reported "got it" / "review".
  SelfReport(bool),
  /// Countdown expired before an answer was submitted.
  TimedOut,
  /// Nothing entered yet.
  Empty,
}

// ============================================================================
// Choice-type normalization
// ============================================================================

/// Strip one leading list marker: up to 3 alphanumeric chars, a separator
/// (`.`, `)`, `:`, `-`), then at least one space. The mandatory space keeps
/// decimals like "3.14" intact.
fn strip_list_marker(s: &str) -> String {
  let chars: Vec<char> = s.chars().collect();
  for (i, &ch) in chars.iter().enumerate() {
    if matches!(ch, '.' | ')' | ':' | '-') {
      if i >= 1 && i <= 3 && chars.get(i + 1) == Some(&' ') {
        return chars[i + 1..].iter().collect::<String>().trim_start().to_string();
      }
      return s.to_string();
    }
    if !ch.is_alphanumeric() || i >= 3 {
      return s.to_string();
    }
  }
  s.to_string()
}

fn strip_trailing_punctuation(s: &str) -> String {
  s.trim_end_matches(['.', ',', ';', '!']).trim_end().to_string()
}

/// Normalize an option for comparison: lowercase, trim, drop trailing
/// punctuation and a leading list marker. Applied to a fixpoint so the
/// function is idempotent.
pub fn normalize_option(s: &str) -> String {
  let mut current = s.trim().to_lowercase();
  loop {
    let next = strip_list_marker(strip_trailing_punctuation(&current).trim());
    if next == current {
      return current;
    }
    current = next;
  }
}

/// Compare a selected option against the expected answer text.
///
/// Exact match after normalization, or containment when both normalized
/// strings exceed 3 chars (tolerates verbose option text such as
/// "City of Paris" vs "Paris"). An empty expected answer never matches.
pub fn is_option_match(selected: &str, correct: &str) -> bool {
  let a = normalize_option(selected);
  let b = normalize_option(correct);
  if a.is_empty() || b.is_empty() {
    return false;
  }
  if a == b {
    return true;
  }
  a.chars().count() > 3 && b.chars().count() > 3 && (a.contains(&b) || b.contains(&a))
}

// ============================================================================
// Free-text grading
// ============================================================================

/// Normalize free text: lowercase, strip everything except word characters
/// and whitespace, collapse runs of whitespace.
pub fn normalize_text(s: &str) -> String {
  s.to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Levenshtein edit distance, char-based.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
  let a_chars: Vec<char> = a.chars().collect();
  let b_chars: Vec<char> = b.chars().collect();
  let a_len = a_chars.len();
  let b_len = b_chars.len();

  if a_len == 0 {
    return b_len;
  }
  if b_len == 0 {
    return a_len;
  }

  let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

  for (i, row) in matrix.iter_mut().enumerate() {
    row[0] = i;
  }
  for j in 0..=b_len {
    matrix[0][j] = j;
  }

  for i in 1..=a_len {
    for j in 1..=b_len {
      let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
      matrix[i][j] = (matrix[i - 1][j] + 1)
        .min(matrix[i][j - 1] + 1)
        .min(matrix[i - 1][j - 1] + cost);
    }
  }

  matrix[a_len][b_len]
}

/// Grade a free-text answer (short-answer and fill-in-blank).
///
/// Exact match after normalization, containment when the containing string
/// exceeds 3 chars, otherwise edit distance within
/// `max(2, 0.3 * max(len_user, len_correct))`. The tolerance formula is kept
/// as-is from the source behavior.
pub fn check_text_answer(user: &str, correct: &str) -> bool {
  let u = normalize_text(user);
  let c = normalize_text(correct);

  if u.is_empty() || c.is_empty() {
    return false;
  }
  if u == c {
    return true;
  }

  let u_len = u.chars().count();
  let c_len = c.chars().count();
  if (u_len > 3 && u.contains(&c)) || (c_len > 3 && c.contains(&u)) {
    return true;
  }

  let distance = levenshtein_distance(&u, &c);
  let tolerance = (0.3 * u_len.max(c_len) as f64).max(2.0);
  distance as f64 <= tolerance
}

// ============================================================================
// Sequence and assignment grading
// ============================================================================

/// Ordering is correct only on exact sequence equality with the canonical
/// items.
pub fn check_ordering(working: &[String], canonical: &[String]) -> bool {
  !canonical.is_empty() && working == canonical
}

/// Matching is correct only when every canonical left maps to its exact
/// right and no extra or missing assignments exist.
pub fn check_matching(assignments: &HashMap<String, String>, pairs: &[MatchingPair]) -> bool {
  if pairs.is_empty() || assignments.len() != pairs.len() {
    return false;
  }
  pairs
    .iter()
    .all(|pair| assignments.get(&pair.left) == Some(&pair.right))
}

// ============================================================================
// Dispatch
// ============================================================================

/// Decide correctness for one question given the user's response.
///
/// Pure and total: malformed questions (missing answers, absent item lists)
/// grade as incorrect rather than erroring.
pub fn grade(question: &QuizQuestion, response: &Response) -> bool {
  // A timeout is a forced incorrect verdict regardless of working state.
  if matches!(response, Response::TimedOut) {
    return false;
  }

  match question.question_type {
    QuestionType::MultipleChoice | QuestionType::TrueFalse => match response {
      Response::Selected(option) => is_option_match(option, &question.correct_answer),
      _ => false,
    },
    QuestionType::ShortAnswer | QuestionType::FillInBlank => match response {
      Response::Text(text) => check_text_answer(text, &question.correct_answer),
      _ => false,
    },
    QuestionType::Ordering => match (response, question.ordering_items.as_deref()) {
      (Response::Order(working), Some(canonical)) => check_ordering(working, canonical),
      _ => false,
    },
    QuestionType::Matching => match (response, question.matching_pairs.as_deref()) {
      (Response::Matches(assignments), Some(pairs)) => check_matching(assignments, pairs),
      _ => false,
    },
    QuestionType::Flashcard => match response {
      Response::SelfReport(got_it) => *got_it,
      _ => false,
    },
  }
}
