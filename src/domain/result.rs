use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
  /// Standard session, all questions answered.
  Cleared,
  /// Boss battle won (boss health reached zero).
  Victory,
  /// Boss battle lost (player ran out of lives).
  Defeat,
}

impl SessionOutcome {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "cleared" => Some(Self::Cleared),
      "victory" => Some(Self::Victory),
      "defeat" => Some(Self::Defeat),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cleared => "cleared",
      Self::Victory => "victory",
      Self::Defeat => "defeat",
    }
  }
}

/// Final record emitted once per completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
  pub total_questions: u32,
  pub correct_answers: u32,
  pub score: u32,
  pub elapsed_seconds: i64,
  pub xp_earned: u32,
  pub outcome: SessionOutcome,
}

impl QuizResult {
  pub fn accuracy(&self) -> f64 {
    if self.total_questions > 0 {
      self.correct_answers as f64 / self.total_questions as f64
    } else {
      0.0
    }
  }
}

/// One row of a user's quiz history (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryItem {
  pub id: i64,
  pub topic: String,
  pub difficulty: String,
  pub persona: String,
  pub total_questions: u32,
  pub correct_answers: u32,
  pub score: u32,
  pub xp_earned: u32,
  pub elapsed_seconds: i64,
  pub outcome: SessionOutcome,
  pub created_at: DateTime<Utc>,
}

/// Gamified per-user statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
  pub xp: u32,
  pub total_minutes: i64,
  pub streak_days: u32,
  pub last_study_date: Option<NaiveDate>,
  pub unlocked_personas: Vec<String>,
}

impl UserStats {
  /// Compute the streak after studying on `today`.
  pub fn next_streak(&self, today: NaiveDate) -> u32 {
    match self.last_study_date {
      Some(last) if last == today => self.streak_days.max(1),
      Some(last) if today.pred_opt() == Some(last) => self.streak_days + 1,
      _ => 1,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_outcome_roundtrip() {
    for o in [SessionOutcome::Cleared, SessionOutcome::Victory, SessionOutcome::Defeat] {
      assert_eq!(SessionOutcome::from_str(o.as_str()), Some(o));
    }
    assert_eq!(SessionOutcome::from_str("draw"), None);
  }

  #[test]
  fn test_accuracy() {
    let result = QuizResult {
      total_questions: 5,
      correct_answers: 4,
      score: 4,
      elapsed_seconds: 60,
      xp_earned: 40,
      outcome: SessionOutcome::Cleared,
    };
    assert!((result.accuracy() - 0.8).abs() < f64::EPSILON);
  }

  #[test]
  fn test_accuracy_zero_questions() {
    let result = QuizResult {
      total_questions: 0,
      correct_answers: 0,
      score: 0,
      elapsed_seconds: 0,
      xp_earned: 0,
      outcome: SessionOutcome::Cleared,
    };
    assert_eq!(result.accuracy(), 0.0);
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_streak_same_day_unchanged() {
    let stats = UserStats {
      streak_days: 3,
      last_study_date: Some(date(2026, 3, 10)),
      ..UserStats::default()
    };
    assert_eq!(stats.next_streak(date(2026, 3, 10)), 3);
  }

  #[test]
  fn test_streak_consecutive_day_increments() {
    let stats = UserStats {
      streak_days: 3,
      last_study_date: Some(date(2026, 3, 10)),
      ..UserStats::default()
    };
    assert_eq!(stats.next_streak(date(2026, 3, 11)), 4);
  }

  #[test]
  fn test_streak_gap_resets() {
    let stats = UserStats {
      streak_days: 9,
      last_study_date: Some(date(2026, 3, 10)),
      ..UserStats::default()
    };
    assert_eq!(stats.next_streak(date(2026, 3, 13)), 1);
  }

  #[test]
  fn test_streak_first_study() {
    let stats = UserStats::default();
    assert_eq!(stats.next_streak(date(2026, 3, 10)), 1);
  }
}
