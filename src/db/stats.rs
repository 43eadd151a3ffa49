//! Per-user gamification stats: XP, study minutes, daily streak, and the
//! persona unlocks derived from XP.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::config;
use crate::domain::{QuizResult, UserStats};

/// Load a user's stats, defaulting to zeroes for users with no row yet.
pub fn get_stats(conn: &Connection, user_id: i64) -> Result<UserStats> {
  let row = conn
    .query_row(
      "SELECT xp, total_minutes, streak_days, last_study_date FROM user_stats WHERE user_id = ?1",
      params![user_id],
      |row| {
        let last: Option<String> = row.get(3)?;
        Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?, row.get::<_, u32>(2)?, last))
      },
    )
    .optional()?;

  let (xp, total_minutes, streak_days, last_study_date) = match row {
    Some((xp, minutes, streak, last)) => {
      let last_date = last.and_then(|s| s.parse::<NaiveDate>().ok());
      (xp, minutes, streak, last_date)
    }
    None => (0, 0, 0, None),
  };

  Ok(UserStats {
    xp,
    total_minutes,
    streak_days,
    last_study_date,
    unlocked_personas: config::unlocked_personas(xp),
  })
}

/// Fold one completed quiz into a user's stats and record it in history.
/// Returns the updated stats.
pub fn apply_result(
  conn: &Connection,
  user_id: i64,
  topic: &str,
  difficulty: &str,
  persona: &str,
  mode: &str,
  result: &QuizResult,
) -> Result<UserStats> {
  let stats = get_stats(conn, user_id)?;
  let today = Utc::now().date_naive();

  let xp = stats.xp + result.xp_earned;
  let total_minutes = stats.total_minutes + result.elapsed_seconds / 60;
  let streak_days = stats.next_streak(today);

  conn.execute(
    r#"INSERT INTO user_stats (user_id, xp, total_minutes, streak_days, last_study_date)
       VALUES (?1, ?2, ?3, ?4, ?5)
       ON CONFLICT(user_id) DO UPDATE SET
         xp = excluded.xp,
         total_minutes = excluded.total_minutes,
         streak_days = excluded.streak_days,
         last_study_date = excluded.last_study_date"#,
    params![user_id, xp, total_minutes, streak_days, today.to_string()],
  )?;

  super::insert_history(conn, user_id, topic, difficulty, persona, mode, result)?;

  Ok(UserStats {
    xp,
    total_minutes,
    streak_days,
    last_study_date: Some(today),
    unlocked_personas: config::unlocked_personas(xp),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::init_test_db;
  use crate::domain::SessionOutcome;

  fn insert_user(conn: &Connection) -> i64 {
    conn
      .execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES ('alice', 'h', '2026-01-01')",
        [],
      )
      .unwrap();
    conn.last_insert_rowid()
  }

  fn result(xp: u32, elapsed: i64) -> QuizResult {
    QuizResult {
      total_questions: 5,
      correct_answers: 4,
      score: 4,
      elapsed_seconds: elapsed,
      xp_earned: xp,
      outcome: SessionOutcome::Cleared,
    }
  }

  #[test]
  fn test_stats_default_for_new_user() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);
    let stats = get_stats(&conn, user_id).unwrap();
    assert_eq!(stats.xp, 0);
    assert_eq!(stats.streak_days, 0);
    assert_eq!(stats.unlocked_personas, vec!["scholar".to_string()]);
  }

  #[test]
  fn test_apply_result_accumulates() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);

    let first = apply_result(&conn, user_id, "Rome", "easy", "scholar", "standard", &result(40, 150))
      .unwrap();
    assert_eq!(first.xp, 40);
    assert_eq!(first.total_minutes, 2);
    assert_eq!(first.streak_days, 1);

    let second = apply_result(&conn, user_id, "Rome", "easy", "scholar", "standard", &result(65, 60))
      .unwrap();
    // Same day: streak stays at 1
    assert_eq!(second.xp, 105);
    assert_eq!(second.total_minutes, 3);
    assert_eq!(second.streak_days, 1);
  }

  #[test]
  fn test_apply_result_unlocks_personas() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);

    let stats = apply_result(&conn, user_id, "Rome", "easy", "scholar", "standard", &result(300, 60))
      .unwrap();
    assert!(stats.unlocked_personas.contains(&"wizard".to_string()));
    assert!(!stats.unlocked_personas.contains(&"pirate".to_string()));
  }

  #[test]
  fn test_apply_result_writes_history() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);

    apply_result(&conn, user_id, "Rome", "easy", "scholar", "standard", &result(40, 60)).unwrap();
    let history = crate::db::list_history(&conn, user_id, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].xp_earned, 40);
  }
}
