//! Quiz history persistence. One row per completed session, listed newest
//! first so fresh results appear at the top.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::{QuizHistoryItem, QuizResult, SessionOutcome};

/// Record a completed quiz for a user.
pub fn insert_history(
  conn: &Connection,
  user_id: i64,
  topic: &str,
  difficulty: &str,
  persona: &str,
  mode: &str,
  result: &QuizResult,
) -> Result<i64> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    r#"INSERT INTO quiz_history
       (user_id, topic, difficulty, persona, mode, total_questions, correct_answers,
        score, elapsed_seconds, xp_earned, outcome, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
    params![
      user_id,
      topic,
      difficulty,
      persona,
      mode,
      result.total_questions,
      result.correct_answers,
      result.score,
      result.elapsed_seconds,
      result.xp_earned,
      result.outcome.as_str(),
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// List a user's quiz history, newest first.
pub fn list_history(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<QuizHistoryItem>> {
  let mut stmt = conn.prepare(
    r#"SELECT id, topic, difficulty, persona, total_questions, correct_answers,
              score, elapsed_seconds, xp_earned, outcome, created_at
       FROM quiz_history
       WHERE user_id = ?1
       ORDER BY created_at DESC, id DESC
       LIMIT ?2"#,
  )?;
  let items = stmt
    .query_map(params![user_id, limit as i64], |row| {
      let outcome: String = row.get(9)?;
      let created_at: String = row.get(10)?;
      Ok(QuizHistoryItem {
        id: row.get(0)?,
        topic: row.get(1)?,
        difficulty: row.get(2)?,
        persona: row.get(3)?,
        total_questions: row.get(4)?,
        correct_answers: row.get(5)?,
        score: row.get(6)?,
        elapsed_seconds: row.get(7)?,
        xp_earned: row.get(8)?,
        outcome: SessionOutcome::from_str(&outcome).unwrap_or(SessionOutcome::Cleared),
        created_at: created_at
          .parse::<DateTime<Utc>>()
          .unwrap_or_else(|_| Utc::now()),
      })
    })?
    .filter_map(|r| r.ok())
    .collect();
  Ok(items)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::init_test_db;

  fn result(correct: u32) -> QuizResult {
    QuizResult {
      total_questions: 5,
      correct_answers: correct,
      score: correct,
      elapsed_seconds: 90,
      xp_earned: correct * 10,
      outcome: SessionOutcome::Cleared,
    }
  }

  fn insert_user(conn: &Connection) -> i64 {
    conn
      .execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES ('alice', 'h', '2026-01-01')",
        [],
      )
      .unwrap();
    conn.last_insert_rowid()
  }

  #[test]
  fn test_insert_and_list_newest_first() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);

    insert_history(&conn, user_id, "Rome", "easy", "scholar", "standard", &result(3)).unwrap();
    insert_history(&conn, user_id, "Greece", "hard", "wizard", "boss-battle", &result(5)).unwrap();

    let items = list_history(&conn, user_id, 10).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].topic, "Greece");
    assert_eq!(items[1].topic, "Rome");
    assert_eq!(items[0].correct_answers, 5);
  }

  #[test]
  fn test_list_respects_limit_and_user() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = insert_user(&conn);
    conn
      .execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES ('bob', 'h', '2026-01-01')",
        [],
      )
      .unwrap();
    let other_id = conn.last_insert_rowid();

    for i in 0..5 {
      insert_history(&conn, user_id, &format!("t{}", i), "medium", "scholar", "standard", &result(1))
        .unwrap();
    }
    insert_history(&conn, other_id, "other", "medium", "scholar", "standard", &result(1)).unwrap();

    let items = list_history(&conn, user_id, 3).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i.topic != "other"));
  }
}
