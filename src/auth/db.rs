//! Auth database operations (users and auth_sessions tables).

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, Result};

/// Create a new user, returns the user ID
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
    params![username, password_hash, now],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Get user by username, returns (user_id, password_hash)
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<(i64, String)>> {
  let mut stmt = conn.prepare("SELECT id, password_hash FROM users WHERE username = ?1")?;
  let result = stmt.query_row(params![username], |row| Ok((row.get(0)?, row.get(1)?)));
  match result {
    Ok(user) => Ok(Some(user)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e),
  }
}

/// Check if a username already exists
pub fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM users WHERE username = ?1",
    params![username],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}

/// Create a new auth session
pub fn create_session(
  conn: &Connection,
  user_id: i64,
  session_id: &str,
  duration_hours: i64,
) -> Result<()> {
  let now = Utc::now();
  let expires = now + Duration::hours(duration_hours);
  conn.execute(
    "INSERT INTO auth_sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      session_id,
      user_id,
      now.to_rfc3339(),
      expires.to_rfc3339(),
      now.to_rfc3339()
    ],
  )?;
  Ok(())
}

/// Validate session and get user info, returns (user_id, username)
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<(i64, String)>> {
  let now = Utc::now().to_rfc3339();
  let mut stmt = conn.prepare(
    r#"
    SELECT u.id, u.username
    FROM auth_sessions s
    JOIN users u ON s.user_id = u.id
    WHERE s.id = ?1 AND s.expires_at > ?2
  "#,
  )?;
  let result = stmt.query_row(params![session_id, now], |row| Ok((row.get(0)?, row.get(1)?)));
  match result {
    Ok((user_id, username)) => {
      // Update last access time
      let _ = conn.execute(
        "UPDATE auth_sessions SET last_access_at = ?1 WHERE id = ?2",
        params![now, session_id],
      );
      Ok(Some((user_id, username)))
    }
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e),
  }
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
  conn.execute("DELETE FROM auth_sessions WHERE id = ?1", params![session_id])?;
  Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
  let now = Utc::now().to_rfc3339();
  let count = conn.execute("DELETE FROM auth_sessions WHERE expires_at < ?1", params![now])?;
  Ok(count)
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
    params![now, user_id],
  )?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::init_test_db;

  #[test]
  fn test_create_user_and_lookup() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let id = create_user(&conn, "alice", "hash").unwrap();
    assert!(username_exists(&conn, "alice").unwrap());
    let (found_id, hash) = get_user_by_username(&conn, "alice").unwrap().unwrap();
    assert_eq!(found_id, id);
    assert_eq!(hash, "hash");
    assert!(get_user_by_username(&conn, "bob").unwrap().is_none());
  }

  #[test]
  fn test_username_unique_case_insensitive() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    create_user(&conn, "Alice", "hash").unwrap();
    assert!(create_user(&conn, "alice", "hash2").is_err());
  }

  #[test]
  fn test_session_lifecycle() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = create_user(&conn, "alice", "hash").unwrap();

    create_session(&conn, user_id, "sess1", 24).unwrap();
    let (found_id, username) = get_session_user(&conn, "sess1").unwrap().unwrap();
    assert_eq!(found_id, user_id);
    assert_eq!(username, "alice");

    delete_session(&conn, "sess1").unwrap();
    assert!(get_session_user(&conn, "sess1").unwrap().is_none());
  }

  #[test]
  fn test_expired_session_rejected() {
    let pool = init_test_db();
    let conn = pool.lock().unwrap();
    let user_id = create_user(&conn, "alice", "hash").unwrap();
    create_session(&conn, user_id, "old", -1).unwrap();
    assert!(get_session_user(&conn, "old").unwrap().is_none());
    assert_eq!(cleanup_expired_sessions(&conn).unwrap(), 1);
  }
}
