//! In-memory storage for active quiz sessions.
//!
//! Stores QuizSession state keyed by a generated quiz ID. Entries belong to
//! the user who started the quiz and auto-expire after a configurable
//! duration of inactivity.

use crate::config;
use crate::quiz::QuizSession;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Session entry with owner, display topic, and last access time
struct SessionEntry {
  session: QuizSession,
  user_id: i64,
  topic: String,
  last_access: DateTime<Utc>,
}

/// Global session store
static SESSIONS: LazyLock<Mutex<HashMap<String, SessionEntry>>> =
  LazyLock::new(|| Mutex::new(HashMap::new()));

/// Insert a freshly started session and return its ID.
pub fn insert(user_id: i64, topic: &str, session: QuizSession) -> String {
  let mut sessions = SESSIONS.lock().expect("Session store lock poisoned");

  // Clean up expired sessions occasionally (~10% chance)
  if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
    cleanup_expired(&mut sessions);
  }

  let quiz_id = generate_session_id();
  sessions.insert(
    quiz_id.clone(),
    SessionEntry {
      session,
      user_id,
      topic: topic.to_string(),
      last_access: Utc::now(),
    },
  );
  quiz_id
}

/// The topic the session was started on, for history display.
pub fn topic(quiz_id: &str, user_id: i64) -> Option<String> {
  let sessions = SESSIONS.lock().expect("Session store lock poisoned");
  match sessions.get(quiz_id) {
    Some(entry) if entry.user_id == user_id => Some(entry.topic.clone()),
    _ => None,
  }
}

/// Run a closure against a stored session, refreshing its access time.
/// Returns None if the session does not exist or belongs to another user.
pub fn with_session<T>(
  quiz_id: &str,
  user_id: i64,
  f: impl FnOnce(&mut QuizSession) -> T,
) -> Option<T> {
  let mut sessions = SESSIONS.lock().expect("Session store lock poisoned");
  let entry = sessions.get_mut(quiz_id)?;
  if entry.user_id != user_id {
    return None;
  }
  entry.last_access = Utc::now();
  Some(f(&mut entry.session))
}

/// Remove a session, returning it if it existed and belonged to the user.
pub fn remove(quiz_id: &str, user_id: i64) -> Option<QuizSession> {
  let mut sessions = SESSIONS.lock().expect("Session store lock poisoned");
  match sessions.get(quiz_id) {
    Some(entry) if entry.user_id == user_id => {
      sessions.remove(quiz_id).map(|entry| entry.session)
    }
    _ => None,
  }
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  sessions.retain(|_, entry| entry.last_access > expiry);
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
