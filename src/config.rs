//! Application configuration constants and file-based settings.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
  database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
  path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
  // Load .env file if present
  let _ = dotenvy::dotenv();

  // Priority 1: config.toml
  if let Ok(contents) = std::fs::read_to_string("config.toml")
    && let Ok(config) = toml::from_str::<AppConfig>(&contents)
    && let Some(db) = config.database
    && let Some(path) = db.path
  {
    tracing::info!("Using database from config.toml: {}", path);
    return PathBuf::from(path);
  }

  // Priority 2: .env DATABASE_PATH
  if let Ok(path) = std::env::var("DATABASE_PATH") {
    tracing::info!("Using database from DATABASE_PATH env: {}", path);
    return PathBuf::from(path);
  }

  let default = PathBuf::from("data/quizforge.db");
  tracing::info!("Using default database path: {}", default.display());
  default
}

/// Path of the bundled offline question bank used by the fixture generator.
pub fn question_bank_path() -> PathBuf {
  std::env::var("QUESTION_BANK_PATH")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("data/sample_questions.json"))
}

// ==================== Server Configuration ====================

pub const SERVER_ADDR: &str = "0.0.0.0";

pub const SERVER_PORT: u16 = 3000;

pub fn server_bind_addr() -> String {
  format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Session Configuration ====================

/// Idle quiz sessions expire after this many hours
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Login cookie lifetime in hours (1 week)
pub const AUTH_SESSION_HOURS: i64 = 24 * 7;

// ==================== Quiz Configuration ====================

/// Default number of questions per generated quiz
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Upper bound on questions per quiz
pub const MAX_QUESTION_COUNT: usize = 20;

/// Valid item counts for an ordering question
pub const ORDERING_ITEMS_MIN: usize = 3;
pub const ORDERING_ITEMS_MAX: usize = 5;

/// A matching question carries exactly this many pairs
pub const MATCHING_PAIR_COUNT: usize = 4;

// ==================== Gamification ====================

pub const XP_PER_CORRECT: u32 = 10;

/// Bonus for answering every question correctly
pub const PERFECT_BONUS_XP: u32 = 25;

/// Bonus for defeating the boss
pub const BATTLE_VICTORY_XP: u32 = 50;

/// XP divisor applied when a battle ends in defeat
pub const DEFEAT_XP_DIVISOR: u32 = 2;

/// Player lives in boss-battle mode
pub const PLAYER_LIVES: u32 = 3;

/// Boss starting health; each correct answer deals health/total damage
pub const BOSS_MAX_HEALTH: f64 = 100.0;

// ==================== Personas ====================

/// A quiz persona and the XP required to unlock it
pub struct PersonaInfo {
  pub tag: &'static str,
  pub name: &'static str,
  pub xp_required: u32,
}

pub const PERSONAS: [PersonaInfo; 4] = [
  PersonaInfo { tag: "scholar", name: "The Scholar", xp_required: 0 },
  PersonaInfo { tag: "wizard", name: "The Wizard", xp_required: 250 },
  PersonaInfo { tag: "pirate", name: "The Pirate", xp_required: 750 },
  PersonaInfo { tag: "dragon", name: "The Dragon", xp_required: 2000 },
];

/// Persona tags unlocked at the given XP total
pub fn unlocked_personas(xp: u32) -> Vec<String> {
  PERSONAS
    .iter()
    .filter(|p| xp >= p.xp_required)
    .map(|p| p.tag.to_string())
    .collect()
}

pub fn get_persona(tag: &str) -> Option<&'static PersonaInfo> {
  PERSONAS.iter().find(|p| p.tag == tag)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unlocked_personas_at_zero() {
    assert_eq!(unlocked_personas(0), vec!["scholar".to_string()]);
  }

  #[test]
  fn test_unlocked_personas_thresholds() {
    let unlocked = unlocked_personas(800);
    assert!(unlocked.contains(&"wizard".to_string()));
    assert!(unlocked.contains(&"pirate".to_string()));
    assert!(!unlocked.contains(&"dragon".to_string()));
  }

  #[test]
  fn test_get_persona() {
    assert_eq!(get_persona("wizard").map(|p| p.xp_required), Some(250));
    assert!(get_persona("ninja").is_none());
  }
}
