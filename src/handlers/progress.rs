//! User progress: XP, streak, study time, and persona unlock status.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, LogOnError};
use crate::domain::UserStats;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaView {
  pub tag: &'static str,
  pub name: &'static str,
  pub xp_required: u32,
  pub unlocked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
  pub stats: UserStats,
  pub personas: Vec<PersonaView>,
}

/// GET /progress - Stats and the full persona ladder
pub async fn progress(State(state): State<AppState>, auth: AuthContext) -> Response {
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => {
      return (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Database error" })),
      )
        .into_response();
    }
  };

  let stats = db::get_stats(&conn, auth.user_id).log_warn_default("Failed to load user stats");
  let personas = config::PERSONAS
    .iter()
    .map(|p| PersonaView {
      tag: p.tag,
      name: p.name,
      xp_required: p.xp_required,
      unlocked: stats.xp >= p.xp_required,
    })
    .collect();

  Json(ProgressView { stats, personas }).into_response()
}
