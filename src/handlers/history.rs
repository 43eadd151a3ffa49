//! Quiz history listing.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthContext;
use crate::db::{self, LogOnError};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct HistoryQuery {
  #[serde(default)]
  pub limit: Option<usize>,
}

/// GET /history - Completed quizzes, newest first
pub async fn history(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<HistoryQuery>,
) -> Response {
  let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);

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

  let items = db::list_history(&conn, auth.user_id, limit)
    .log_warn_default("Failed to load quiz history");
  Json(items).into_response()
}
