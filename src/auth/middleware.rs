//! Authentication middleware and extractors.

use axum::{
  Json,
  extract::FromRequestParts,
  http::{StatusCode, request::Parts},
  response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::db as auth_db;
use crate::db;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "qf_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Responds 401 if the session cookie is missing or invalid.
#[derive(Clone)]
pub struct AuthContext {
  pub user_id: i64,
  pub username: String,
}

fn unauthorized() -> Response {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "error": "Not signed in" })),
  )
    .into_response()
}

fn db_error() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "Database error" })),
  )
    .into_response()
}

impl FromRequestParts<AppState> for AuthContext {
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    // Extract cookies
    let jar = CookieJar::from_request_parts(parts, state)
      .await
      .map_err(|_| unauthorized())?;

    // Get session cookie
    let session_id = jar
      .get(SESSION_COOKIE_NAME)
      .map(|c| c.value().to_string())
      .ok_or_else(unauthorized)?;

    // Validate session
    let conn = db::try_lock(&state.db).map_err(|_| db_error())?;
    let (user_id, username) = auth_db::get_session_user(&conn, &session_id)
      .map_err(|_| db_error())?
      .ok_or_else(unauthorized)?;

    Ok(AuthContext { user_id, username })
  }
}
