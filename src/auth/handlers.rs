//! Authentication handlers for register, login, and logout.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::db as auth_db;
use super::middleware::SESSION_COOKIE_NAME;
use super::password;
use crate::config;
use crate::db;
use crate::session_store::generate_session_id;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsBody {
  pub username: String,
  /// Client-side SHA-256 hash of password+username (server never sees plaintext)
  pub password_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOkBody {
  pub user_id: i64,
  pub username: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
  (status, Json(json!({ "error": message }))).into_response()
}

fn session_cookie(session_id: String) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE_NAME, session_id))
    .path("/")
    .http_only(true)
    .secure(false) // Set to true in production with HTTPS
    .max_age(time::Duration::hours(config::AUTH_SESSION_HOURS))
    .build()
}

/// POST /auth/register - Create an account and sign in
pub async fn register(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(body): Json<CredentialsBody>,
) -> Response {
  let username = body.username.trim().to_string();
  if username.is_empty() || body.password_hash.is_empty() {
    return error_response(StatusCode::BAD_REQUEST, "Username and password are required");
  }

  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
  };

  match auth_db::username_exists(&conn, &username) {
    Ok(true) => return error_response(StatusCode::CONFLICT, "Username already taken"),
    Ok(false) => {}
    Err(_) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
  }

  let stored_hash = password::hash_password(&body.password_hash);
  let user_id = match auth_db::create_user(&conn, &username, &stored_hash) {
    Ok(id) => id,
    Err(e) => {
      tracing::warn!("Failed to create user {}: {}", username, e);
      return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create account");
    }
  };

  let session_id = generate_session_id();
  if auth_db::create_session(&conn, user_id, &session_id, config::AUTH_SESSION_HOURS).is_err() {
    return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session");
  }
  drop(conn);

  tracing::info!("Registered user {}", username);
  (
    jar.add(session_cookie(session_id)),
    Json(AuthOkBody { user_id, username }),
  )
    .into_response()
}

/// POST /auth/login - Sign in
pub async fn login(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(body): Json<CredentialsBody>,
) -> Response {
  if body.username.is_empty() || body.password_hash.is_empty() {
    return error_response(StatusCode::BAD_REQUEST, "Username and password are required");
  }

  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
  };

  let (user_id, stored_hash) = match auth_db::get_user_by_username(&conn, &body.username) {
    Ok(Some(user)) => user,
    Ok(None) => return error_response(StatusCode::UNAUTHORIZED, "Invalid username or password"),
    Err(_) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
  };

  if !password::verify_password(&body.password_hash, &stored_hash) {
    return error_response(StatusCode::UNAUTHORIZED, "Invalid username or password");
  }

  // Update last login time (log but don't fail on error)
  if let Err(e) = auth_db::update_last_login(&conn, user_id) {
    tracing::warn!("Failed to update last login for user {}: {}", user_id, e);
  }

  let session_id = generate_session_id();
  if auth_db::create_session(&conn, user_id, &session_id, config::AUTH_SESSION_HOURS).is_err() {
    return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session");
  }
  drop(conn);

  (
    jar.add(session_cookie(session_id)),
    Json(AuthOkBody {
      user_id,
      username: body.username,
    }),
  )
    .into_response()
}

/// POST /auth/logout - Sign out
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
  if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
    let session_id = cookie.value().to_string();
    if let Ok(conn) = db::try_lock(&state.db) {
      let _ = auth_db::delete_session(&conn, &session_id);
    }
  }

  let removal = Cookie::build((SESSION_COOKIE_NAME, ""))
    .path("/")
    .max_age(time::Duration::ZERO)
    .build();
  (jar.add(removal), Json(json!({ "ok": true }))).into_response()
}
