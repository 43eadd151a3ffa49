//! Router assembly, shared between the binary and integration tests.

use axum::{
  Router,
  routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
  Router::new()
    .route("/auth/register", post(auth::register))
    .route("/auth/login", post(auth::login))
    .route("/auth/logout", post(auth::logout))
    .route("/quiz/start", post(handlers::start_quiz))
    .route("/quiz/{id}", get(handlers::get_quiz))
    .route("/quiz/{id}", delete(handlers::abandon_quiz))
    .route("/quiz/{id}/answer", post(handlers::answer_quiz))
    .route("/quiz/{id}/submit", post(handlers::submit_quiz))
    .route("/quiz/{id}/advance", post(handlers::advance_quiz))
    .route("/quiz/{id}/tick", post(handlers::tick_quiz))
    .route("/quiz/{id}/explain", post(handlers::explain_quiz))
    .route("/history", get(handlers::history))
    .route("/progress", get(handlers::progress))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
