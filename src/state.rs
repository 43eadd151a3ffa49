//! Shared application state passed to all handlers.

use std::sync::Arc;

use crate::db::DbPool;
use crate::explain::ExplanationReviewer;
use crate::generation::QuestionGenerator;

#[derive(Clone)]
pub struct AppState {
  pub db: DbPool,
  pub generator: Arc<dyn QuestionGenerator>,
  pub reviewer: Arc<dyn ExplanationReviewer>,
}

impl AppState {
  pub fn new(
    db: DbPool,
    generator: Arc<dyn QuestionGenerator>,
    reviewer: Arc<dyn ExplanationReviewer>,
  ) -> Self {
    Self { db, generator, reviewer }
  }
}
