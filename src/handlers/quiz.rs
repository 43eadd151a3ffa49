//! Quiz lifecycle handlers: start a session, inspect it, feed it input, and
//! drive it through submit / advance / tick until a final result.
//!
//! Sessions live in the in-memory store keyed by quiz ID; only the terminal
//! result touches the database. Views never leak the correct answer or the
//! explanation while the current question is still unanswered.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, LogOnError};
use crate::domain::{QuestionType, QuizMode, QuizQuestion, QuizResult, QuizSettings, UserStats};
use crate::explain::{self, ExplainVerdict};
use crate::generation::{Attachment, GenerationError, GenerationRequest};
use crate::quiz::{AdvanceOutcome, BattleState, QuestionPhase, QuizSession, TickOutcome, WorkingState};
use crate::session_store;
use crate::state::AppState;

// ===== Request bodies =====

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizBody {
  pub material: String,
  #[serde(default)]
  pub attachments: Vec<Attachment>,
  #[serde(default)]
  pub count: Option<usize>,
  #[serde(default)]
  pub settings: QuizSettings,
  #[serde(default)]
  pub mode: QuizMode,
}

/// One interaction with the current question's working state.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase", tag = "action")]
pub enum AnswerAction {
  Select { option: String },
  Text { text: String },
  Move { from: usize, to: usize },
  TapLeft { left: String },
  TapRight { right: String },
  Flashcard { got_it: bool },
}

#[derive(Deserialize)]
pub struct ExplainBody {
  pub attempt: String,
}

// ===== Views =====

/// What the client sees of one question. Answer fields are withheld until
/// the question is revealed; the flashcard back is the card itself, so it is
/// always present for flashcards.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
  pub id: String,
  #[serde(rename = "type")]
  pub question_type: QuestionType,
  pub prompt: String,
  pub options: Vec<String>,
  pub hint: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub correct_answer: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub simplified_explanation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub search_query: Option<String>,
  pub matching_lefts: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
  pub quiz_id: String,
  pub current_index: usize,
  pub total_questions: usize,
  pub score: u32,
  pub mode: QuizMode,
  pub phase: QuestionPhase,
  pub question: QuestionView,
  pub working: WorkingState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub battle: Option<BattleState>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time_remaining: Option<u32>,
  pub explain_back: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedView {
  pub quiz_id: String,
  pub result: QuizResult,
  pub stats: UserStats,
}

fn question_view(question: &QuizQuestion, revealed: bool) -> QuestionView {
  let show_answer = revealed || question.question_type == QuestionType::Flashcard;
  QuestionView {
    id: question.id.clone(),
    question_type: question.question_type,
    prompt: question.prompt.clone(),
    options: question.options.clone(),
    hint: question.hint.clone(),
    correct_answer: show_answer.then(|| question.correct_answer.clone()),
    explanation: revealed.then(|| question.explanation.clone()),
    simplified_explanation: revealed.then(|| question.simplified_explanation.clone()),
    search_query: if revealed { question.search_query.clone() } else { None },
    matching_lefts: question
      .matching_pairs
      .as_deref()
      .unwrap_or_default()
      .iter()
      .map(|p| p.left.clone())
      .collect(),
  }
}

fn session_view(quiz_id: &str, session: &QuizSession) -> SessionView {
  let revealed = matches!(session.phase(), QuestionPhase::Revealed { .. });
  SessionView {
    quiz_id: quiz_id.to_string(),
    current_index: session.current_index(),
    total_questions: session.total_questions(),
    score: session.score(),
    mode: session.mode(),
    phase: session.phase(),
    question: question_view(session.current_question(), revealed),
    working: session.working().clone(),
    battle: session.battle().copied(),
    time_remaining: session.time_remaining(),
    explain_back: session.settings().explain_back,
  }
}

// ===== Error helpers =====

fn error_response(status: StatusCode, message: &str) -> Response {
  (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
  error_response(StatusCode::NOT_FOUND, "Quiz not found")
}

/// Short history label: first line of the material, or the first attachment
/// name when no free text was given.
fn derive_topic(material: &str, attachments: &[Attachment]) -> String {
  let line = material.lines().map(str::trim).find(|l| !l.is_empty());
  let topic = match line {
    Some(line) => line,
    None => attachments.first().map(|a| a.name.as_str()).unwrap_or("Study session"),
  };
  topic.chars().take(60).collect::<String>().trim_end().to_string()
}

// ===== Handlers =====

/// POST /quiz/start - Generate questions and open a session.
/// A generation failure leaves no session behind; the client may retry.
pub async fn start_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<StartQuizBody>,
) -> Response {
  if body.material.trim().is_empty() && body.attachments.is_empty() {
    return error_response(StatusCode::BAD_REQUEST, "Provide study material to quiz on");
  }

  let count = body
    .count
    .unwrap_or(config::DEFAULT_QUESTION_COUNT)
    .clamp(1, config::MAX_QUESTION_COUNT);
  let settings = body.settings.normalized();

  let request = GenerationRequest {
    material: body.material,
    attachments: body.attachments,
    count,
    settings: settings.clone(),
  };

  let questions = match state.generator.generate(&request) {
    Ok(questions) => questions,
    Err(e @ (GenerationError::Request(_) | GenerationError::Empty)) => {
      tracing::warn!("Question generation failed for user {}: {}", auth.user_id, e);
      return error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Could not generate questions right now, please try again",
      );
    }
    Err(e @ GenerationError::MalformedResponse(_)) => {
      tracing::warn!("Question generation failed for user {}: {}", auth.user_id, e);
      return error_response(
        StatusCode::BAD_GATEWAY,
        "Question generation returned an unusable response, please try again",
      );
    }
  };

  let seed = rand::random::<u64>();
  let session = match QuizSession::new(questions, settings, body.mode, seed) {
    Ok(session) => session,
    Err(e) => {
      tracing::warn!("Could not open session: {}", e);
      return error_response(StatusCode::SERVICE_UNAVAILABLE, "Could not start the quiz");
    }
  };

  let topic = derive_topic(&request.material, &request.attachments);
  let quiz_id = session_store::insert(auth.user_id, &topic, session);
  tracing::info!("User {} started quiz {}", auth.user_id, quiz_id);

  match session_store::with_session(&quiz_id, auth.user_id, |s| session_view(&quiz_id, s)) {
    Some(view) => (StatusCode::CREATED, Json(view)).into_response(),
    None => not_found(),
  }
}

/// GET /quiz/{id} - Current session view
pub async fn get_quiz(
  State(_state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
) -> Response {
  match session_store::with_session(&quiz_id, auth.user_id, |s| session_view(&quiz_id, s)) {
    Some(view) => Json(view).into_response(),
    None => not_found(),
  }
}

/// POST /quiz/{id}/answer - Mutate the current question's working state.
/// Inputs arriving after reveal are ignored; the updated view is returned
/// either way.
pub async fn answer_quiz(
  State(_state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
  Json(action): Json<AnswerAction>,
) -> Response {
  let view = session_store::with_session(&quiz_id, auth.user_id, |session| {
    match action {
      AnswerAction::Select { option } => session.select_option(&option),
      AnswerAction::Text { text } => session.set_text(&text),
      AnswerAction::Move { from, to } => session.move_item(from, to),
      AnswerAction::TapLeft { left } => session.tap_left(&left),
      AnswerAction::TapRight { right } => session.tap_right(&right),
      AnswerAction::Flashcard { got_it } => session.set_self_report(got_it),
    }
    session_view(&quiz_id, session)
  });
  match view {
    Some(view) => Json(view).into_response(),
    None => not_found(),
  }
}

/// POST /quiz/{id}/submit - Grade the current question and reveal
pub async fn submit_quiz(
  State(_state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
) -> Response {
  // A submit on an already-revealed question is a no-op; the current view
  // is returned either way.
  let view = session_store::with_session(&quiz_id, auth.user_id, |session| {
    session.submit();
    session_view(&quiz_id, session)
  });
  match view {
    Some(view) => Json(view).into_response(),
    None => not_found(),
  }
}

/// POST /quiz/{id}/advance - Move to the next question or finish.
/// On finish the result is folded into the user's stats and the session is
/// dropped from the store.
pub async fn advance_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
) -> Response {
  let topic = session_store::topic(&quiz_id, auth.user_id);
  let outcome = session_store::with_session(&quiz_id, auth.user_id, |session| {
    let outcome = session.advance();
    let context = (
      session.settings().difficulty.as_str(),
      session.settings().persona.clone(),
      session.mode().as_str(),
    );
    (outcome, session_view(&quiz_id, session), context)
  });

  let (Some((outcome, view, (difficulty, persona, mode))), Some(topic)) = (outcome, topic) else {
    return not_found();
  };

  match outcome {
    None => error_response(StatusCode::CONFLICT, "Submit an answer before advancing"),
    Some(AdvanceOutcome::Next) => Json(view).into_response(),
    Some(AdvanceOutcome::Finished(result)) => {
      session_store::remove(&quiz_id, auth.user_id);

      let stats = match db::try_lock(&state.db) {
        Ok(conn) => db::apply_result(
          &conn,
          auth.user_id,
          &topic,
          difficulty,
          &persona,
          mode,
          &result,
        )
        .log_warn("Failed to record quiz result")
        .unwrap_or_default(),
        Err(_) => UserStats::default(),
      };

      tracing::info!(
        "User {} finished quiz {}: {}/{} ({})",
        auth.user_id,
        quiz_id,
        result.correct_answers,
        result.total_questions,
        result.outcome.as_str()
      );

      Json(FinishedView { quiz_id, result, stats }).into_response()
    }
  }
}

/// POST /quiz/{id}/tick - One-second countdown pulse from the client
pub async fn tick_quiz(
  State(_state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
) -> Response {
  let outcome = session_store::with_session(&quiz_id, auth.user_id, |session| {
    let tick = session.tick();
    (tick, session_view(&quiz_id, session))
  });
  match outcome {
    Some((tick, view)) => {
      let expired = tick == TickOutcome::Expired;
      Json(json!({ "expired": expired, "session": view })).into_response()
    }
    None => not_found(),
  }
}

/// POST /quiz/{id}/explain - Review a restated explanation.
/// Only meaningful after reveal; the verdict never blocks the session.
pub async fn explain_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
  Json(body): Json<ExplainBody>,
) -> Response {
  let explanation = session_store::with_session(&quiz_id, auth.user_id, |session| {
    match session.phase() {
      QuestionPhase::Revealed { .. } => Some(session.current_question().explanation.clone()),
      QuestionPhase::Unanswered => None,
    }
  });

  match explanation {
    Some(Some(explanation)) => {
      let verdict: ExplainVerdict =
        explain::review_or_fallback(state.reviewer.as_ref(), &explanation, &body.attempt);
      Json(verdict).into_response()
    }
    Some(None) => error_response(StatusCode::CONFLICT, "Reveal the answer before explaining it back"),
    None => not_found(),
  }
}

/// DELETE /quiz/{id} - Abandon a session without recording a result
pub async fn abandon_quiz(
  State(_state): State<AppState>,
  auth: AuthContext,
  Path(quiz_id): Path<String>,
) -> Response {
  match session_store::remove(&quiz_id, auth.user_id) {
    Some(_) => {
      tracing::info!("User {} abandoned quiz {}", auth.user_id, quiz_id);
      Json(json!({ "ok": true })).into_response()
    }
    None => not_found(),
  }
}
