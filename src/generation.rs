//! Question generation seam.
//!
//! The generative API is an external collaborator: prompt text goes out,
//! structured JSON comes back. This module owns the prompt construction and
//! the tolerant parsing/sanitization of the response; the network client
//! itself lives behind the `QuestionGenerator` trait. Two offline
//! implementations are provided: a fixture bank for local use and a scripted
//! generator for tests.

use serde::Deserialize;
use std::path::PathBuf;

use crate::config;
use crate::domain::{MatchingPair, QuestionType, QuizQuestion, QuizSettings};

/// A named attachment submitted alongside free-text material.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
  pub name: String,
  pub text: String,
}

/// Everything the generator needs for one request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
  pub material: String,
  pub attachments: Vec<Attachment>,
  pub count: usize,
  pub settings: QuizSettings,
}

#[derive(Debug)]
pub enum GenerationError {
  /// The request itself failed (network, upstream error, missing fixture).
  Request(String),
  /// The response arrived but could not be parsed into usable questions.
  MalformedResponse(String),
  /// Parsing succeeded but no usable question survived sanitization.
  Empty,
}

impl std::fmt::Display for GenerationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Request(msg) => write!(f, "Generation request failed: {}", msg),
      Self::MalformedResponse(msg) => write!(f, "Malformed generation response: {}", msg),
      Self::Empty => write!(f, "Generation produced no usable questions"),
    }
  }
}

impl std::error::Error for GenerationError {}

/// External content-generation collaborator.
pub trait QuestionGenerator: Send + Sync {
  fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, GenerationError>;
}

// ============================================================================
// Prompt construction
// ============================================================================

/// Render the generation prompt for a request.
pub fn build_prompt(request: &GenerationRequest) -> String {
  let types = request
    .settings
    .allowed_types
    .iter()
    .map(|t| t.as_str())
    .collect::<Vec<_>>()
    .join(", ");

  let mut prompt = format!(
    "You are a quiz author speaking as persona '{persona}'.\n\
     Create exactly {count} quiz questions at {difficulty} difficulty.\n\
     Use only these question types: {types}.\n\
     Respond with a JSON array of objects with fields: id, type, prompt, \
     options, correctAnswer, explanation, simplifiedExplanation, hint, \
     orderingItems (3-5 items, ordering only), matchingPairs (exactly 4 \
     left/right objects, matching only), searchQuery.\n\n\
     Study material:\n{material}\n",
    persona = request.settings.persona,
    count = request.count,
    difficulty = request.settings.difficulty.as_str(),
    types = types,
    material = request.material,
  );

  for attachment in &request.attachments {
    prompt.push_str(&format!("\nAttachment {}:\n{}\n", attachment.name, attachment.text));
  }
  prompt
}

// ============================================================================
// Response parsing
// ============================================================================

/// Wire shape of one generated question. Everything except the type tag and
/// prompt is optional; the model routinely omits fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
  #[serde(default)]
  id: String,
  #[serde(rename = "type", default)]
  question_type: String,
  #[serde(default)]
  prompt: String,
  #[serde(default)]
  options: Vec<String>,
  #[serde(default)]
  correct_answer: String,
  #[serde(default)]
  explanation: String,
  #[serde(default)]
  simplified_explanation: String,
  #[serde(default)]
  hint: String,
  #[serde(default)]
  ordering_items: Option<Vec<String>>,
  #[serde(default)]
  matching_pairs: Option<Vec<MatchingPair>>,
  #[serde(default)]
  search_query: Option<String>,
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_code_fence(raw: &str) -> &str {
  let trimmed = raw.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let rest = rest.strip_prefix("json").unwrap_or(rest);
  rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a generation response into sanitized questions.
///
/// Tolerant by design: unknown type tags and structurally unusable questions
/// (ordering outside 3-5 items, matching without exactly 4 pairs, blank
/// prompt) are dropped with a warning rather than failing the batch.
pub fn parse_questions(raw: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
  let body = strip_code_fence(raw);
  let raw_questions: Vec<RawQuestion> =
    serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

  let mut questions = Vec::with_capacity(raw_questions.len());
  for (index, raw_q) in raw_questions.into_iter().enumerate() {
    match sanitize_question(raw_q, index) {
      Some(q) => questions.push(q),
      None => tracing::warn!("Dropping unusable generated question at index {}", index),
    }
  }

  if questions.is_empty() {
    return Err(GenerationError::Empty);
  }
  Ok(questions)
}

fn sanitize_question(raw: RawQuestion, index: usize) -> Option<QuizQuestion> {
  let question_type = QuestionType::from_str(&raw.question_type)?;
  if raw.prompt.trim().is_empty() {
    return None;
  }

  match question_type {
    QuestionType::Ordering => {
      let items = raw.ordering_items.as_deref().unwrap_or_default();
      if items.len() < config::ORDERING_ITEMS_MIN || items.len() > config::ORDERING_ITEMS_MAX {
        return None;
      }
    }
    QuestionType::Matching => {
      let pairs = raw.matching_pairs.as_deref().unwrap_or_default();
      if pairs.len() != config::MATCHING_PAIR_COUNT {
        return None;
      }
    }
    _ => {}
  }

  let id = if raw.id.trim().is_empty() {
    format!("q{}", index + 1)
  } else {
    raw.id
  };

  Some(QuizQuestion {
    id,
    question_type,
    prompt: raw.prompt,
    options: raw.options,
    correct_answer: raw.correct_answer,
    explanation: raw.explanation,
    simplified_explanation: raw.simplified_explanation,
    hint: raw.hint,
    ordering_items: raw.ordering_items,
    matching_pairs: raw.matching_pairs,
    search_query: raw.search_query,
  })
}

// ============================================================================
// Offline implementations
// ============================================================================

/// Serves questions from a JSON bank on disk, filtered by the allowed-type
/// set and truncated to the requested count. Stands in for the hosted API in
/// local development.
pub struct FixtureGenerator {
  path: PathBuf,
}

impl FixtureGenerator {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }
}

impl QuestionGenerator for FixtureGenerator {
  fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, GenerationError> {
    let raw = std::fs::read_to_string(&self.path)
      .map_err(|e| GenerationError::Request(format!("{}: {}", self.path.display(), e)))?;
    let mut questions: Vec<QuizQuestion> = parse_questions(&raw)?
      .into_iter()
      .filter(|q| request.settings.allows(q.question_type))
      .collect();
    questions.truncate(request.count.clamp(1, config::MAX_QUESTION_COUNT));
    if questions.is_empty() {
      return Err(GenerationError::Empty);
    }
    Ok(questions)
  }
}

/// Returns a fixed question list, or a scripted failure. Test double for the
/// external API.
pub struct ScriptedGenerator {
  outcome: Result<Vec<QuizQuestion>, String>,
}

impl ScriptedGenerator {
  pub fn with_questions(questions: Vec<QuizQuestion>) -> Self {
    Self { outcome: Ok(questions) }
  }

  pub fn failing(message: &str) -> Self {
    Self { outcome: Err(message.to_string()) }
  }
}

impl QuestionGenerator for ScriptedGenerator {
  fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, GenerationError> {
    match &self.outcome {
      Ok(questions) => {
        let mut out = questions.clone();
        out.truncate(request.count.max(1));
        if out.is_empty() {
          Err(GenerationError::Empty)
        } else {
          Ok(out)
        }
      }
      Err(message) => Err(GenerationError::Request(message.clone())),
    }
  }
}
