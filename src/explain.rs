//! Explain-back review seam.
//!
//! After revealing an answer the learner can restate the explanation in
//! their own words; a collaborator judges whether the restatement captures
//! the idea. Review failures never block the session: a failed call degrades
//! to an unverified verdict and the quiz moves on.

use serde::Serialize;

use crate::grading::normalize_text;

/// Judgement on a learner's restated explanation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainVerdict {
  pub correct: bool,
  pub feedback: String,
}

#[derive(Debug)]
pub struct ReviewError(pub String);

impl std::fmt::Display for ReviewError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Explanation review failed: {}", self.0)
  }
}

impl std::error::Error for ReviewError {}

/// External collaborator that reviews restated explanations.
pub trait ExplanationReviewer: Send + Sync {
  fn review(&self, explanation: &str, attempt: &str) -> Result<ExplainVerdict, ReviewError>;
}

/// Review an attempt, degrading to an unverified verdict if the collaborator
/// fails. The session never stalls on review errors.
pub fn review_or_fallback(
  reviewer: &dyn ExplanationReviewer,
  explanation: &str,
  attempt: &str,
) -> ExplainVerdict {
  match reviewer.review(explanation, attempt) {
    Ok(verdict) => verdict,
    Err(e) => {
      tracing::warn!("Explanation review unavailable: {}", e);
      ExplainVerdict {
        correct: false,
        feedback: "Your explanation could not be verified right now. Review the \
                   explanation above and keep going."
          .to_string(),
      }
    }
  }
}

/// Keyword-overlap heuristic reviewer. Counts how many significant words of
/// the reference explanation appear in the attempt; half or more passes.
pub struct KeywordReviewer;

impl ExplanationReviewer for KeywordReviewer {
  fn review(&self, explanation: &str, attempt: &str) -> Result<ExplainVerdict, ReviewError> {
    let attempt_norm = normalize_text(attempt);
    if attempt_norm.is_empty() {
      return Ok(ExplainVerdict {
        correct: false,
        feedback: "Try restating the explanation in your own words.".to_string(),
      });
    }

    let attempt_words: Vec<&str> = attempt_norm.split_whitespace().collect();
    let reference = normalize_text(explanation);
    let keywords: Vec<&str> = reference.split_whitespace().filter(|w| w.len() > 3).collect();

    if keywords.is_empty() {
      // Nothing substantive to check against; accept any real attempt.
      return Ok(ExplainVerdict {
        correct: true,
        feedback: "Nice restatement.".to_string(),
      });
    }

    let hits = keywords.iter().filter(|k| attempt_words.contains(k)).count();
    let correct = hits * 2 >= keywords.len();
    let feedback = if correct {
      "Good, that captures the key idea.".to_string()
    } else {
      "Not quite, you are missing part of the idea. Reread the explanation and try again."
        .to_string()
    };
    Ok(ExplainVerdict { correct, feedback })
  }
}
