//! Per-question transient working state.
//!
//! Rebuilt from the canonical question data every time the active index
//! changes and discarded on advance; nothing here is ever persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{QuestionType, QuizQuestion};
use crate::grading::Response;
use crate::shuffle::shuffled;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingState {
  /// Choice types: currently selected option text.
  pub selected_option: Option<String>,
  /// Free-text buffer for short-answer / fill-in-blank.
  pub text_input: String,
  /// Ordering: the user's working sequence (starts shuffled).
  pub order: Vec<String>,
  /// Matching: right-hand column in presented (shuffled) order.
  pub match_targets: Vec<String>,
  /// Matching: left -> right assignments made so far.
  pub assignments: HashMap<String, String>,
  /// Matching: left item awaiting a right-hand tap.
  pub selected_left: Option<String>,
  /// Flashcard self-report, set by the got-it / review tap.
  pub self_report: Option<bool>,
}

impl WorkingState {
  /// Build fresh working state for a question. Ordering items and the
  /// matching right column are shuffled for presentation; canonical data on
  /// the question is never mutated.
  pub fn for_question(question: &QuizQuestion, seed: u64) -> Self {
    let order = question
      .ordering_items
      .as_deref()
      .map(|items| shuffled(items, seed))
      .unwrap_or_default();
    let match_targets = shuffled(&question.matching_rights(), seed.rotate_left(17));
    Self {
      order,
      match_targets,
      ..Self::default()
    }
  }

  pub fn select_option(&mut self, option: &str) {
    self.selected_option = Some(option.to_string());
  }

  pub fn set_text(&mut self, text: &str) {
    self.text_input = text.to_string();
  }

  pub fn set_self_report(&mut self, got_it: bool) {
    self.self_report = Some(got_it);
  }

  /// Reposition one item within the working sequence. Out-of-range indexes
  /// are ignored.
  pub fn move_item(&mut self, from: usize, to: usize) {
    if from >= self.order.len() || to >= self.order.len() {
      return;
    }
    let item = self.order.remove(from);
    self.order.insert(to, item);
  }

  /// Tap a left-column item: select it, clearing any mapping it already had.
  pub fn tap_left(&mut self, left: &str) {
    self.assignments.remove(left);
    self.selected_left = Some(left.to_string());
  }

  /// Tap a right-column item while a left item is selected: assign the pair,
  /// stealing the right item from any other left that held it, then clear
  /// the selection. Without a selected left this is a no-op.
  pub fn tap_right(&mut self, right: &str) {
    let Some(left) = self.selected_left.take() else {
      return;
    };
    self.assignments.retain(|_, assigned| assigned != right);
    self.assignments.insert(left, right.to_string());
  }

  /// The grader-facing view of this state for the given question type.
  pub fn response_for(&self, question_type: QuestionType) -> Response {
    match question_type {
      QuestionType::MultipleChoice | QuestionType::TrueFalse => match &self.selected_option {
        Some(option) => Response::Selected(option.clone()),
        None => Response::Empty,
      },
      QuestionType::ShortAnswer | QuestionType::FillInBlank => {
        Response::Text(self.text_input.clone())
      }
      QuestionType::Ordering => Response::Order(self.order.clone()),
      QuestionType::Matching => Response::Matches(self.assignments.clone()),
      QuestionType::Flashcard => match self.self_report {
        Some(got_it) => Response::SelfReport(got_it),
        None => Response::Empty,
      },
    }
  }
}
