//! The quiz session state machine.
//!
//! Per-question lifecycle: Unanswered -> Revealed -> advance to the next
//! question's Unanswered, or to a terminal result on the last one. All
//! grading goes through `grading::grade`; nothing in here can fail the
//! process - bad input is answered with a no-op or an incorrect verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config;
use crate::domain::{QuizMode, QuizQuestion, QuizResult, QuizSettings, SessionOutcome};
use crate::grading::{self, Response};
use crate::shuffle::question_seed;

use super::timer::Countdown;
use super::working::WorkingState;

#[derive(Debug)]
pub enum SessionError {
  NoQuestions,
}

impl std::fmt::Display for SessionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NoQuestions => write!(f, "A quiz session needs at least one question"),
    }
  }
}

impl std::error::Error for SessionError {}

/// Lifecycle phase of the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", rename_all_fields = "camelCase", tag = "phase")]
pub enum QuestionPhase {
  Unanswered,
  Revealed { correct: bool, timed_out: bool },
}

/// Boss-battle bookkeeping: opponent health and player lives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleState {
  pub boss_health: f64,
  pub player_lives: u32,
}

/// What `advance` did.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
  Next,
  Finished(QuizResult),
}

/// What `tick` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
  /// No countdown running (untimed question, flashcard, or already revealed).
  NoTimer,
  /// Countdown still running; seconds remaining.
  Running(u32),
  /// Countdown expired; a forced-incorrect submit was applied.
  Expired,
}

/// One in-progress quiz run, owned by the active view for its duration.
#[derive(Debug, Clone)]
pub struct QuizSession {
  questions: Vec<QuizQuestion>,
  settings: QuizSettings,
  mode: QuizMode,
  seed: u64,
  current: usize,
  score: u32,
  phase: QuestionPhase,
  working: WorkingState,
  countdown: Option<Countdown>,
  battle: Option<BattleState>,
  started_at: DateTime<Utc>,
  result: Option<QuizResult>,
}

impl QuizSession {
  pub fn new(
    questions: Vec<QuizQuestion>,
    settings: QuizSettings,
    mode: QuizMode,
    seed: u64,
  ) -> Result<Self, SessionError> {
    if questions.is_empty() {
      return Err(SessionError::NoQuestions);
    }
    let settings = settings.normalized();
    let battle = match mode {
      QuizMode::Standard => None,
      QuizMode::BossBattle => Some(BattleState {
        boss_health: config::BOSS_MAX_HEALTH,
        player_lives: config::PLAYER_LIVES,
      }),
    };
    let working = WorkingState::for_question(&questions[0], question_seed(seed, 0));
    let countdown = countdown_for(&questions[0], &settings);
    Ok(Self {
      questions,
      settings,
      mode,
      seed,
      current: 0,
      score: 0,
      phase: QuestionPhase::Unanswered,
      working,
      countdown,
      battle,
      started_at: Utc::now(),
      result: None,
    })
  }

  pub fn current_index(&self) -> usize {
    self.current
  }

  pub fn total_questions(&self) -> usize {
    self.questions.len()
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn mode(&self) -> QuizMode {
    self.mode
  }

  pub fn settings(&self) -> &QuizSettings {
    &self.settings
  }

  pub fn current_question(&self) -> &QuizQuestion {
    &self.questions[self.current]
  }

  pub fn phase(&self) -> QuestionPhase {
    self.phase
  }

  pub fn working(&self) -> &WorkingState {
    &self.working
  }

  pub fn battle(&self) -> Option<&BattleState> {
    self.battle.as_ref()
  }

  pub fn time_remaining(&self) -> Option<u32> {
    self.countdown.as_ref().map(Countdown::remaining_secs)
  }

  pub fn is_complete(&self) -> bool {
    self.result.is_some()
  }

  pub fn result(&self) -> Option<&QuizResult> {
    self.result.as_ref()
  }

  fn input_enabled(&self) -> bool {
    self.result.is_none() && self.phase == QuestionPhase::Unanswered
  }

  // ---- working-state mutations (no-ops once revealed) ----

  pub fn select_option(&mut self, option: &str) {
    if self.input_enabled() {
      self.working.select_option(option);
    }
  }

  pub fn set_text(&mut self, text: &str) {
    if self.input_enabled() {
      self.working.set_text(text);
    }
  }

  pub fn set_self_report(&mut self, got_it: bool) {
    if self.input_enabled() {
      self.working.set_self_report(got_it);
    }
  }

  pub fn move_item(&mut self, from: usize, to: usize) {
    if self.input_enabled() {
      self.working.move_item(from, to);
    }
  }

  pub fn tap_left(&mut self, left: &str) {
    if self.input_enabled() && self.left_exists(left) {
      self.working.tap_left(left);
    }
  }

  pub fn tap_right(&mut self, right: &str) {
    if self.input_enabled() && self.working.match_targets.iter().any(|t| t == right) {
      self.working.tap_right(right);
    }
  }

  fn left_exists(&self, left: &str) -> bool {
    self
      .current_question()
      .matching_pairs
      .as_deref()
      .unwrap_or_default()
      .iter()
      .any(|p| p.left == left)
  }

  // ---- transitions ----

  /// User-initiated check. Grades the current working state, applies score
  /// and battle side effects, locks input and reveals. Returns the verdict,
  /// or None when the question is already revealed or the session complete.
  pub fn submit(&mut self) -> Option<bool> {
    if !self.input_enabled() {
      return None;
    }
    let response = self.working.response_for(self.current_question().question_type);
    self.apply_submit(response, false)
  }

  /// Countdown-driven forced submit. A timeout is always an incorrect
  /// verdict; the working state is not consulted.
  fn submit_timeout(&mut self) -> Option<bool> {
    if !self.input_enabled() {
      return None;
    }
    self.apply_submit(Response::TimedOut, true)
  }

  fn apply_submit(&mut self, response: Response, timed_out: bool) -> Option<bool> {
    let correct = grading::grade(self.current_question(), &response);

    if correct {
      self.score += 1;
      if let Some(battle) = &mut self.battle {
        let damage = config::BOSS_MAX_HEALTH / self.questions.len() as f64;
        let mut health = (battle.boss_health - damage).max(0.0);
        // Snap to zero inside one unit to avoid floating-point residue
        if health < 1.0 {
          health = 0.0;
        }
        battle.boss_health = health;
      }
    } else if !timed_out
      && let Some(battle) = &mut self.battle
    {
      battle.player_lives = battle.player_lives.saturating_sub(1);
    }

    // Leaving Unanswered: the countdown handle must not survive
    self.countdown = None;
    self.phase = QuestionPhase::Revealed { correct, timed_out };
    Some(correct)
  }

  /// Move past a revealed question: re-initialize the next question's
  /// working state, or finish the session. In battle mode an exhausted life
  /// counter ends the session in defeat regardless of remaining questions.
  pub fn advance(&mut self) -> Option<AdvanceOutcome> {
    if self.result.is_some() || self.phase == QuestionPhase::Unanswered {
      return None;
    }

    if let Some(battle) = &self.battle
      && battle.player_lives == 0
    {
      return Some(AdvanceOutcome::Finished(self.finish(SessionOutcome::Defeat)));
    }

    if self.current + 1 >= self.questions.len() {
      let outcome = match &self.battle {
        Some(battle) if battle.boss_health == 0.0 => SessionOutcome::Victory,
        Some(_) => SessionOutcome::Cleared,
        None => SessionOutcome::Cleared,
      };
      return Some(AdvanceOutcome::Finished(self.finish(outcome)));
    }

    self.current += 1;
    self.working =
      WorkingState::for_question(&self.questions[self.current], question_seed(self.seed, self.current));
    self.countdown = countdown_for(&self.questions[self.current], &self.settings);
    self.phase = QuestionPhase::Unanswered;
    Some(AdvanceOutcome::Next)
  }

  /// One-second tick from the driving event loop. Only an Unanswered timed
  /// question has a live countdown; expiry forces an incorrect submit.
  pub fn tick(&mut self) -> TickOutcome {
    if !self.input_enabled() {
      return TickOutcome::NoTimer;
    }
    match &mut self.countdown {
      None => TickOutcome::NoTimer,
      Some(countdown) => {
        if countdown.tick() {
          self.submit_timeout();
          TickOutcome::Expired
        } else {
          TickOutcome::Running(countdown.remaining_secs())
        }
      }
    }
  }

  fn finish(&mut self, outcome: SessionOutcome) -> QuizResult {
    let total = self.questions.len() as u32;
    let mut xp = self.score * config::XP_PER_CORRECT;
    if self.score == total {
      xp += config::PERFECT_BONUS_XP;
    }
    if outcome == SessionOutcome::Victory {
      xp += config::BATTLE_VICTORY_XP;
    }
    if outcome == SessionOutcome::Defeat {
      xp /= config::DEFEAT_XP_DIVISOR;
    }
    let result = QuizResult {
      total_questions: total,
      correct_answers: self.score,
      score: self.score,
      elapsed_seconds: (Utc::now() - self.started_at).num_seconds().max(0),
      xp_earned: xp,
      outcome,
    };
    self.countdown = None;
    self.result = Some(result.clone());
    result
  }
}

fn countdown_for(question: &QuizQuestion, settings: &QuizSettings) -> Option<Countdown> {
  if settings.time_limit_secs > 0 && question.question_type.supports_timing() {
    Some(Countdown::new(settings.time_limit_secs))
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{MatchingPair, QuestionType};

  fn mc(id: &str, correct: &str, wrong: &str) -> QuizQuestion {
    let mut q = QuizQuestion::new(id, QuestionType::MultipleChoice, "pick");
    q.options = vec![correct.to_string(), wrong.to_string()];
    q.correct_answer = correct.to_string();
    q
  }

  fn mc_bank(n: usize) -> Vec<QuizQuestion> {
    (0..n).map(|i| mc(&format!("q{}", i), "right", "wrong")).collect()
  }

  fn session(questions: Vec<QuizQuestion>, mode: QuizMode, time_limit: u32) -> QuizSession {
    let settings = QuizSettings {
      time_limit_secs: time_limit,
      ..QuizSettings::default()
    };
    QuizSession::new(questions, settings, mode, 42).unwrap()
  }

  #[test]
  fn test_empty_question_list_rejected() {
    let err = QuizSession::new(vec![], QuizSettings::default(), QuizMode::Standard, 1);
    assert!(err.is_err());
  }

  #[test]
  fn test_five_question_run_four_correct() {
    let mut s = session(mc_bank(5), QuizMode::Standard, 0);
    for i in 0..5 {
      if i == 2 {
        s.select_option("wrong");
      } else {
        s.select_option("right");
      }
      assert_eq!(s.submit(), Some(i != 2));
      let outcome = s.advance().unwrap();
      if i < 4 {
        assert_eq!(outcome, AdvanceOutcome::Next);
      } else {
        match outcome {
          AdvanceOutcome::Finished(result) => {
            assert_eq!(result.total_questions, 5);
            assert_eq!(result.correct_answers, 4);
            assert_eq!(result.score, 4);
            assert_eq!(result.outcome, SessionOutcome::Cleared);
            assert_eq!(result.xp_earned, 4 * config::XP_PER_CORRECT);
          }
          other => panic!("expected finish, got {:?}", other),
        }
      }
    }
    assert!(s.is_complete());
  }

  #[test]
  fn test_perfect_run_earns_bonus() {
    let mut s = session(mc_bank(3), QuizMode::Standard, 0);
    loop {
      s.select_option("right");
      s.submit();
      match s.advance().unwrap() {
        AdvanceOutcome::Next => continue,
        AdvanceOutcome::Finished(result) => {
          assert_eq!(result.xp_earned, 3 * config::XP_PER_CORRECT + config::PERFECT_BONUS_XP);
          break;
        }
      }
    }
  }

  #[test]
  fn test_submit_is_idempotent_once_revealed() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 0);
    s.select_option("right");
    assert_eq!(s.submit(), Some(true));
    assert_eq!(s.submit(), None);
    assert_eq!(s.score(), 1);
  }

  #[test]
  fn test_mutations_locked_after_reveal() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 0);
    s.select_option("wrong");
    s.submit();
    s.select_option("right");
    // Selection unchanged; verdict already fixed
    assert_eq!(s.working().selected_option.as_deref(), Some("wrong"));
  }

  #[test]
  fn test_advance_requires_reveal() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 0);
    assert!(s.advance().is_none());
  }

  #[test]
  fn test_boss_health_exact_zero_after_full_clear() {
    let n = 7;
    let mut s = session(mc_bank(n), QuizMode::BossBattle, 0);
    for _ in 0..n {
      s.select_option("right");
      s.submit();
      s.advance();
    }
    let result = s.result().unwrap();
    assert_eq!(result.outcome, SessionOutcome::Victory);
    // 7 damage ticks of 100/7 must land on exactly zero, no residue
    assert_eq!(s.battle().unwrap().boss_health, 0.0);
  }

  #[test]
  fn test_battle_wrong_answer_costs_a_life() {
    let mut s = session(mc_bank(5), QuizMode::BossBattle, 0);
    s.select_option("wrong");
    s.submit();
    assert_eq!(s.battle().unwrap().player_lives, config::PLAYER_LIVES - 1);
  }

  #[test]
  fn test_battle_defeat_ends_session_early() {
    let lives = config::PLAYER_LIVES as usize;
    let mut s = session(mc_bank(lives + 5), QuizMode::BossBattle, 0);
    for i in 0..lives {
      s.select_option("wrong");
      s.submit();
      let outcome = s.advance().unwrap();
      if i + 1 < lives {
        assert_eq!(outcome, AdvanceOutcome::Next);
      } else {
        match outcome {
          AdvanceOutcome::Finished(result) => {
            assert_eq!(result.outcome, SessionOutcome::Defeat);
            // Defeat XP is reduced
            assert_eq!(result.xp_earned, 0);
          }
          other => panic!("expected defeat, got {:?}", other),
        }
      }
    }
    assert!(s.is_complete());
  }

  #[test]
  fn test_timeout_forces_incorrect_despite_correct_selection() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 2);
    s.select_option("right");
    assert_eq!(s.tick(), TickOutcome::Running(1));
    assert_eq!(s.tick(), TickOutcome::Expired);
    assert_eq!(s.phase(), QuestionPhase::Revealed { correct: false, timed_out: true });
    assert_eq!(s.score(), 0);
  }

  #[test]
  fn test_timeout_does_not_cost_battle_life() {
    let mut s = session(mc_bank(2), QuizMode::BossBattle, 1);
    assert_eq!(s.tick(), TickOutcome::Expired);
    assert_eq!(s.battle().unwrap().player_lives, config::PLAYER_LIVES);
  }

  #[test]
  fn test_countdown_cancelled_on_submit() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 30);
    assert!(s.time_remaining().is_some());
    s.select_option("right");
    s.submit();
    assert!(s.time_remaining().is_none());
    assert_eq!(s.tick(), TickOutcome::NoTimer);
  }

  #[test]
  fn test_countdown_reset_on_advance() {
    let mut s = session(mc_bank(2), QuizMode::Standard, 10);
    s.tick();
    s.select_option("right");
    s.submit();
    s.advance();
    assert_eq!(s.time_remaining(), Some(10));
  }

  #[test]
  fn test_flashcard_has_no_countdown() {
    let q = QuizQuestion::new("f1", QuestionType::Flashcard, "front");
    let mut s = session(vec![q], QuizMode::Standard, 10);
    assert!(s.time_remaining().is_none());
    assert_eq!(s.tick(), TickOutcome::NoTimer);
  }

  #[test]
  fn test_flashcard_self_report_grades() {
    let mut q = QuizQuestion::new("f1", QuestionType::Flashcard, "front");
    q.correct_answer = "back".into();
    let mut s = session(vec![q], QuizMode::Standard, 0);
    s.set_self_report(true);
    assert_eq!(s.submit(), Some(true));
  }

  #[test]
  fn test_submit_with_no_input_is_incorrect_not_error() {
    let mut s = session(mc_bank(1), QuizMode::Standard, 0);
    assert_eq!(s.submit(), Some(false));
  }

  #[test]
  fn test_advance_reinitializes_working_state() {
    let mut questions = mc_bank(1);
    let mut ordering = QuizQuestion::new("ord", QuestionType::Ordering, "order");
    ordering.ordering_items = Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
    questions.push(ordering);

    let mut s = session(questions, QuizMode::Standard, 0);
    s.select_option("right");
    s.submit();
    s.advance();
    assert_eq!(s.working().order.len(), 4);
    assert!(s.working().selected_option.is_none());
  }

  #[test]
  fn test_matching_taps_validated_against_question() {
    let mut q = QuizQuestion::new("m1", QuestionType::Matching, "match");
    q.matching_pairs = Some(vec![
      MatchingPair { left: "a".into(), right: "1".into() },
      MatchingPair { left: "b".into(), right: "2".into() },
      MatchingPair { left: "c".into(), right: "3".into() },
      MatchingPair { left: "d".into(), right: "4".into() },
    ]);
    let mut s = session(vec![q], QuizMode::Standard, 0);
    s.tap_left("nonexistent");
    assert!(s.working().selected_left.is_none());
    s.tap_left("a");
    s.tap_right("not-a-target");
    assert!(s.working().assignments.is_empty());
    s.tap_right("1");
    assert_eq!(s.working().assignments.len(), 1);
  }

  #[test]
  fn test_tick_after_completion_is_inert() {
    let mut s = session(mc_bank(1), QuizMode::Standard, 5);
    s.select_option("right");
    s.submit();
    s.advance();
    assert!(s.is_complete());
    assert_eq!(s.tick(), TickOutcome::NoTimer);
    assert!(s.advance().is_none());
  }
}
