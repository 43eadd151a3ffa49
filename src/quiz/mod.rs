//! Quiz session state machine and its supporting pieces.

pub mod session;
pub mod timer;
pub mod working;

pub use session::{AdvanceOutcome, BattleState, QuestionPhase, QuizSession, SessionError, TickOutcome};
pub use timer::Countdown;
pub use working::WorkingState;
