pub mod question;
pub mod result;
pub mod settings;

pub use question::{MatchingPair, QuestionType, QuizQuestion};
pub use result::{QuizHistoryItem, QuizResult, SessionOutcome, UserStats};
pub use settings::{Difficulty, QuizMode, QuizSettings};
