pub mod history;
pub mod progress;
pub mod quiz;

pub use history::history;
pub use progress::progress;
pub use quiz::{
  abandon_quiz, advance_quiz, answer_quiz, explain_quiz, get_quiz, start_quiz, submit_quiz,
  tick_quiz,
};
