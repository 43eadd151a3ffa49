//! Per-question countdown handle.
//!
//! The session owns at most one `Countdown` and drops it on every transition
//! out of Unanswered, so an expired tick can never be applied to stale state.
//! Ticks are pulled (one per second by the driving event loop) rather than
//! pushed from a background task.

/// Remaining time for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
  remaining_secs: u32,
}

impl Countdown {
  pub fn new(limit_secs: u32) -> Self {
    Self { remaining_secs: limit_secs }
  }

  pub fn remaining_secs(&self) -> u32 {
    self.remaining_secs
  }

  /// Consume one second. Returns true when the countdown has just expired.
  pub fn tick(&mut self) -> bool {
    if self.remaining_secs == 0 {
      return true;
    }
    self.remaining_secs -= 1;
    self.remaining_secs == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tick_counts_down() {
    let mut countdown = Countdown::new(3);
    assert!(!countdown.tick());
    assert_eq!(countdown.remaining_secs(), 2);
    assert!(!countdown.tick());
    assert!(countdown.tick());
    assert_eq!(countdown.remaining_secs(), 0);
  }

  #[test]
  fn test_tick_after_expiry_stays_expired() {
    let mut countdown = Countdown::new(1);
    assert!(countdown.tick());
    assert!(countdown.tick());
    assert_eq!(countdown.remaining_secs(), 0);
  }
}
