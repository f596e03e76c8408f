//! Poll limits for status polling
//!
//! A status poll loop asks its [`PollLimit`] after every busy reading
//! whether it should give up. The limit decides what "too long" means:
//! a poll count, a wall-clock deadline or an external cancellation flag.

use core::sync::atomic::{AtomicBool, Ordering};

/// Termination policy for a busy-wait loop
pub trait PollLimit {
    /// Called after each poll that found the device busy
    ///
    /// Returns `true` to abort the loop with [`Error::Timeout`](crate::Error::Timeout).
    fn expired(&mut self) -> bool;
}

impl<T: PollLimit + ?Sized> PollLimit for &mut T {
    fn expired(&mut self) -> bool {
        (**self).expired()
    }
}

/// Never expires: poll until the device reports ready
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl PollLimit for Unbounded {
    fn expired(&mut self) -> bool {
        false
    }
}

/// Expire after a fixed number of busy polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPolls {
    remaining: u32,
}

impl MaxPolls {
    /// Allow at most `polls` status readings
    pub const fn new(polls: u32) -> Self {
        Self { remaining: polls }
    }
}

impl PollLimit for MaxPolls {
    fn expired(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// Cancellation token: expires once the flag is set
impl PollLimit for &AtomicBool {
    fn expired(&mut self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Expire once a wall-clock deadline has passed
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: std::time::Instant,
}

#[cfg(feature = "std")]
impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: std::time::Duration) -> Self {
        Self {
            at: std::time::Instant::now() + timeout,
        }
    }
}

#[cfg(feature = "std")]
impl PollLimit for Deadline {
    fn expired(&mut self) -> bool {
        std::time::Instant::now() >= self.at
    }
}

/// Either a poll count or no limit at all
///
/// Used where the limit comes from user configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalMaxPolls {
    /// No limit
    Unbounded,
    /// Fixed poll budget
    Limited(MaxPolls),
}

impl From<Option<u32>> for OptionalMaxPolls {
    fn from(polls: Option<u32>) -> Self {
        match polls {
            Some(n) => Self::Limited(MaxPolls::new(n)),
            None => Self::Unbounded,
        }
    }
}

impl PollLimit for OptionalMaxPolls {
    fn expired(&mut self) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Limited(limit) => limit.expired(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_polls_counts_down() {
        let mut limit = MaxPolls::new(3);
        assert!(!limit.expired());
        assert!(!limit.expired());
        assert!(limit.expired());
        assert!(limit.expired());
    }

    #[test]
    fn test_max_polls_zero_expires_immediately() {
        let mut limit = MaxPolls::new(0);
        assert!(limit.expired());
    }

    #[test]
    fn test_cancellation_flag() {
        let flag = AtomicBool::new(false);
        let mut limit = &flag;
        assert!(!limit.expired());
        flag.store(true, Ordering::Relaxed);
        assert!(limit.expired());
    }

    #[test]
    fn test_optional_max_polls() {
        let mut unbounded = OptionalMaxPolls::from(None);
        for _ in 0..1000 {
            assert!(!unbounded.expired());
        }
        let mut limited = OptionalMaxPolls::from(Some(1));
        assert!(limited.expired());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_deadline_in_the_past() {
        let mut limit = Deadline::after(std::time::Duration::ZERO);
        assert!(limit.expired());
    }
}
