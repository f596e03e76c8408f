//! Timing provider
//!
//! Every wait in the bus engine goes through a [`Delay`] implementation so
//! test doubles can run instantly while real hardware keeps the delays the
//! protocol needs. The durations themselves live in [`Timings`].

/// Blocking delay strategy
pub trait Delay {
    /// Block the calling thread for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

#[cfg(feature = "alloc")]
impl<T: Delay + ?Sized> Delay for alloc::boxed::Box<T> {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Delay that returns immediately (simulated buses, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_us(&mut self, _us: u32) {}
}

/// Delay backed by `std::thread::sleep`
///
/// `thread::sleep` may wake early on some platforms; the remaining time is
/// slept again until the full duration has elapsed.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        use std::time::{Duration, Instant};

        let mut remaining = Duration::from_micros(us as u64);
        while !remaining.is_zero() {
            let start = Instant::now();
            std::thread::sleep(remaining);
            remaining = remaining.saturating_sub(start.elapsed());
        }
    }
}

/// Default settle time around each clock edge, in microseconds
///
/// LCLK's minimum half period is 11 ns, far below what a GPIO character
/// device can toggle, so every edge stays far above the minimum.
pub const DEFAULT_SETTLE_US: u32 = 100;

/// Protocol delays, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Hold time around each nibble clock edge
    pub settle_us: u32,
    /// Gap before and after the discarded TAR1 clock of a read cycle
    pub tar_gap_us: u32,
    /// Wait between releasing LAD and the regain clock of a write cycle
    pub write_sync_us: u32,
    /// Pause between two status register polls
    pub status_poll_us: u32,
    /// Time RST# is held low during pin preparation
    pub reset_assert_us: u32,
    /// Time after releasing RST# before the first cycle
    pub reset_recovery_us: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_us: DEFAULT_SETTLE_US,
            tar_gap_us: 100,
            write_sync_us: 1000,
            status_poll_us: 10,
            reset_assert_us: 2000,
            reset_recovery_us: 1000,
        }
    }
}

impl Timings {
    /// Set the per-edge settle time
    pub fn with_settle_us(mut self, us: u32) -> Self {
        self.settle_us = us;
        self
    }
}
