#![forbid(unsafe_code)]

//! Completion tracking for a programmatic smooth scroll.
//!
//! `window.scrollTo({behavior: "smooth"})` has no completion callback, so the
//! watcher samples the offset once per animation frame and decides when the
//! scroll is over: either the page reached the top, or the timeout elapsed
//! (the scroll stalled or the user interrupted it).

use core::time::Duration;

/// Verdict of one watcher poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Still travelling; poll again next frame.
    Pending,
    /// Offset is within tolerance.
    ReachedTop,
    /// Timeout elapsed before reaching the top. The final offset is unknown.
    TimedOut,
}

/// One armed watcher. A new click replaces it with a fresh generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoScrollWatcher {
    generation: u64,
    started_at: Duration,
    timeout: Duration,
}

impl AutoScrollWatcher {
    #[must_use]
    pub const fn new(generation: u64, started_at: Duration, timeout: Duration) -> Self {
        Self {
            generation,
            started_at,
            timeout,
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Classify one sample. Reaching the top wins over the timeout.
    #[must_use]
    pub fn poll(&self, at_top: bool, now: Duration) -> WatchOutcome {
        if at_top {
            WatchOutcome::ReachedTop
        } else if self.elapsed(now) > self.timeout {
            WatchOutcome::TimedOut
        } else {
            WatchOutcome::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pending_until_top() {
        let watcher = AutoScrollWatcher::new(1, ms(100), ms(3000));
        assert_eq!(watcher.poll(false, ms(116)), WatchOutcome::Pending);
        assert_eq!(watcher.poll(true, ms(400)), WatchOutcome::ReachedTop);
    }

    #[test]
    fn timeout_is_strictly_after_window() {
        let watcher = AutoScrollWatcher::new(1, ms(0), ms(3000));
        assert_eq!(watcher.poll(false, ms(3000)), WatchOutcome::Pending);
        assert_eq!(watcher.poll(false, ms(3001)), WatchOutcome::TimedOut);
    }

    #[test]
    fn top_wins_over_timeout() {
        let watcher = AutoScrollWatcher::new(1, ms(0), ms(10));
        assert_eq!(watcher.poll(true, ms(50)), WatchOutcome::ReachedTop);
    }

    #[test]
    fn clock_going_backwards_does_not_underflow() {
        let watcher = AutoScrollWatcher::new(1, ms(500), ms(10));
        assert_eq!(watcher.elapsed(ms(100)), Duration::ZERO);
    }
}
