#![forbid(unsafe_code)]

//! One-evaluation-per-frame gate for scroll-like input.
//!
//! Browsers can fire dozens of `scroll`/`wheel`/`touchmove`/`resize` events
//! between two repaints. [`FrameThrottle`] collapses a burst into a single
//! pending frame request: the first event arms it, the rest are absorbed
//! until the frame runs.

/// Single in-flight flag guarding the evaluation frame.
#[derive(Debug, Clone, Default)]
pub struct FrameThrottle {
    in_flight: bool,
    /// Events absorbed since the last frame ran.
    absorbed: u32,
}

impl FrameThrottle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_flight: false,
            absorbed: 0,
        }
    }

    /// Record one raw event. Returns `true` if the caller must request a frame.
    pub fn note_event(&mut self) -> bool {
        if self.in_flight {
            self.absorbed = self.absorbed.saturating_add(1);
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Clear the flag when the frame fires. Returns the number of events
    /// that were coalesced into it (excluding the one that armed it).
    pub fn frame_ran(&mut self) -> u32 {
        self.in_flight = false;
        core::mem::take(&mut self.absorbed)
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
