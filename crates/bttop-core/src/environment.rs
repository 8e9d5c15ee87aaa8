#![forbid(unsafe_code)]

//! Host capabilities the controller depends on.
//!
//! The controller never touches `window`/`document` directly. Everything it
//! needs from the page (the clock, the scroll offset, timers, animation
//! frames, scrolling, focus and class updates) is reached through
//! [`Environment`], so the same state machine runs against the DOM in
//! `bttop-web` and against a simulated page in `bttop-harness`.

use core::fmt;
use core::time::Duration;

use crate::visibility::Visibility;

/// Opaque handle for a scheduled delayed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Purpose of a delayed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Quiet-delay expiry; moves an active button to idle.
    Fade,
    /// Post-click focus release for pointer activations.
    FocusRelease,
}

/// Purpose of a next-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Throttled visibility evaluation after scroll-like input.
    Evaluate,
    /// One poll of the auto-scroll watcher armed by the given click.
    AutoScrollCheck { generation: u64 },
}

/// The page refused or does not support a smooth scroll request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrollRequestError {
    #[error("smooth scrolling is not supported by this environment")]
    Unsupported,
    #[error("smooth scroll request rejected: {0}")]
    Rejected(String),
}

/// Dropping focus failed. Always treated as cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to release focus: {0}")]
pub struct FocusReleaseError(pub String);

/// Page services consumed by [`crate::BackTopController`].
///
/// Implementations must not call back into the controller synchronously;
/// timers and frames are delivered later as [`crate::Signal`]s.
pub trait Environment {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;

    /// Current vertical scroll offset of the page.
    fn scroll_y(&self) -> f64;

    /// Start an animated scroll to offset 0.
    fn smooth_scroll_to_top(&mut self) -> Result<(), ScrollRequestError>;

    /// Move to offset 0 without animation.
    fn jump_to_top(&mut self);

    /// Schedule a delayed callback; it comes back as `Signal::Timer(id)`.
    fn schedule_timer(&mut self, kind: TimerKind, delay: Duration) -> TimerId;

    /// Cancel a pending callback. Unknown or already fired ids are ignored.
    fn cancel_timer(&mut self, id: TimerId);

    /// Ask for a callback before the next repaint; it comes back as
    /// `Signal::Frame(kind)`.
    fn request_frame(&mut self, kind: FrameKind);

    /// Blur the button and any other focused element except the body.
    fn release_focus(&mut self) -> Result<(), FocusReleaseError>;

    /// Push the visual state onto the button's class list.
    fn apply_visibility(&mut self, visibility: Visibility);
}
