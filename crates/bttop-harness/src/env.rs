#![forbid(unsafe_code)]

//! Simulated page services implementing [`Environment`].

use core::time::Duration;
use std::collections::VecDeque;

use bttop_core::{
    Environment, FocusReleaseError, FrameKind, ScrollRequestError, Signal, TimerId, TimerKind,
    Visibility,
};

/// How the simulated page answers a smooth-scroll request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothScrollMode {
    /// Travel toward 0 at a fixed speed per rendered frame.
    Animated { px_per_frame: f64 },
    /// Travel like `Animated` but stop for good at `stall_at`.
    Stalls { px_per_frame: f64, stall_at: f64 },
    /// Reject the request, as an engine without `behavior: "smooth"` would.
    Unsupported,
}

impl Default for SmoothScrollMode {
    fn default() -> Self {
        Self::Animated { px_per_frame: 120.0 }
    }
}

/// Element that currently owns keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusOwner {
    /// Focus sits on the document body.
    #[default]
    Body,
    Button,
    /// Some other element on the page.
    Other,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingTimer {
    pub(crate) id: TimerId,
    pub(crate) kind: TimerKind,
    pub(crate) deadline: Duration,
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    px_per_frame: f64,
    floor: f64,
}

/// In-memory page: clock, scroll offset, timers, frames and focus.
#[derive(Debug, Default)]
pub struct SimEnvironment {
    pub(crate) now: Duration,
    y: f64,
    pub(crate) smooth_mode: SmoothScrollMode,
    animation: Option<ScrollAnimation>,
    /// Offset changed since the last rendered frame; a `scroll` event is due.
    scroll_event_due: bool,
    next_timer: u64,
    pub(crate) timers: Vec<PendingTimer>,
    pub(crate) frames: Vec<FrameKind>,
    /// Events raised synchronously by environment calls (e.g. `blur`).
    pub(crate) raised: VecDeque<Signal>,
    pub(crate) focus: FocusOwner,
    pub(crate) focus_release_fails: bool,
    pub(crate) class_log: Vec<Visibility>,
    pub(crate) timers_scheduled: u64,
    pub(crate) timers_cancelled: u64,
    pub(crate) smooth_requests: u64,
    pub(crate) jumps: u64,
}

impl SimEnvironment {
    #[must_use]
    pub fn new(initial_y: f64) -> Self {
        Self {
            y: initial_y,
            ..Self::default()
        }
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.y
    }

    /// Move the page as a user would; a `scroll` event fires on the next frame.
    pub fn set_offset(&mut self, y: f64) {
        if self.y != y {
            self.y = y;
            self.scroll_event_due = true;
        }
        // User scrolling interrupts a running smooth scroll.
        self.animation = None;
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Step the smooth-scroll animation by one frame.
    pub(crate) fn animate_frame(&mut self) {
        let Some(animation) = self.animation else {
            return;
        };
        let next = (self.y - animation.px_per_frame).max(animation.floor);
        if next != self.y {
            self.y = next;
            self.scroll_event_due = true;
        }
        if next <= animation.floor {
            self.animation = None;
        }
    }

    pub(crate) fn take_scroll_event(&mut self) -> bool {
        core::mem::take(&mut self.scroll_event_due)
    }

    /// Earliest pending timer, by deadline then scheduling order.
    pub(crate) fn next_timer(&self) -> Option<PendingTimer> {
        self.timers
            .iter()
            .min_by_key(|timer| (timer.deadline, timer.id))
            .copied()
    }

    pub(crate) fn remove_timer(&mut self, id: TimerId) {
        self.timers.retain(|timer| timer.id != id);
    }

    pub(crate) fn live_timers(&self, kind: TimerKind) -> usize {
        self.timers.iter().filter(|timer| timer.kind == kind).count()
    }
}

impl Environment for SimEnvironment {
    fn now(&self) -> Duration {
        self.now
    }

    fn scroll_y(&self) -> f64 {
        self.y
    }

    fn smooth_scroll_to_top(&mut self) -> Result<(), ScrollRequestError> {
        self.smooth_requests += 1;
        let animation = match self.smooth_mode {
            SmoothScrollMode::Animated { px_per_frame } => ScrollAnimation {
                px_per_frame,
                floor: 0.0,
            },
            SmoothScrollMode::Stalls {
                px_per_frame,
                stall_at,
            } => ScrollAnimation {
                px_per_frame,
                floor: stall_at.max(0.0),
            },
            SmoothScrollMode::Unsupported => return Err(ScrollRequestError::Unsupported),
        };
        self.animation = Some(animation);
        Ok(())
    }

    fn jump_to_top(&mut self) {
        self.jumps += 1;
        self.set_offset(0.0);
    }

    fn schedule_timer(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.next_timer += 1;
        self.timers_scheduled += 1;
        let id = TimerId::new(self.next_timer);
        self.timers.push(PendingTimer {
            id,
            kind,
            deadline: self.now.saturating_add(delay),
        });
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        let before = self.timers.len();
        self.remove_timer(id);
        if self.timers.len() != before {
            self.timers_cancelled += 1;
        }
    }

    fn request_frame(&mut self, kind: FrameKind) {
        self.frames.push(kind);
    }

    fn release_focus(&mut self) -> Result<(), FocusReleaseError> {
        if self.focus_release_fails {
            return Err(FocusReleaseError("element detached".to_owned()));
        }
        if self.focus == FocusOwner::Button {
            self.raised.push_back(Signal::Blur);
        }
        self.focus = FocusOwner::Body;
        Ok(())
    }

    fn apply_visibility(&mut self, visibility: Visibility) {
        self.class_log.push(visibility);
    }
}
