#![forbid(unsafe_code)]

//! Deterministic event loop around one controller.
//!
//! [`SimulatedPage`] reproduces the ordering a browser gives the widget:
//! timers fire at their deadlines; each rendered frame (every
//! [`FRAME_INTERVAL`]) first advances any smooth scroll, then dispatches the
//! due `scroll` event, then runs the animation-frame callbacks requested so
//! far. Events raised synchronously by environment calls are dispatched
//! right after the handler that caused them.

use core::time::Duration;

use bttop_core::{
    BackTopConfig, BackTopController, ControllerSnapshot, InteractionKind, Signal, TimerKind,
    Visibility,
};
use tracing::trace;

use crate::env::{FocusOwner, SimEnvironment, SmoothScrollMode};

/// Frame cadence of the simulated display (~60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// One controller wired to a simulated page.
#[derive(Debug)]
pub struct SimulatedPage {
    controller: BackTopController,
    env: SimEnvironment,
    next_frame_at: Duration,
    /// Evaluations run inside each rendered frame, oldest first.
    evaluations_per_frame: Vec<u64>,
}

impl SimulatedPage {
    /// Page with default timing, scrolled to `initial_y`, not yet ready.
    #[must_use]
    pub fn new(initial_y: f64) -> Self {
        Self::with_config(BackTopConfig::default(), initial_y)
    }

    #[must_use]
    pub fn with_config(config: BackTopConfig, initial_y: f64) -> Self {
        Self {
            controller: BackTopController::new(config),
            env: SimEnvironment::new(initial_y),
            next_frame_at: FRAME_INTERVAL,
            evaluations_per_frame: Vec::new(),
        }
    }

    /// Page that has already received the ready signal.
    #[must_use]
    pub fn ready_at(initial_y: f64) -> Self {
        let mut page = Self::new(initial_y);
        page.dispatch(Signal::Ready);
        page
    }

    #[must_use]
    pub fn with_smooth_scroll(mut self, mode: SmoothScrollMode) -> Self {
        self.env.smooth_mode = mode;
        self
    }

    #[must_use]
    pub fn with_failing_focus_release(mut self) -> Self {
        self.env.focus_release_fails = true;
        self
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn controller(&self) -> &BackTopController {
        &self.controller
    }

    #[must_use]
    pub fn env(&self) -> &SimEnvironment {
        &self.env
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.controller.snapshot()
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.controller.visibility()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.env.now
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.env.offset()
    }

    #[must_use]
    pub fn focus(&self) -> FocusOwner {
        self.env.focus
    }

    /// Every visual state pushed to the element, in order.
    #[must_use]
    pub fn class_log(&self) -> &[Visibility] {
        &self.env.class_log
    }

    #[must_use]
    pub fn live_timers(&self, kind: TimerKind) -> usize {
        self.env.live_timers(kind)
    }

    #[must_use]
    pub fn timers_scheduled(&self) -> u64 {
        self.env.timers_scheduled
    }

    #[must_use]
    pub fn evaluations_per_frame(&self) -> &[u64] {
        &self.evaluations_per_frame
    }

    #[must_use]
    pub fn jumps(&self) -> u64 {
        self.env.jumps
    }

    #[must_use]
    pub fn smooth_requests(&self) -> u64 {
        self.env.smooth_requests
    }

    // -- input --------------------------------------------------------------

    /// Deliver one signal, then anything the environment raised meanwhile.
    pub fn dispatch(&mut self, signal: Signal) {
        self.env.raised.push_back(signal);
        while let Some(next) = self.env.raised.pop_front() {
            trace!(?next, now_ms = self.env.now.as_millis() as u64, "dispatch");
            self.controller.handle(next, &mut self.env);
        }
    }

    /// Re-run the idempotent evaluation directly.
    pub fn evaluate(&mut self) {
        self.controller.evaluate(&mut self.env);
    }

    /// User scroll to `y`; the `scroll` event is delivered on the next frame.
    pub fn scroll_to(&mut self, y: f64) {
        self.env.set_offset(y);
    }

    /// Raw scroll-like signal with no offset change (wheel at a boundary,
    /// resize, touch-move).
    pub fn fire(&mut self, signal: Signal) {
        self.dispatch(signal);
    }

    pub fn focus_button(&mut self) {
        if self.env.focus != FocusOwner::Button {
            self.env.focus = FocusOwner::Button;
            self.dispatch(Signal::Focus);
        }
    }

    pub fn focus_elsewhere(&mut self) {
        if self.env.focus == FocusOwner::Button {
            self.env.focus = FocusOwner::Other;
            self.dispatch(Signal::Blur);
        } else {
            self.env.focus = FocusOwner::Other;
        }
    }

    pub fn pointer_enter(&mut self) {
        self.dispatch(Signal::PointerEnter);
    }

    pub fn pointer_leave(&mut self) {
        self.dispatch(Signal::PointerLeave);
    }

    /// Mouse click: `pointerdown`/`mousedown` on the window, focus moves to
    /// the button, then `click`.
    pub fn pointer_click(&mut self) {
        self.dispatch(Signal::Interaction(InteractionKind::Pointer));
        self.focus_button();
        self.dispatch(Signal::Click);
    }

    /// Tap: `touchstart` on window and button, `touchend`, then `click`.
    pub fn tap(&mut self) {
        self.dispatch(Signal::Interaction(InteractionKind::Pointer));
        self.dispatch(Signal::ButtonTouchStart);
        self.dispatch(Signal::ButtonTouchEnd);
        self.dispatch(Signal::Click);
    }

    /// Keyboard activation of a focused button (`keydown` then `click`).
    pub fn keyboard_click(&mut self) {
        self.dispatch(Signal::Interaction(InteractionKind::Keyboard));
        self.focus_button();
        self.dispatch(Signal::Click);
    }

    // -- time ---------------------------------------------------------------

    /// Run timers and frames up to and including `now + dt`.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.env.now.saturating_add(dt);
        loop {
            let timer = self.env.next_timer().filter(|t| t.deadline <= until);
            let frame_due = self.next_frame_at <= until;
            match timer {
                Some(timer) if !frame_due || timer.deadline < self.next_frame_at => {
                    self.env.now = timer.deadline;
                    self.env.remove_timer(timer.id);
                    self.dispatch(Signal::Timer(timer.id));
                }
                _ if frame_due => {
                    self.env.now = self.next_frame_at;
                    self.render_frame();
                    self.next_frame_at = self.next_frame_at.saturating_add(FRAME_INTERVAL);
                }
                _ => break,
            }
        }
        self.env.now = until;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Run exactly `count` rendered frames.
    pub fn advance_frames(&mut self, count: u32) {
        for _ in 0..count {
            let dt = self.next_frame_at.saturating_sub(self.env.now);
            self.advance(dt);
        }
    }

    fn render_frame(&mut self) {
        let before = self.controller.stats().evaluations;
        self.env.animate_frame();
        if self.env.take_scroll_event() {
            self.dispatch(Signal::Scroll);
        }
        let callbacks = core::mem::take(&mut self.env.frames);
        for kind in callbacks {
            self.dispatch(Signal::Frame(kind));
        }
        let after = self.controller.stats().evaluations;
        self.evaluations_per_frame.push(after - before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_run_on_cadence() {
        let mut page = SimulatedPage::ready_at(0.0);
        page.advance_ms(50);
        assert_eq!(page.evaluations_per_frame().len(), 3);
        assert_eq!(page.now(), Duration::from_millis(50));
    }

    #[test]
    fn advance_frames_lands_on_frame_boundaries() {
        let mut page = SimulatedPage::ready_at(0.0);
        page.advance_frames(2);
        assert_eq!(page.now(), FRAME_INTERVAL * 2);
    }

    #[test]
    fn user_scroll_is_delivered_on_next_frame() {
        let mut page = SimulatedPage::ready_at(0.0);
        page.scroll_to(400.0);
        assert_eq!(page.visibility(), Visibility::Hidden);
        page.advance_frames(1);
        assert_eq!(page.visibility(), Visibility::Active);
    }
}
