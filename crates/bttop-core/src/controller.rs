#![forbid(unsafe_code)]

//! Visibility state machine for the back-to-top button.
//!
//! [`BackTopController`] owns every piece of mutable widget state: the
//! current [`Visibility`], the interaction flags, the single fade timer, the
//! frame throttle and the auto-scroll watcher. Hosts feed it [`Signal`]s and
//! an [`Environment`]; the controller answers by scheduling timers/frames and
//! pushing class updates through that environment.
//!
//! # Transitions
//!
//! - any → `Hidden` when the offset is within tolerance (cancels the fade
//!   timer, clears auto-scroll).
//! - `Hidden` → `Active` when the offset leaves the tolerance band.
//! - `Active` stays pinned while the pointer is over the button, it has
//!   focus, or an auto-scroll is running.
//! - `Active` → `Idle` when the quiet delay elapses with none of those held.
//! - `Idle` → `Active` on pointer-enter, touch-start, focus, or scrolling.

use core::time::Duration;

use tracing::{debug, trace};

use crate::config::BackTopConfig;
use crate::environment::{Environment, FrameKind, TimerId, TimerKind};
use crate::throttle::FrameThrottle;
use crate::visibility::Visibility;
use crate::watcher::{AutoScrollWatcher, WatchOutcome};

/// Most recent kind of user input seen anywhere on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Pointer, mouse or touch.
    Pointer,
    Keyboard,
}

/// Host input delivered to [`BackTopController::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Document is ready; run the first evaluation.
    Ready,
    Scroll,
    Wheel,
    TouchMove,
    Resize,
    PointerEnter,
    PointerLeave,
    ButtonTouchStart,
    ButtonTouchEnd,
    ButtonTouchCancel,
    Focus,
    Blur,
    /// Page-wide input used to classify the next click.
    Interaction(InteractionKind),
    Click,
    Timer(TimerId),
    Frame(FrameKind),
}

impl Signal {
    /// Whether this signal goes through the frame throttle.
    #[must_use]
    pub const fn is_scroll_like(self) -> bool {
        matches!(
            self,
            Self::Scroll | Self::Wheel | Self::TouchMove | Self::Resize
        )
    }
}

/// Why an evaluation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Re-check with no new user activity; must be idempotent.
    Recheck,
    /// The user scrolled or resized; an idle button wakes up and the quiet
    /// delay starts over.
    Activity,
}

/// Read-only view of the controller state, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub visibility: Visibility,
    pub auto_scrolling: bool,
    pub pointer_over: bool,
    pub has_focus: bool,
    pub last_interaction: Option<InteractionKind>,
    pub fade_pending: bool,
    pub focus_release_pending: bool,
    pub watcher_active: bool,
    pub evaluation_in_flight: bool,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Visibility evaluations run (throttled or direct).
    pub evaluations: u64,
    /// Scroll-like events absorbed by the throttle.
    pub coalesced_events: u64,
    /// Fade timers scheduled.
    pub fade_timers_scheduled: u64,
    /// Clicks that started an auto-scroll.
    pub auto_scrolls_started: u64,
    /// Auto-scrolls that ended by timeout instead of reaching the top.
    pub auto_scroll_timeouts: u64,
}

/// Back-to-top visibility controller.
#[derive(Debug, Clone)]
pub struct BackTopController {
    config: BackTopConfig,
    visibility: Visibility,
    /// Last state pushed to the environment; `None` until the first push.
    applied: Option<Visibility>,
    auto_scrolling: bool,
    pointer_over: bool,
    has_focus: bool,
    last_interaction: Option<InteractionKind>,
    fade_timer: Option<TimerId>,
    focus_release_timer: Option<TimerId>,
    throttle: FrameThrottle,
    watcher: Option<AutoScrollWatcher>,
    next_generation: u64,
    stats: ControllerStats,
}

impl Default for BackTopController {
    fn default() -> Self {
        Self::new(BackTopConfig::default())
    }
}

impl BackTopController {
    #[must_use]
    pub fn new(config: BackTopConfig) -> Self {
        Self {
            config,
            visibility: Visibility::Hidden,
            applied: None,
            auto_scrolling: false,
            pointer_over: false,
            has_focus: false,
            last_interaction: None,
            fade_timer: None,
            focus_release_timer: None,
            throttle: FrameThrottle::new(),
            watcher: None,
            next_generation: 1,
            stats: ControllerStats::default(),
        }
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn is_auto_scrolling(&self) -> bool {
        self.auto_scrolling
    }

    #[must_use]
    pub const fn stats(&self) -> ControllerStats {
        self.stats
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            visibility: self.visibility,
            auto_scrolling: self.auto_scrolling,
            pointer_over: self.pointer_over,
            has_focus: self.has_focus,
            last_interaction: self.last_interaction,
            fade_pending: self.fade_timer.is_some(),
            focus_release_pending: self.focus_release_timer.is_some(),
            watcher_active: self.watcher.is_some(),
            evaluation_in_flight: self.throttle.is_in_flight(),
        }
    }

    /// Dispatch one host signal.
    pub fn handle<E: Environment>(&mut self, signal: Signal, env: &mut E) {
        match signal {
            Signal::Ready => self.evaluate(env),
            Signal::Scroll | Signal::Wheel | Signal::TouchMove | Signal::Resize => {
                self.on_scroll_like(signal, env);
            }
            Signal::PointerEnter | Signal::ButtonTouchStart => {
                self.pointer_over = true;
                self.engage(env);
            }
            Signal::PointerLeave | Signal::ButtonTouchEnd | Signal::ButtonTouchCancel => {
                self.pointer_over = false;
                self.resume_fade(env);
            }
            Signal::Focus => {
                self.has_focus = true;
                self.engage(env);
            }
            Signal::Blur => {
                self.has_focus = false;
                self.resume_fade(env);
            }
            Signal::Interaction(kind) => self.last_interaction = Some(kind),
            Signal::Click => self.click(env),
            Signal::Timer(id) => self.on_timer(id, env),
            Signal::Frame(FrameKind::Evaluate) => {
                let coalesced = self.throttle.frame_ran();
                self.stats.coalesced_events += u64::from(coalesced);
                self.evaluate_for(Trigger::Activity, env);
            }
            Signal::Frame(FrameKind::AutoScrollCheck { generation }) => {
                self.poll_watcher(generation, env);
            }
        }
    }

    /// Re-derive the visual state from the current offset and flags.
    ///
    /// Idempotent: with nothing changed, a second call schedules no timer
    /// and pushes no class update.
    pub fn evaluate<E: Environment>(&mut self, env: &mut E) {
        self.evaluate_for(Trigger::Recheck, env);
    }

    fn evaluate_for<E: Environment>(&mut self, trigger: Trigger, env: &mut E) {
        self.stats.evaluations += 1;
        let y = sample_offset(env);

        if self.config.is_at_top(y) {
            self.auto_scrolling = false;
            self.cancel_fade(env);
            self.set_visibility(Visibility::Hidden, env);
            return;
        }

        if self.is_engaged() {
            self.cancel_fade(env);
            self.set_visibility(Visibility::Active, env);
            return;
        }

        match (trigger, self.visibility) {
            (Trigger::Activity, _) | (Trigger::Recheck, Visibility::Hidden) => {
                self.set_visibility(Visibility::Active, env);
                self.restart_fade(env);
            }
            (Trigger::Recheck, Visibility::Active) => {
                if self.fade_timer.is_none() {
                    self.restart_fade(env);
                }
            }
            (Trigger::Recheck, Visibility::Idle) => {}
        }
    }

    fn on_scroll_like<E: Environment>(&mut self, signal: Signal, env: &mut E) {
        if self.throttle.note_event() {
            trace!(?signal, "requesting evaluation frame");
            env.request_frame(FrameKind::Evaluate);
        }
    }

    /// Pointer-enter, touch-start or focus: pin the button at full opacity.
    fn engage<E: Environment>(&mut self, env: &mut E) {
        self.cancel_fade(env);
        if !self.config.is_at_top(sample_offset(env)) {
            self.set_visibility(Visibility::Active, env);
        }
    }

    /// An interaction ended; start the quiet delay if nothing else holds
    /// the button. Only an active button has a quiet delay to wait out.
    fn resume_fade<E: Environment>(&mut self, env: &mut E) {
        if self.visibility != Visibility::Active
            || self.is_engaged()
            || self.config.is_at_top(sample_offset(env))
        {
            return;
        }
        self.restart_fade(env);
    }

    fn click<E: Environment>(&mut self, env: &mut E) {
        if self.config.is_at_top(sample_offset(env)) {
            trace!("click ignored at top");
            return;
        }

        self.auto_scrolling = true;
        self.stats.auto_scrolls_started += 1;
        self.cancel_fade(env);
        self.set_visibility(Visibility::Active, env);

        let smooth = env.smooth_scroll_to_top();

        if self.last_interaction == Some(InteractionKind::Pointer) {
            if let Some(id) = self.focus_release_timer.take() {
                env.cancel_timer(id);
            }
            let id = env.schedule_timer(TimerKind::FocusRelease, self.config.blur_delay());
            self.focus_release_timer = Some(id);
        }

        match smooth {
            Ok(()) => {
                let generation = self.next_generation;
                self.next_generation += 1;
                self.watcher = Some(AutoScrollWatcher::new(
                    generation,
                    env.now(),
                    self.config.auto_scroll_timeout(),
                ));
                debug!(generation, "auto-scroll started");
                env.request_frame(FrameKind::AutoScrollCheck { generation });
            }
            Err(err) => {
                debug!(%err, "smooth scroll unavailable; jumping to top");
                env.jump_to_top();
                self.auto_scrolling = false;
                self.watcher = None;
                self.evaluate(env);
            }
        }
    }

    fn poll_watcher<E: Environment>(&mut self, generation: u64, env: &mut E) {
        let Some(watcher) = self.watcher else {
            trace!(generation, "auto-scroll frame without watcher");
            return;
        };
        if watcher.generation() != generation {
            trace!(
                generation,
                current = watcher.generation(),
                "stale auto-scroll frame"
            );
            return;
        }

        let at_top = self.config.is_at_top(sample_offset(env));
        match watcher.poll(at_top, env.now()) {
            WatchOutcome::Pending => env.request_frame(FrameKind::AutoScrollCheck { generation }),
            WatchOutcome::ReachedTop => {
                debug!(generation, "auto-scroll reached top");
                self.watcher = None;
                self.auto_scrolling = false;
                self.evaluate(env);
            }
            WatchOutcome::TimedOut => {
                debug!(
                    generation,
                    elapsed_ms = watcher.elapsed(env.now()).as_millis() as u64,
                    "auto-scroll timed out"
                );
                self.stats.auto_scroll_timeouts += 1;
                self.watcher = None;
                self.auto_scrolling = false;
                if !self.pointer_over && !self.has_focus {
                    self.restart_fade(env);
                }
            }
        }
    }

    fn on_timer<E: Environment>(&mut self, id: TimerId, env: &mut E) {
        if self.fade_timer == Some(id) {
            self.fade_timer = None;
            if self.is_engaged() || !self.visibility.is_shown() {
                return;
            }
            self.set_visibility(Visibility::Idle, env);
        } else if self.focus_release_timer == Some(id) {
            self.focus_release_timer = None;
            if let Err(err) = env.release_focus() {
                debug!(%err, "focus release failed");
            }
            self.has_focus = false;
            self.resume_fade(env);
        } else {
            trace!(%id, "ignoring stale timer");
        }
    }

    const fn is_engaged(&self) -> bool {
        self.pointer_over || self.has_focus || self.auto_scrolling
    }

    fn cancel_fade<E: Environment>(&mut self, env: &mut E) {
        if let Some(id) = self.fade_timer.take() {
            env.cancel_timer(id);
        }
    }

    fn restart_fade<E: Environment>(&mut self, env: &mut E) {
        self.cancel_fade(env);
        let delay: Duration = self.config.quiet_delay();
        self.fade_timer = Some(env.schedule_timer(TimerKind::Fade, delay));
        self.stats.fade_timers_scheduled += 1;
    }

    fn set_visibility<E: Environment>(&mut self, next: Visibility, env: &mut E) {
        if self.visibility != next {
            debug!(
                from = self.visibility.as_str(),
                to = next.as_str(),
                "visibility transition"
            );
            self.visibility = next;
        }
        if self.applied != Some(next) {
            env.apply_visibility(next);
            self.applied = Some(next);
        }
    }
}

fn sample_offset<E: Environment>(env: &E) -> f64 {
    let y = env.scroll_y();
    if y.is_finite() { y } else { 0.0 }
}
