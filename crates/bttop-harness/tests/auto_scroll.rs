#![forbid(unsafe_code)]

//! Click handling: smooth scroll, completion watcher, fallback and focus.
//!
//! ```sh
//! cargo test -p bttop-harness --test auto_scroll
//! ```

use core::time::Duration;

use bttop_core::{BackTopConfig, Signal, TimerKind, Visibility};
use bttop_harness::{FocusOwner, SimulatedPage, SmoothScrollMode};
use pretty_assertions::assert_eq;

const BLUR_DELAY: Duration = Duration::from_millis(160);

// ============================================================================
// Completion
// ============================================================================

#[test]
fn click_sets_auto_scrolling_and_clears_at_top() {
    let mut page = SimulatedPage::ready_at(500.0);
    page.dispatch(Signal::Click);

    let snap = page.snapshot();
    assert!(snap.auto_scrolling);
    assert!(snap.watcher_active);
    assert_eq!(snap.visibility, Visibility::Active);
    assert_eq!(page.live_timers(TimerKind::Fade), 0);

    // 500 px at 120 px/frame reaches the top on the fifth frame.
    page.advance_frames(4);
    assert!(page.snapshot().auto_scrolling);
    assert_eq!(page.visibility(), Visibility::Active);

    page.advance_frames(1);
    assert_eq!(page.offset(), 0.0);
    let snap = page.snapshot();
    assert!(!snap.auto_scrolling);
    assert!(!snap.watcher_active);
    assert_eq!(snap.visibility, Visibility::Hidden);
}

#[test]
fn auto_scroll_never_fades_mid_flight() {
    let mut page = SimulatedPage::ready_at(20_000.0)
        .with_smooth_scroll(SmoothScrollMode::Animated { px_per_frame: 200.0 });
    page.dispatch(Signal::Click);
    // 100 frames of travel: well past the quiet delay, inside the timeout.
    for _ in 0..95 {
        page.advance_frames(1);
        assert_eq!(page.visibility(), Visibility::Active);
        assert_eq!(page.live_timers(TimerKind::Fade), 0);
    }
    page.advance_ms(1_000);
    assert_eq!(page.visibility(), Visibility::Hidden);
}

#[test]
fn click_within_tolerance_does_nothing() {
    let mut page = SimulatedPage::ready_at(2.0);
    page.pointer_click();
    assert!(!page.snapshot().auto_scrolling);
    assert_eq!(page.smooth_requests(), 0);
    assert_eq!(page.live_timers(TimerKind::FocusRelease), 0);
}

#[test]
fn repeated_clicks_keep_a_single_watcher() {
    let mut page = SimulatedPage::ready_at(3_000.0);
    page.dispatch(Signal::Click);
    page.advance_frames(3);
    page.dispatch(Signal::Click);
    page.advance_frames(1);
    page.dispatch(Signal::Click);
    page.advance_ms(2_000);
    let snap = page.snapshot();
    assert_eq!(snap.visibility, Visibility::Hidden);
    assert!(!snap.watcher_active);
    assert_eq!(page.controller().stats().auto_scrolls_started, 3);
    assert_eq!(page.controller().stats().auto_scroll_timeouts, 0);
}

// ============================================================================
// Timeout
// ============================================================================

#[test]
fn stalled_scroll_times_out_and_resumes_fade() {
    let mut page = SimulatedPage::ready_at(2_000.0).with_smooth_scroll(SmoothScrollMode::Stalls {
        px_per_frame: 200.0,
        stall_at: 300.0,
    });
    page.dispatch(Signal::Click);

    page.advance_ms(3_000);
    assert!(page.snapshot().auto_scrolling, "still inside timeout window");

    // First frame strictly past 3000 ms after the click.
    page.advance_frames(1);
    let snap = page.snapshot();
    assert!(!snap.auto_scrolling);
    assert!(!snap.watcher_active);
    assert!(snap.fade_pending);
    assert_eq!(snap.visibility, Visibility::Active);
    assert_eq!(page.controller().stats().auto_scroll_timeouts, 1);

    page.advance_ms(700);
    assert_eq!(page.visibility(), Visibility::Idle);
}

#[test]
fn timeout_with_hover_does_not_restart_fade() {
    let mut page = SimulatedPage::ready_at(2_000.0).with_smooth_scroll(SmoothScrollMode::Stalls {
        px_per_frame: 200.0,
        stall_at: 900.0,
    });
    page.pointer_enter();
    page.dispatch(Signal::Click);
    page.advance_ms(3_100);
    let snap = page.snapshot();
    assert!(!snap.auto_scrolling);
    assert!(!snap.fade_pending);
    page.advance_ms(5_000);
    assert_eq!(page.visibility(), Visibility::Active);
}

#[test]
fn user_interrupting_scroll_ends_by_timeout() {
    let config = BackTopConfig {
        auto_scroll_timeout_ms: 500,
        ..BackTopConfig::default()
    };
    let mut page = SimulatedPage::with_config(config, 4_000.0);
    page.dispatch(Signal::Ready);
    page.dispatch(Signal::Click);
    page.advance_frames(3);
    // Scrolling by hand cancels the smooth animation.
    page.scroll_to(3_500.0);
    page.advance_ms(520);
    let snap = page.snapshot();
    assert!(!snap.auto_scrolling);
    assert_eq!(page.offset(), 3_500.0);
    assert_eq!(snap.visibility, Visibility::Active);
    assert!(snap.fade_pending);
}

// ============================================================================
// Fallback
// ============================================================================

#[test]
fn unsupported_smooth_scroll_jumps_immediately() {
    let mut page =
        SimulatedPage::ready_at(500.0).with_smooth_scroll(SmoothScrollMode::Unsupported);
    page.dispatch(Signal::Click);

    assert_eq!(page.jumps(), 1);
    assert_eq!(page.offset(), 0.0);
    let snap = page.snapshot();
    assert!(!snap.auto_scrolling);
    assert!(!snap.watcher_active);
    assert_eq!(snap.visibility, Visibility::Hidden);

    page.advance_frames(2);
    assert_eq!(
        page.class_log(),
        &[Visibility::Active, Visibility::Hidden],
        "the follow-up scroll event must not churn classes"
    );
}

// ============================================================================
// Focus handling
// ============================================================================

#[test]
fn pointer_click_drops_focus_after_blur_delay() {
    let mut page = SimulatedPage::ready_at(900.0);
    page.pointer_click();
    assert_eq!(page.focus(), FocusOwner::Button);
    assert_eq!(page.live_timers(TimerKind::FocusRelease), 1);

    page.advance(BLUR_DELAY - Duration::from_millis(1));
    assert_eq!(page.focus(), FocusOwner::Button);
    assert!(page.snapshot().has_focus);

    page.advance(Duration::from_millis(1));
    assert_eq!(page.focus(), FocusOwner::Body);
    assert!(!page.snapshot().has_focus);
}

#[test]
fn tap_drops_focus_too() {
    let mut page = SimulatedPage::ready_at(900.0);
    page.focus_button();
    page.tap();
    page.advance_ms(200);
    assert_eq!(page.focus(), FocusOwner::Body);
}

#[test]
fn focus_release_also_blurs_other_elements() {
    let mut page = SimulatedPage::ready_at(900.0);
    page.focus_elsewhere();
    page.dispatch(Signal::Interaction(bttop_core::InteractionKind::Pointer));
    page.dispatch(Signal::Click);
    page.advance(BLUR_DELAY);
    assert_eq!(page.focus(), FocusOwner::Body);
}

#[test]
fn keyboard_click_keeps_focus() {
    let mut page = SimulatedPage::ready_at(900.0);
    page.keyboard_click();
    assert_eq!(page.live_timers(TimerKind::FocusRelease), 0);
    page.advance_ms(2_000);
    assert_eq!(page.focus(), FocusOwner::Button);
    assert!(page.snapshot().has_focus);
    assert_eq!(page.visibility(), Visibility::Hidden);
}

#[test]
fn last_interaction_kind_decides_per_click() {
    let mut page = SimulatedPage::ready_at(900.0);
    page.dispatch(Signal::Interaction(bttop_core::InteractionKind::Pointer));
    page.keyboard_click();
    assert_eq!(page.live_timers(TimerKind::FocusRelease), 0);
}

#[test]
fn failed_focus_release_is_swallowed() {
    let mut page = SimulatedPage::ready_at(900.0).with_failing_focus_release();
    page.pointer_click();
    page.advance(BLUR_DELAY);
    // The element keeps DOM focus, but the controller stops treating it as
    // focused so the button can still fade.
    assert_eq!(page.focus(), FocusOwner::Button);
    assert!(!page.snapshot().has_focus);
    page.advance_ms(2_000);
    assert_eq!(page.visibility(), Visibility::Hidden);
}

#[test]
fn pointer_click_on_stalled_scroll_fades_after_focus_release() {
    let mut page = SimulatedPage::ready_at(2_000.0).with_smooth_scroll(SmoothScrollMode::Stalls {
        px_per_frame: 400.0,
        stall_at: 600.0,
    });
    page.pointer_click();
    page.advance_ms(3_100);
    let snap = page.snapshot();
    assert!(!snap.has_focus);
    assert!(!snap.auto_scrolling);
    assert!(snap.fade_pending);
    page.advance_ms(700);
    assert_eq!(page.visibility(), Visibility::Idle);
}
