#![forbid(unsafe_code)]

//! Frame throttling of scroll-like input storms.
//!
//! ```sh
//! cargo test -p bttop-harness --test throttle_bursts
//! ```

use bttop_core::{Signal, Visibility};
use bttop_harness::{FRAME_INTERVAL, SimulatedPage};
use proptest::prelude::*;

const SCROLL_LIKE: [Signal; 4] = [Signal::Scroll, Signal::Wheel, Signal::TouchMove, Signal::Resize];

#[test]
fn burst_within_one_frame_evaluates_once() {
    for signal in SCROLL_LIKE {
        let mut page = SimulatedPage::ready_at(700.0);
        let baseline = page.controller().stats().evaluations;
        for _ in 0..50 {
            page.fire(signal);
        }
        page.advance_frames(1);
        assert_eq!(
            page.controller().stats().evaluations - baseline,
            1,
            "{signal:?} burst should collapse to one evaluation"
        );
        assert_eq!(page.controller().stats().coalesced_events, 49);
        page.advance_frames(5);
        assert_eq!(
            page.evaluations_per_frame().iter().sum::<u64>(),
            1,
            "{signal:?} must not leave extra frames behind"
        );
    }
}

#[test]
fn mixed_burst_shares_one_frame() {
    let mut page = SimulatedPage::ready_at(700.0);
    for _ in 0..10 {
        for signal in SCROLL_LIKE {
            page.fire(signal);
        }
    }
    assert!(page.snapshot().evaluation_in_flight);
    page.advance_frames(1);
    assert!(!page.snapshot().evaluation_in_flight);
    assert_eq!(page.evaluations_per_frame(), &[1]);
}

#[test]
fn resize_reevaluates_against_current_offset() {
    let mut page = SimulatedPage::ready_at(700.0);
    page.advance_ms(700);
    assert_eq!(page.visibility(), Visibility::Idle);
    page.fire(Signal::Resize);
    page.advance_frames(1);
    assert_eq!(page.visibility(), Visibility::Active);
}

#[test]
fn logging_does_not_disturb_dispatch() {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let mut page = SimulatedPage::ready_at(0.0);
        page.scroll_to(400.0);
        page.advance_frames(1);
        page.pointer_click();
        page.advance_ms(1_000);
        assert_eq!(page.visibility(), Visibility::Hidden);
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn never_more_than_one_evaluation_per_frame(
        storm in prop::collection::vec((0usize..4, 0u64..40, prop::option::of(3.0f64..6_000.0)), 1..200),
    ) {
        let mut page = SimulatedPage::ready_at(500.0);
        for (kind, gap_ms, offset) in storm {
            if let Some(y) = offset {
                page.scroll_to(y);
            }
            page.fire(SCROLL_LIKE[kind]);
            page.advance_ms(gap_ms);
        }
        page.advance(FRAME_INTERVAL * 2);
        for (frame, &count) in page.evaluations_per_frame().iter().enumerate() {
            prop_assert!(count <= 1, "frame {} ran {} evaluations", frame, count);
        }
        prop_assert!(!page.snapshot().evaluation_in_flight);
    }
}
