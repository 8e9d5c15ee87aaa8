#![forbid(unsafe_code)]

//! DOM event wiring table.
//!
//! Platform-independent so the mapping from browser events to controller
//! [`Signal`]s can be checked natively; `wasm.rs` walks [`LISTENERS`] to
//! register the actual callbacks.

use bttop_core::{InteractionKind, Signal};

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Window,
    Button,
}

/// One `addEventListener` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSpec {
    pub target: ListenerTarget,
    pub event: &'static str,
    pub signal: Signal,
    /// Registered with `{ passive: true }`.
    pub passive: bool,
}

const fn on(
    target: ListenerTarget,
    event: &'static str,
    signal: Signal,
    passive: bool,
) -> ListenerSpec {
    ListenerSpec {
        target,
        event,
        signal,
        passive,
    }
}

use ListenerTarget::{Button, Window};

const POINTER: Signal = Signal::Interaction(InteractionKind::Pointer);
const KEYBOARD: Signal = Signal::Interaction(InteractionKind::Keyboard);

/// Every listener, in registration order.
pub const LISTENERS: &[ListenerSpec] = &[
    // Interaction-kind detection.
    on(Window, "pointerdown", POINTER, true),
    on(Window, "touchstart", POINTER, true),
    on(Window, "mousedown", POINTER, true),
    on(Window, "keydown", KEYBOARD, true),
    // Button.
    on(Button, "click", Signal::Click, false),
    on(Button, "pointerenter", Signal::PointerEnter, false),
    on(Button, "pointerleave", Signal::PointerLeave, false),
    on(Button, "touchstart", Signal::ButtonTouchStart, true),
    on(Button, "touchend", Signal::ButtonTouchEnd, true),
    on(Button, "touchcancel", Signal::ButtonTouchCancel, false),
    on(Button, "focus", Signal::Focus, false),
    on(Button, "blur", Signal::Blur, false),
    // Throttled page movement.
    on(Window, "scroll", Signal::Scroll, true),
    on(Window, "wheel", Signal::Wheel, true),
    on(Window, "touchmove", Signal::TouchMove, true),
    on(Window, "resize", Signal::Resize, false),
];

/// Signal for `event` fired on `target`, if the widget listens for it.
#[must_use]
pub fn signal_for(target: ListenerTarget, event: &str) -> Option<Signal> {
    LISTENERS
        .iter()
        .find(|spec| spec.target == target && spec.event == event)
        .map(|spec| spec.signal)
}
