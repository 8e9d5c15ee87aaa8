#![forbid(unsafe_code)]

//! Deterministic test harness for `bttop-core`.
//!
//! [`SimulatedPage`] wires a [`bttop_core::BackTopController`] to an
//! in-memory page ([`SimEnvironment`]) with a virtual clock, a timer queue,
//! a ~60 Hz frame loop, a smooth-scroll model and focus tracking. Scenario
//! tests drive it with user-level actions (`scroll_to`, `pointer_click`,
//! `advance_ms`, ...) and inspect the controller snapshot and class log.

pub mod env;
pub mod page;

pub use env::{FocusOwner, SimEnvironment, SmoothScrollMode};
pub use page::{FRAME_INTERVAL, SimulatedPage};
