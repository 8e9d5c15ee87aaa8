#![forbid(unsafe_code)]

//! `bttop-core` drives an auto-fading "back to top" button.
//!
//! Design goals:
//! - **Host-driven**: the embedding page pushes [`Signal`]s (scroll, pointer,
//!   focus, timer and frame callbacks) into a [`BackTopController`].
//! - **Injected environment**: clock, scroll offset, timers, frames, focus
//!   and class updates are reached through the [`Environment`] trait, so the
//!   state machine runs unchanged against the DOM or a simulated page.
//! - **No globals**: every controller is an independent value.
//!
//! The DOM binding lives in `bttop-web`; a deterministic simulated page for
//! tests lives in `bttop-harness`.

pub mod config;
pub mod controller;
pub mod environment;
pub mod style;
pub mod throttle;
pub mod visibility;
pub mod watcher;

pub use config::{BackTopConfig, ConfigError, StyleConfig, WidgetConfig};
pub use controller::{
    BackTopController, ControllerSnapshot, ControllerStats, InteractionKind, Signal,
};
pub use environment::{
    Environment, FocusReleaseError, FrameKind, ScrollRequestError, TimerId, TimerKind,
};
pub use style::{ButtonMarkup, render_stylesheet};
pub use visibility::Visibility;
