#![forbid(unsafe_code)]

//! Browser host for the back-to-top button.
//!
//! Injects the stylesheet and `<button>`, wires DOM listeners to a
//! [`bttop_core::BackTopController`] and implements
//! [`bttop_core::Environment`] on top of `window`, `setTimeout` and
//! `requestAnimationFrame`.
//!
//! Everything touching JS is `wasm32`-only; the listener table in
//! [`listeners`] is plain data and is tested natively.
//!
//! From JS:
//!
//! ```js
//! import init, { installBackToTop } from "./bttop_web.js";
//! await init();
//! const handle = installBackToTop();
//! ```
//!
//! Build with `--features autostart` to install with the default
//! configuration as soon as the module is instantiated (waiting for
//! `DOMContentLoaded` when the document is still loading).

pub mod listeners;

pub use listeners::{LISTENERS, ListenerSpec, ListenerTarget, signal_for};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{BackTopHandle, InstallError, install, install_with, install_with_config};

/// Id given to the injected `<style>` element for a button id.
#[must_use]
pub fn stylesheet_id(element_id: &str) -> String {
    format!("{element_id}-style")
}

/// Whether `document.readyState` still reports `"loading"`, in which case
/// installation waits for `DOMContentLoaded`.
#[must_use]
pub fn document_is_loading(ready_state: &str) -> bool {
    ready_state == "loading"
}
