#![forbid(unsafe_code)]

//! Stylesheet and button markup injected by the host.
//!
//! Both are rendered from a [`StyleConfig`] so the host only has to insert
//! the resulting strings. All rules are scoped to `#<element_id>`; sizing
//! and colors go through `--bttop-*` custom properties on `:root`.

use std::fmt::Write as _;

use crate::config::StyleConfig;
use crate::visibility::{CLASS_FADED, CLASS_HIDDEN_TOP, CLASS_VISIBLE};

/// Upward chevron drawn inside the button (24×24 viewBox).
pub const CHEVRON_PATH: &str = "M12 8.3l4.95 4.95 1.4-1.4L12 5.5 5.65 11.85l1.4 1.4z";

/// Attributes set on the `<button>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMarkup {
    pub id: String,
    pub aria_label: String,
    pub title: String,
    /// Inner HTML (the icon).
    pub inner_html: String,
}

impl ButtonMarkup {
    #[must_use]
    pub fn from_config(style: &StyleConfig) -> Self {
        Self {
            id: style.element_id.clone(),
            aria_label: style.label.clone(),
            title: style.label.clone(),
            inner_html: format!(
                r#"<svg viewBox="0 0 24 24" aria-hidden="true" focusable="false"><path fill="currentColor" d="{CHEVRON_PATH}"/></svg>"#
            ),
        }
    }
}

/// Render the complete stylesheet for one widget.
#[must_use]
pub fn render_stylesheet(style: &StyleConfig) -> String {
    let id = &style.element_id;
    let mut css = String::with_capacity(2048);

    // Writing into a String cannot fail.
    let _ = writeln!(
        css,
        ":root{{\
--bttop-size:{size}px;\
--bttop-gap:{gap}px;\
--bttop-bg:{bg};\
--bttop-fg:{fg};\
--bttop-shadow:{shadow};\
--bttop-fade-opacity:{fade};\
--bttop-transition:{transition};\
--bttop-z:{z};\
}}",
        size = style.size_px,
        gap = style.gap_px,
        bg = style.background,
        fg = style.foreground,
        shadow = style.shadow,
        fade = style.fade_opacity,
        transition = style.transition,
        z = style.z_index,
    );

    let _ = writeln!(
        css,
        "#{id}{{\
position:fixed;\
right:var(--bttop-gap);\
bottom:var(--bttop-gap);\
width:var(--bttop-size);\
height:var(--bttop-size);\
border-radius:999px;\
display:grid;\
place-items:center;\
background:var(--bttop-bg);\
color:var(--bttop-fg);\
box-shadow:var(--bttop-shadow);\
border:none;\
cursor:pointer;\
-webkit-tap-highlight-color:transparent;\
opacity:0;\
transform:translateY(12px) scale(.96);\
pointer-events:none;\
transition:opacity var(--bttop-transition),transform var(--bttop-transition),background var(--bttop-transition);\
z-index:var(--bttop-z);\
}}"
    );

    let _ = writeln!(
        css,
        "#{id}.{CLASS_VISIBLE}{{opacity:1;transform:translateY(0) scale(1);pointer-events:auto;}}"
    );
    let _ = writeln!(
        css,
        "#{id}.{CLASS_FADED}{{background:rgba({rgb},var(--bttop-fade-opacity));opacity:0.75;transform:translateY(0) scale(.98);pointer-events:auto;}}",
        rgb = style.faded_background_rgb,
    );
    let _ = writeln!(
        css,
        "#{id}.{CLASS_HIDDEN_TOP}{{opacity:0 !important;transform:translateY(12px) scale(.96);pointer-events:none !important;}}"
    );
    let _ = writeln!(
        css,
        "#{id} svg{{width:20px;height:20px;transform:translateY(-1px);}}"
    );
    let _ = writeln!(
        css,
        "#{id}:focus-visible{{box-shadow:0 0 0 4px rgba(120,170,255,0.22),var(--bttop-shadow);outline:none;}}"
    );
    let _ = writeln!(
        css,
        "@media (max-width:{bp}px){{:root{{--bttop-gap:{gap}px;--bttop-size:{size}px;}}}}",
        bp = style.compact_breakpoint_px,
        gap = style.compact_gap_px,
        size = style.compact_size_px,
    );

    css
}
