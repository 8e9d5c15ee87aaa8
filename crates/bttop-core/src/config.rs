#![forbid(unsafe_code)]

//! Tunable parameters for the back-to-top widget.
//!
//! [`WidgetConfig`] groups the controller timing ([`BackTopConfig`]) and the
//! presentation ([`StyleConfig`]). Every default matches the values the
//! widget ships with, so `WidgetConfig::default()` is the stock behavior.
//!
//! # Loading
//!
//! With the `config` feature enabled, configuration can be read from TOML or
//! JSON. Missing fields fall back to their defaults.
//!
//! ```toml
//! [behavior]
//! tolerance = 4.0
//! quiet_delay_ms = 1200
//!
//! [style]
//! size_px = 60
//! ```
//!
//! ```rust,ignore
//! let config = WidgetConfig::from_toml_str(text)?;
//! let config = WidgetConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use core::time::Duration;

/// Scroll offset at or below which the page counts as "at top".
pub const DEFAULT_TOP_TOLERANCE: f64 = 2.0;
/// Idle time before an active button fades.
pub const DEFAULT_QUIET_DELAY_MS: u64 = 700;
/// Upper bound on how long the auto-scroll watcher polls.
pub const DEFAULT_AUTO_SCROLL_TIMEOUT_MS: u64 = 3000;
/// Delay before focus is released after a pointer-initiated click.
pub const DEFAULT_BLUR_DELAY_MS: u64 = 160;

/// Errors raised while loading or validating a [`WidgetConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[cfg(feature = "config")]
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("malformed TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

// ---------------------------------------------------------------------------
// Top-level WidgetConfig
// ---------------------------------------------------------------------------

/// Complete widget configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct WidgetConfig {
    /// Controller timing and thresholds.
    pub behavior: BackTopConfig,
    /// Stylesheet and markup parameters.
    pub style: StyleConfig,
}

impl WidgetConfig {
    /// Check every section for values the widget cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.behavior.validate()?;
        self.style.validate()
    }

    /// Load from a TOML string and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string and validate.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty-printed JSON string.
    #[cfg(feature = "config")]
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Timing and threshold parameters for [`crate::BackTopController`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BackTopConfig {
    /// Scroll offset (CSS px) at or below which the button hides.
    pub tolerance: f64,
    /// Quiet period before an unattended button fades.
    pub quiet_delay_ms: u64,
    /// How long the auto-scroll watcher polls before forcing completion.
    pub auto_scroll_timeout_ms: u64,
    /// Delay before focus is dropped after a pointer click.
    pub blur_delay_ms: u64,
}

impl Default for BackTopConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOP_TOLERANCE,
            quiet_delay_ms: DEFAULT_QUIET_DELAY_MS,
            auto_scroll_timeout_ms: DEFAULT_AUTO_SCROLL_TIMEOUT_MS,
            blur_delay_ms: DEFAULT_BLUR_DELAY_MS,
        }
    }
}

impl BackTopConfig {
    #[must_use]
    pub const fn quiet_delay(&self) -> Duration {
        Duration::from_millis(self.quiet_delay_ms)
    }

    #[must_use]
    pub const fn auto_scroll_timeout(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_timeout_ms)
    }

    #[must_use]
    pub const fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.blur_delay_ms)
    }

    /// Whether `y` counts as "at top".
    #[inline]
    #[must_use]
    pub fn is_at_top(&self, y: f64) -> bool {
        y <= self.tolerance
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "behavior.tolerance",
                "must be a finite, non-negative offset",
            ));
        }
        if self.quiet_delay_ms == 0 {
            return Err(ConfigError::invalid(
                "behavior.quiet_delay_ms",
                "must be greater than zero",
            ));
        }
        if self.auto_scroll_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "behavior.auto_scroll_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Presentation parameters rendered into the injected stylesheet and markup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StyleConfig {
    /// DOM id of the button; also scopes every CSS rule.
    pub element_id: String,
    /// Accessible label, used for both `aria-label` and `title`.
    pub label: String,
    pub size_px: u32,
    pub gap_px: u32,
    /// Size below the compact breakpoint.
    pub compact_size_px: u32,
    /// Gap below the compact breakpoint.
    pub compact_gap_px: u32,
    /// Viewport width (px) at or below which the compact metrics apply.
    pub compact_breakpoint_px: u32,
    pub background: String,
    /// RGB triple used for the dimmed background, as `r,g,b`.
    pub faded_background_rgb: String,
    pub foreground: String,
    pub shadow: String,
    pub fade_opacity: f64,
    pub transition: String,
    pub z_index: i32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            element_id: "backToTopAuto".to_owned(),
            label: "Back to top".to_owned(),
            size_px: 52,
            gap_px: 20,
            compact_size_px: 48,
            compact_gap_px: 14,
            compact_breakpoint_px: 420,
            background: "rgba(50,50,60,0.95)".to_owned(),
            faded_background_rgb: "50,50,60".to_owned(),
            foreground: "#fff".to_owned(),
            shadow: "0 6px 18px rgba(0,0,0,0.28)".to_owned(),
            fade_opacity: 0.4,
            transition: "220ms cubic-bezier(.2,.9,.3,1)".to_owned(),
            z_index: 9999,
        }
    }
}

/// Characters that would end a declaration, a rule or the `<style>` element
/// when a value is interpolated into the stylesheet.
const CSS_BREAKOUT_CHARS: [char; 4] = ['{', '}', ';', '<'];

impl StyleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id_ok = !self.element_id.is_empty()
            && self
                .element_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !id_ok {
            return Err(ConfigError::invalid(
                "style.element_id",
                "must be a non-empty ASCII identifier",
            ));
        }
        for (field, value) in [
            ("style.background", &self.background),
            ("style.faded_background_rgb", &self.faded_background_rgb),
            ("style.foreground", &self.foreground),
            ("style.shadow", &self.shadow),
            ("style.transition", &self.transition),
        ] {
            if value.contains(CSS_BREAKOUT_CHARS) {
                return Err(ConfigError::invalid(
                    field,
                    "must not contain `{`, `}`, `;` or `<`",
                ));
            }
        }
        if self.size_px == 0 || self.compact_size_px == 0 {
            return Err(ConfigError::invalid(
                "style.size_px",
                "button sizes must be greater than zero",
            ));
        }
        if self.compact_breakpoint_px == 0 {
            return Err(ConfigError::invalid(
                "style.compact_breakpoint_px",
                "must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.fade_opacity) {
            return Err(ConfigError::invalid(
                "style.fade_opacity",
                "must lie within 0.0..=1.0",
            ));
        }
        Ok(())
    }
}
