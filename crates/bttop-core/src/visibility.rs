#![forbid(unsafe_code)]

//! Three-way visual state of the button and its CSS class mapping.

/// Class applied while the page sits at the top.
pub const CLASS_HIDDEN_TOP: &str = "hidden-top";
/// Class applied while the button is shown.
pub const CLASS_VISIBLE: &str = "visible";
/// Class layered on top of [`CLASS_VISIBLE`] while idle.
pub const CLASS_FADED: &str = "faded";

/// Every class the controller manages.
pub const MANAGED_CLASSES: [&str; 3] = [CLASS_HIDDEN_TOP, CLASS_VISIBLE, CLASS_FADED];

/// Visual state of the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Page is within tolerance of the top; button is not shown.
    #[default]
    Hidden,
    /// Shown at full opacity.
    Active,
    /// Shown but dimmed after the quiet delay.
    Idle,
}

impl Visibility {
    #[must_use]
    pub const fn is_shown(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    #[must_use]
    pub const fn is_faded(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Classes that must be present on the element for this state.
    #[must_use]
    pub const fn classes(self) -> &'static [&'static str] {
        match self {
            Self::Hidden => &[CLASS_HIDDEN_TOP],
            Self::Active => &[CLASS_VISIBLE],
            Self::Idle => &[CLASS_VISIBLE, CLASS_FADED],
        }
    }

    /// Split [`MANAGED_CLASSES`] into `(add, remove)` for this state.
    #[must_use]
    pub fn class_delta(self) -> (Vec<&'static str>, Vec<&'static str>) {
        let present = self.classes();
        MANAGED_CLASSES
            .iter()
            .copied()
            .partition(|class| present.contains(class))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Active => "active",
            Self::Idle => "idle",
        }
    }
}
