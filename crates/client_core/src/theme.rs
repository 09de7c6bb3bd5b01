//! Light/dark theme flag. Toggling is pure; applying it to a surface is a
//! separate side effect.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Label for the control that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Switch to Dark Mode",
            Theme::Dark => "Switch to Light Mode",
        }
    }
}

/// Whatever displays the theme (a terminal palette, a window attribute).
pub trait ThemeSurface: Send {
    fn apply(&mut self, theme: Theme);
}

/// Surface for headless use; records the last applied theme.
#[derive(Debug, Default)]
pub struct NoopThemeSurface {
    pub applied: Option<Theme>,
}

impl ThemeSurface for NoopThemeSurface {
    fn apply(&mut self, theme: Theme) {
        self.applied = Some(theme);
    }
}
