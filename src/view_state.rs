//! Header view state as a pure reducer.
//!
//! The generated pages are static, but the header has two pieces of UI
//! state: whether the mobile menu is open and which color theme is active.
//! They are modelled here as a value plus the three actions that change it,
//! so the initial markup is rendered from an explicit state and the
//! embedded `theme.js` script applies exactly the same transitions.
//!
//! ```text
//!            Open                    ToggleTheme
//!   Closed ───────▶ Open      Light ◀───────────▶ Dark
//!          ◀───────
//!            Close
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Menu {
    Open,
    #[default]
    Closed,
}

impl Menu {
    /// Value of the `data-menu` attribute on the header.
    pub fn as_str(self) -> &'static str {
        match self {
            Menu::Open => "open",
            Menu::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Value of the `data-theme` attribute on `<html>`.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub menu: Menu,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Open,
    Close,
    ToggleTheme,
}

/// Apply one action to a state.
pub fn reduce(state: ViewState, action: Action) -> ViewState {
    match action {
        Action::Open => ViewState {
            menu: Menu::Open,
            ..state
        },
        Action::Close => ViewState {
            menu: Menu::Closed,
            ..state
        },
        Action::ToggleTheme => ViewState {
            theme: state.theme.toggled(),
            ..state
        },
    }
}

impl ViewState {
    pub fn is_menu_open(&self) -> bool {
        self.menu == Menu::Open
    }

    /// Label for the theme toggle: the theme a click switches to.
    pub fn toggle_label(&self) -> &'static str {
        match self.theme {
            Theme::Light => "Dark mode",
            Theme::Dark => "Light mode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_closed_light() {
        let state = ViewState::default();
        assert_eq!(state.menu, Menu::Closed);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn open_and_close_menu() {
        let opened = reduce(ViewState::default(), Action::Open);
        assert!(opened.is_menu_open());
        let closed = reduce(opened, Action::Close);
        assert!(!closed.is_menu_open());
    }

    #[test]
    fn open_is_idempotent() {
        let once = reduce(ViewState::default(), Action::Open);
        assert_eq!(reduce(once, Action::Open), once);
    }

    #[test]
    fn toggle_theme_twice_is_identity() {
        let state = ViewState {
            menu: Menu::Open,
            theme: Theme::Dark,
        };
        let toggled = reduce(state, Action::ToggleTheme);
        assert_eq!(toggled.theme, Theme::Light);
        assert_eq!(toggled.menu, Menu::Open);
        assert_eq!(reduce(toggled, Action::ToggleTheme), state);
    }

    #[test]
    fn menu_actions_keep_theme() {
        let dark = reduce(ViewState::default(), Action::ToggleTheme);
        assert_eq!(reduce(dark, Action::Open).theme, Theme::Dark);
        assert_eq!(reduce(dark, Action::Close).theme, Theme::Dark);
    }

    #[test]
    fn toggle_label_names_the_other_theme() {
        assert_eq!(ViewState::default().toggle_label(), "Dark mode");
        let dark = reduce(ViewState::default(), Action::ToggleTheme);
        assert_eq!(dark.toggle_label(), "Light mode");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ViewState::default()).unwrap();
        assert_eq!(json, r#"{"menu":"closed","theme":"light"}"#);
    }
}
