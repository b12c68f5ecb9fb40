//! Theme preference service.
//!
//! # Responsibility
//! - Resolve the active light/dark theme from the stored choice and the
//!   system preference.
//! - Persist explicit user choices.
//!
//! # Invariants
//! - A stored `light` or `dark` always wins over the system preference.
//! - Any other stored value is ignored.

use crate::repo::kv_repo::{KeyValueStore, RepoResult};
use log::{info, warn};
use std::fmt::{Display, Formatter};

/// Storage key holding the explicit theme choice.
pub const THEME_STORAGE_KEY: &str = "kanban-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Label of the toggle control, which names the other theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark mode",
            Self::Dark => "Light mode",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme preference over a key-value backend.
///
/// Without a backend the choice lives only for the session.
pub struct ThemeService<K: KeyValueStore> {
    store: Option<K>,
    session_choice: Option<Theme>,
}

impl<K: KeyValueStore> ThemeService<K> {
    pub fn new(store: K) -> Self {
        Self {
            store: Some(store),
            session_choice: None,
        }
    }

    /// Service that never persists.
    pub fn in_memory() -> Self {
        Self {
            store: None,
            session_choice: None,
        }
    }

    /// Explicit choice, if any.
    pub fn stored(&self) -> Option<Theme> {
        let Some(store) = self.store.as_ref() else {
            return self.session_choice;
        };
        match store.get(THEME_STORAGE_KEY) {
            Ok(raw) => raw.as_deref().and_then(Theme::parse).or(self.session_choice),
            Err(err) => {
                warn!("event=theme_load module=theme status=error error={err}");
                self.session_choice
            }
        }
    }

    /// Active theme: stored choice, else system preference.
    pub fn current(&self, system_prefers_dark: bool) -> Theme {
        self.stored().unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    /// Records an explicit choice. The choice applies for the session even
    /// when the write fails.
    pub fn set(&mut self, theme: Theme) -> RepoResult<()> {
        self.session_choice = Some(theme);
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };
        store.set(THEME_STORAGE_KEY, theme.as_str())?;
        info!("event=theme_set module=theme status=ok theme={theme}");
        Ok(())
    }

    /// Switches to the other theme and returns it.
    pub fn toggle(&mut self, system_prefers_dark: bool) -> Theme {
        let next = self.current(system_prefers_dark).toggled();
        if let Err(err) = self.set(next) {
            warn!("event=theme_set module=theme status=error theme={next} error={err}");
        }
        next
    }
}
