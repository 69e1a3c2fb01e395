//! Light/dark theme preference, persisted across sessions.
//!
//! The preference is a single word in a file under the user's config
//! directory. Reads are lenient: a missing or garbled file means the
//! default theme, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The two UI themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the persisted name of the theme.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parses a persisted name. Returns `None` for anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Returns the other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from persisting the theme preference.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// No config directory exists on this platform.
    #[error("no config directory available for the theme preference")]
    NoConfigDir,

    /// Reading or writing the preference file failed.
    #[error("theme preference i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads and saves the theme preference file.
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    /// Uses an explicit preference file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the platform config directory (`taskdeck/theme` under it).
    ///
    /// # Errors
    ///
    /// [`ThemeError::NoConfigDir`] when the platform reports none.
    pub fn default_location() -> Result<Self, ThemeError> {
        let base = dirs::config_dir().ok_or(ThemeError::NoConfigDir)?;
        Ok(Self {
            path: base.join("taskdeck").join("theme"),
        })
    }

    /// Path of the preference file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted theme. A missing file or unknown contents
    /// fall back to the default.
    #[must_use]
    pub fn load(&self) -> Theme {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| Theme::parse(raw.trim()))
            .unwrap_or_default()
    }

    /// Writes the theme, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Filesystem failures while creating directories or writing.
    pub fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, theme.as_str())?;
        Ok(())
    }

    /// Flips the persisted theme and returns the new value.
    ///
    /// # Errors
    ///
    /// Same failures as [`ThemeStore::save`].
    pub fn toggle(&self) -> Result<Theme, ThemeError> {
        let next = self.load().toggled();
        self.save(next)?;
        Ok(next)
    }
}
