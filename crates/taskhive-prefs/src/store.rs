//! JSON-file-backed preference store.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use taskhive_core::config::PrefsConfig;
use taskhive_core::error::{AppError, ErrorKind};
use taskhive_core::AppResult;

use crate::theme::ThemeMode;

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Appearance preference.
    pub theme: ThemeMode,
    /// When the preferences were last written.
    pub updated_at: DateTime<Utc>,
}

impl Preferences {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            theme,
            updated_at: Utc::now(),
        }
    }
}

/// Stores preferences as a small JSON document on disk.
///
/// Read once at startup and written on every change. A missing file is not
/// an error: nothing has been saved yet.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Creates a store over the configured preferences path.
    pub fn new(config: &PrefsConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
        }
    }

    /// Creates a store over an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the stored preferences, or `None` when nothing has been saved.
    pub async fn load(&self) -> AppResult<Option<Preferences>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read preferences: {}", self.path.display()),
                    e,
                ));
            }
        };

        let preferences = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Malformed preferences file: {}", self.path.display()),
                e,
            )
        })?;

        Ok(Some(preferences))
    }

    /// Writes the preferences, creating parent directories as needed.
    pub async fn save(&self, preferences: &Preferences) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to create preferences directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, raw).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write preferences: {}", self.path.display()),
                e,
            )
        })?;

        debug!(
            path = %self.path.display(),
            theme = preferences.theme.as_str(),
            "Preferences saved"
        );
        Ok(())
    }

    /// Persists a theme change and returns the stored record.
    pub async fn set_theme(&self, theme: ThemeMode) -> AppResult<Preferences> {
        let preferences = Preferences::new(theme);
        self.save(&preferences).await?;
        Ok(preferences)
    }
}
