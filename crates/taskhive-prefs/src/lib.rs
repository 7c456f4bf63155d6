//! # taskhive-prefs
//!
//! Local persistence for user preferences: a single JSON document holding
//! the light/dark theme choice, read at startup and written on toggle.

pub mod store;
pub mod theme;

pub use store::{PreferenceStore, Preferences};
pub use theme::ThemeMode;
