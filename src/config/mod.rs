//! Formatting settings: schema, TOML loading and the process-wide default.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{FormattingSettings, IndentationText, NewLineKind, SettingsFile};

use std::sync::RwLock;

static GLOBAL_SETTINGS: RwLock<FormattingSettings> = RwLock::new(FormattingSettings::DEFAULT);

/// Snapshot of the process-wide formatting settings.
///
/// Files without their own override plan edits with these.
pub fn global_settings() -> FormattingSettings {
    match GLOBAL_SETTINGS.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide formatting settings.
pub fn set_global_settings(settings: FormattingSettings) {
    match GLOBAL_SETTINGS.write() {
        Ok(mut guard) => *guard = settings,
        Err(poisoned) => *poisoned.into_inner() = settings,
    }
}
