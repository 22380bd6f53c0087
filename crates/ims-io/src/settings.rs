//! JSON-file settings store.

use std::path::{Path, PathBuf};

use ims_pipeline::{Settings, SettingsStore, SlotName};
use tracing::debug;

use crate::IoError;

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "ims-settings.json";

/// [`Settings`] persisted as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    path: PathBuf,
    settings: Settings,
}

impl JsonSettings {
    /// Load settings from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file exists but cannot be read, and
    /// [`IoError::Settings`] if its contents are not valid settings JSON.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, IoError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Settings::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, settings })
    }

    /// Write the current settings back to the file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory settings record.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl SettingsStore for JsonSettings {
    fn threshold(&self) -> f64 {
        self.settings.threshold()
    }

    fn set_threshold(&mut self, value: f64) {
        self.settings.set_threshold(value);
    }

    fn last_directory(&self, slot: SlotName) -> Option<PathBuf> {
        self.settings.last_directory(slot)
    }

    fn set_last_directory(&mut self, slot: SlotName, dir: &Path) {
        self.settings.set_last_directory(slot, dir);
    }
}
