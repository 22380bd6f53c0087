//! Persisted user settings: the binarization threshold and the last
//! directory used for each slot.
//!
//! Storage format and location belong to the shell; this module only
//! defines the capability and an in-memory implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::slot::SlotName;
use crate::threshold::DEFAULT_THRESHOLD;

/// Key-value store the pipeline restores from and saves to.
pub trait SettingsStore {
    /// Stored threshold, or [`DEFAULT_THRESHOLD`] when none was saved.
    fn threshold(&self) -> f64;

    /// Remember the threshold for the next session.
    fn set_threshold(&mut self, value: f64);

    /// Directory the file picker for `slot` should open in.
    fn last_directory(&self, slot: SlotName) -> Option<PathBuf>;

    /// Remember the directory the last file for `slot` came from.
    fn set_last_directory(&mut self, slot: SlotName, dir: &Path);
}

/// Plain settings record. Serializable so file-backed stores can reuse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Binarization threshold.
    pub threshold: f64,
    /// Last directory per slot.
    pub last_directories: BTreeMap<SlotName, PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            last_directories: BTreeMap::new(),
        }
    }
}

impl SettingsStore for Settings {
    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn set_threshold(&mut self, value: f64) {
        self.threshold = value;
    }

    fn last_directory(&self, slot: SlotName) -> Option<PathBuf> {
        self.last_directories.get(&slot).cloned()
    }

    fn set_last_directory(&mut self, slot: SlotName, dir: &Path) {
        self.last_directories.insert(slot, dir.to_path_buf());
    }
}
