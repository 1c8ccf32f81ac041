//! Overlay display preferences persisted between sessions

use crate::error::TelemetryResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Which session types the dashboard overlays are shown in.
///
/// Loaded at session start and saved at session end; has no effect on
/// ingestion correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Show overlays during practice sessions
    pub show_in_practice: bool,
    /// Show overlays during qualifying sessions
    pub show_in_qualifying: bool,
    /// Show overlays during races
    pub show_in_race: bool,
    /// Show overlays during test drives
    pub show_in_test_drive: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_in_practice: true,
            show_in_qualifying: true,
            show_in_race: true,
            show_in_test_drive: true,
        }
    }
}

impl OverlaySettings {
    /// Load from a JSON file, falling back to defaults when the file is
    /// missing or unreadable (a fresh install has no settings file)
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "settings file unreadable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> TelemetryResult<()> {
        let raw = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_true() {
        let settings = OverlaySettings::default();
        assert!(settings.show_in_practice);
        assert!(settings.show_in_qualifying);
        assert!(settings.show_in_race);
        assert!(settings.show_in_test_drive);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = OverlaySettings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, OverlaySettings::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = OverlaySettings {
            show_in_race: false,
            ..OverlaySettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(OverlaySettings::load(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, br#"{"show_in_practice": false}"#).unwrap();
        let settings = OverlaySettings::load(&path);
        assert!(!settings.show_in_practice);
        assert!(settings.show_in_race);
    }

    #[test]
    fn test_garbage_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"not json at all").unwrap();
        assert_eq!(OverlaySettings::load(&path), OverlaySettings::default());
    }
}
