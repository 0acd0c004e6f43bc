//! Match settings
//!
//! Loaded from a JSON file by the runner; every field has a default so a
//! partial file is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::{Authority, Difficulty, Style};

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Match configuration, fixed for the whole match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Requested player style (novice and duelist always play heavy)
    pub player_style: Style,
    /// Counterpart style; mirrors the player when unset
    pub counterpart_style: Option<Style>,
    pub authority: Authority,
    /// Seeds the AI brains
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Duelist,
            player_style: Style::Heavy,
            counterpart_style: None,
            authority: Authority::LocalAi,
            seed: 12345,
        }
    }
}

impl Settings {
    /// Style actually used for the player on this difficulty
    pub fn effective_player_style(&self) -> Style {
        if self.difficulty.is_forgiving() {
            Style::Heavy
        } else {
            self.player_style
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from `path`
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Write settings to `path` as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Role;

    #[test]
    fn test_forgiving_tiers_force_heavy() {
        let mut settings = Settings {
            player_style: Style::Light,
            difficulty: Difficulty::Novice,
            ..Settings::default()
        };
        assert_eq!(settings.effective_player_style(), Style::Heavy);

        settings.difficulty = Difficulty::Inferno;
        assert_eq!(settings.effective_player_style(), Style::Light);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"grandmaster"}"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Grandmaster);
        assert_eq!(settings.player_style, Style::Heavy);
        assert_eq!(settings.authority, Authority::LocalAi);
    }

    #[test]
    fn test_remote_authority_json() {
        let settings = Settings::from_json(
            r#"{"authority":{"mode":"remote","role":"guest"},"counterpart_style":"light"}"#,
        )
        .unwrap();
        assert_eq!(settings.authority, Authority::Remote { role: Role::Guest });
        assert_eq!(settings.counterpart_style, Some(Style::Light));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            difficulty: Difficulty::Inferno,
            player_style: Style::Light,
            seed: 7,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Settings::from_json(r#"{"difficulty":"impossible"}"#),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/ink-duel/settings.json");
        assert_eq!(settings, Settings::default());
        assert!(matches!(
            Settings::read("/nonexistent/ink-duel/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            seed: 99,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }
}
