//! Player configuration
//!
//! Settings shared by the CLI and library users, loadable from a JSON file.
//! Every field is optional in the file; missing ones take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::tone::MAX_VOLUME;
use crate::{Result, RtttlError};

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume used when a play request does not specify one (0..=10)
    pub volume: u8,

    /// Octaves added to every parsed note
    pub octave_offset: i8,

    /// Play songs in the background by default
    pub background: bool,

    /// Period of the tick thread in milliseconds
    pub tick_interval_ms: u64,

    /// How often a paused blocking playback re-checks its state
    pub pause_poll_ms: u64,

    /// Sample rate in Hz for software tone generation
    pub sample_rate: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            volume: MAX_VOLUME,
            octave_offset: 0,
            background: false,
            tick_interval_ms: 1,
            pause_poll_ms: 5,
            sample_rate: 44_100,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlayerConfig =
            serde_json::from_str(json).map_err(|e| RtttlError::ConfigError(e.to_string()))?;
        config.validate()
    }

    /// Read and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the configuration, clamping the volume into range
    pub fn validate(mut self) -> Result<Self> {
        if self.sample_rate == 0 {
            return Err(RtttlError::ConfigError(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(RtttlError::ConfigError(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.pause_poll_ms == 0 {
            return Err(RtttlError::ConfigError(
                "pause_poll_ms must be greater than 0".to_string(),
            ));
        }
        if self.volume > MAX_VOLUME {
            log::warn!("Volume {} clamped to {}", self.volume, MAX_VOLUME);
            self.volume = MAX_VOLUME;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 10);
        assert_eq!(config.octave_offset, 0);
        assert!(!config.background);
        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(config.pause_poll_ms, 5);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PlayerConfig::from_json_str(r#"{"octave_offset": -1, "background": true}"#)
            .unwrap();
        assert_eq!(config.octave_offset, -1);
        assert!(config.background);
        assert_eq!(config.volume, 10);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn test_volume_is_clamped() {
        let config = PlayerConfig::from_json_str(r#"{"volume": 42}"#).unwrap();
        assert_eq!(config.volume, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PlayerConfig::from_json_str(r#"{"sample_rate": 0}"#),
            Err(RtttlError::ConfigError(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json_str(r#"{"tick_interval_ms": 0}"#),
            Err(RtttlError::ConfigError(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json_str(r#"{"pause_poll_ms": 0}"#),
            Err(RtttlError::ConfigError(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json_str("not json"),
            Err(RtttlError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"volume": 3, "sample_rate": 8000}}"#).unwrap();
        let config = PlayerConfig::load(file.path()).unwrap();
        assert_eq!(config.volume, 3);
        assert_eq!(config.sample_rate, 8000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlayerConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(RtttlError::Io(_))));
    }
}
