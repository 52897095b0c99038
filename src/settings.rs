//! Persisted harness settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Returns the path to the settings file: `~/.config/wasm-audio/settings.json`
fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("wasm-audio");
    path.push("settings.json");
    path
}

/// Harness configuration.
///
/// Serialized as JSON to the platform config directory. Fields use
/// `#[serde(default)]` so that adding new settings won't break existing
/// config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Frames per processing block when chunking decoded audio.
    pub frame_count: usize,

    /// Channels the processor fills for playback.
    pub output_channels: usize,

    /// Gain applied to captured input before processing.
    pub gain: f32,

    /// Restart file playback at end of file.
    pub loop_playback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_count: 1024,
            output_channels: 2,
            gain: 1.0,
            loop_playback: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk as pretty JSON.
    pub fn save(&self) {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write settings: {}", e);
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_survive_partial_config() {
        // An old config missing newer fields still parses
        let settings: Settings = serde_json::from_str(r#"{"gain": 2.0}"#).unwrap();
        assert_eq!(settings.gain, 2.0);
        assert_eq!(settings.frame_count, Settings::default().frame_count);
        assert_eq!(settings.output_channels, 2);
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings {
            frame_count: 512,
            output_channels: 1,
            gain: 0.5,
            loop_playback: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frame_count, 512);
        assert_eq!(back.output_channels, 1);
        assert!(back.loop_playback);
    }
}
