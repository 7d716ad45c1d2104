// Configuration - JSON file under the user config dir, every field defaulted

use crate::gesture::{DEFAULT_DEBOUNCE_MS, DEFAULT_GESTURE_PIN, DEFAULT_WINDOW_MS};
use crate::voice_commands::actions::ir_light::{IrRemote, DEFAULT_IRSEND_PATH, DEFAULT_IR_REMOTE};
use crate::voice_commands::actions::music::{DEFAULT_MPD_HOST, DEFAULT_MPD_PORT};
use crate::voice_commands::actions::volume::{DEFAULT_MIXER_CONTROL, DEFAULT_VOLUME_STEP};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "heypi";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error types for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Text-to-speech command; None logs instead of speaking
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Program and leading args, e.g. ["espeak", "-v", "en"]
    pub command: Option<Vec<String>>,
}

/// Physical button settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub enabled: bool,
    /// BCM pin number
    pub pin: u8,
    pub window_ms: u64,
    pub debounce_ms: u64,
    /// Keywords for 1, 2, 3... presses
    pub actions: Vec<String>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pin: DEFAULT_GESTURE_PIN,
            window_ms: DEFAULT_WINDOW_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            actions: vec![
                "turn on the light".to_string(),
                "turn off the light".to_string(),
                "shuffle light".to_string(),
            ],
        }
    }
}

impl GestureConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// ALSA simple control name
    pub control: String,
    pub step: i32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            control: DEFAULT_MIXER_CONTROL.to_string(),
            step: DEFAULT_VOLUME_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub host: String,
    pub port: u16,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPD_HOST.to_string(),
            port: DEFAULT_MPD_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrConfig {
    pub irsend_path: String,
    pub remote: String,
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            irsend_path: DEFAULT_IRSEND_PATH.to_string(),
            remote: DEFAULT_IR_REMOTE.to_string(),
        }
    }
}

impl From<&IrConfig> for IrRemote {
    fn from(config: &IrConfig) -> Self {
        IrRemote {
            irsend_path: config.irsend_path.clone(),
            remote: config.remote.clone(),
        }
    }
}

/// A keyword that switches a Hue bulb to a colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueBinding {
    pub keyword: String,
    pub bulb: String,
    /// `#rrggbb`
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HueConfig {
    /// Bridge command template with {bulb}, {x}, {y}; empty means no bridge
    pub command: Vec<String>,
    pub bindings: Vec<HueBinding>,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub speaker: SpeakerConfig,
    pub gesture: GestureConfig,
    pub volume: VolumeConfig,
    pub music: MusicConfig,
    pub ir: IrConfig,
    pub hue: HueConfig,
}

/// Get the default config file path
/// Returns {config_dir}/heypi/config.json
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::Invalid("Could not determine config directory".to_string())
    })?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        crate::debug!("Loading config from {:?}", path);

        if !path.exists() {
            crate::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        crate::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gesture.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "gesture.window_ms must be greater than zero".to_string(),
            ));
        }
        if self.gesture.enabled && self.gesture.actions.is_empty() {
            return Err(ConfigError::Invalid(
                "gesture.actions must name at least one keyword".to_string(),
            ));
        }
        if self.volume.step <= 0 || self.volume.step > 100 {
            return Err(ConfigError::Invalid(format!(
                "volume.step must be within 1..=100, got {}",
                self.volume.step
            )));
        }
        if matches!(&self.speaker.command, Some(command) if command.is_empty()) {
            return Err(ConfigError::Invalid(
                "speaker.command must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
