//! Settings for the mapping engine and the command line tool
//!
//! Stored as TOML under the user's config directory. A missing file is not an error:
//! every field has a default, and the engine defaults are the fixed thresholds the
//! mapping descriptions are authored against.

use crate::controller::state::{AXIS_TOUCH_THRESHOLD, BUTTON_TOUCH_THRESHOLD};
use crate::controller::visual::VISIBILITY_THRESHOLD;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "motion-controllers";
const CONFIG_FILE: &str = "config.toml";

/// Thresholds used by the state machine and the visual response engine
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub button_touch_threshold: f32,
    pub axis_touch_threshold: f32,
    pub visibility_threshold: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            button_touch_threshold: BUTTON_TOUCH_THRESHOLD,
            axis_touch_threshold: AXIS_TOUCH_THRESHOLD,
            visibility_threshold: VISIBILITY_THRESHOLD,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    /// Directory with one `<identifier>.json` mapping description per device
    pub mappings_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            mappings_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read settings file {}: {}", path.display(), e))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse settings file {}: {}", path.display(), e))?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Loads the user settings file, or defaults if there is none
    pub fn load_or_default() -> Result<Self> {
        let Some(path) = Self::default_path() else {
            warn!("Could not determine config directory, using default settings");
            return Ok(Self::default());
        };

        if path.exists() {
            Self::load(&path)
        } else {
            info!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| eyre!("Failed to serialize settings: {}", e))
    }
}
