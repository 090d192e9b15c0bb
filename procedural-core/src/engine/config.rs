use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHECKSUM_INTERVAL, MIN_STEP_BUDGET_FACTOR};

/// Smallest accepted grid edge, in tiles
pub const MIN_GRID_EDGE: usize = 8;

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Per-run simulation configuration. Built once, passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub root_seed: u64,
    pub grid_width: usize,
    pub grid_height: usize,
    pub floor_fraction: f32,
    /// Carving step budget as a multiple of grid area
    pub step_budget_factor: u32,
    /// Ticks between checksum records; 0 disables them
    pub checksum_interval: u64,
    /// Move to the next level on the tick after a level is cleared
    pub auto_advance: bool,
    pub max_adversaries: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            root_seed: 42,
            grid_width: 80,
            grid_height: 60,
            floor_fraction: 0.45,
            step_budget_factor: MIN_STEP_BUDGET_FACTOR,
            checksum_interval: DEFAULT_CHECKSUM_INTERVAL,
            auto_advance: false,
            max_adversaries: 32,
        }
    }
}

impl SimConfig {
    pub fn with_seed(root_seed: u64) -> Self {
        Self {
            root_seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < MIN_GRID_EDGE || self.grid_height < MIN_GRID_EDGE {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least {MIN_GRID_EDGE}x{MIN_GRID_EDGE}, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if !(self.floor_fraction > 0.0 && self.floor_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "floor_fraction must be in (0, 1), got {}",
                self.floor_fraction
            )));
        }
        if self.step_budget_factor < MIN_STEP_BUDGET_FACTOR {
            return Err(ConfigError::Invalid(format!(
                "step_budget_factor must be at least {MIN_STEP_BUDGET_FACTOR}, got {}",
                self.step_budget_factor
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` or `.ron` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("ron") => Self::from_ron_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
