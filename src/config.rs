use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{Palette, Tile, DEFAULT_SIDE, MIN_RUN};
use crate::error::ConfigError;

/// Session configuration, loadable from TOML.
///
/// Fixed at session start. Every field is optional in the file; missing
/// fields take their default.
///
/// ```toml
/// side = 8
/// palette = ["Red", "Green", "Blue", "Yellow", "Purple", "Cyan"]
/// tick_interval_ms = 150
/// seed = 42
/// reroll_initial_matches = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid side length.
    pub side: usize,
    /// Token kinds new tiles are drawn from.
    pub palette: Vec<Tile>,
    /// Delay between two resolution ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Seed for the session rng; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Re-sample matched cells of a freshly generated board until it has no
    /// match, instead of letting the first ticks clear them.
    pub reroll_initial_matches: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            side: DEFAULT_SIDE,
            palette: Tile::COLORS.to_vec(),
            tick_interval_ms: 150,
            seed: None,
            reroll_initial_matches: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                "config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.side == 0 {
            return Err(ConfigError::Validation("side must be > 0".into()));
        }
        let palette = self.build_palette()?;
        // Every refill of a one-color board rebuilds a run, so it never settles.
        if palette.len() == 1 && self.side >= MIN_RUN {
            return Err(ConfigError::Validation(format!(
                "a {}x{} board needs at least two colors",
                self.side, self.side
            )));
        }
        Ok(())
    }

    /// The validated palette.
    pub fn build_palette(&self) -> Result<Palette, ConfigError> {
        Palette::new(self.palette.clone())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
