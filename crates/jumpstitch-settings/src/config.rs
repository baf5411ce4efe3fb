//! Configuration for jump-to-stroke conversion
//!
//! Provides the option object consumed by the classifier and the connector
//! synthesizer, plus file handling for persisting it. Supports JSON and TOML
//! files stored in the platform configuration directory.
//!
//! Configuration is organized into two sections:
//! - Jump options (length gates, grouping rules, merge policy, connector stitch params)
//! - Stitch plan defaults (running stitch length, curve flattening tolerance)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jumpstitch_core::units::{mm_to_px, PIXELS_PER_MM};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Which container boundaries a connector may cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectMode {
    /// Connect across groups and layers
    #[default]
    All,
    /// Only connect elements sharing the nearest layer
    Layer,
    /// Only connect elements sharing the nearest group
    Group,
}

impl fmt::Display for ConnectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Layer => write!(f, "layer"),
            Self::Group => write!(f, "group"),
        }
    }
}

impl FromStr for ConnectMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "layer" => Ok(Self::Layer),
            "group" => Ok(Self::Group),
            other => Err(ConfigError::ValueOutOfRange {
                key: "connect".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Options controlling which jumps become running stitches and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpOptions {
    /// Jumps shorter than this (mm) are left alone
    pub min_jump_length_mm: f64,
    /// Jumps longer than this (mm) are left alone; 0 disables the bound
    pub max_jump_length_mm: f64,
    /// Container boundaries a connector may cross
    pub connect: ConnectMode,
    /// Never connect after an element that trims
    pub exclude_trim: bool,
    /// Never connect after an element that stops
    pub exclude_stop: bool,
    /// Never connect after an element that forces lock stitches
    pub exclude_forced_lock: bool,
    /// Merge the connector into neighbouring stroke paths
    pub merge: bool,
    /// Running stitch length stamped on inserted connectors (mm)
    pub running_stitch_length_mm: f64,
    /// Running stitch tolerance stamped on inserted connectors (mm)
    pub running_stitch_tolerance_mm: f64,
    /// Drawing units per millimeter
    pub pixels_per_mm: f64,
}

impl Default for JumpOptions {
    fn default() -> Self {
        Self {
            min_jump_length_mm: 3.0,
            max_jump_length_mm: 0.0,
            connect: ConnectMode::All,
            exclude_trim: true,
            exclude_stop: true,
            exclude_forced_lock: true,
            merge: false,
            running_stitch_length_mm: 2.5,
            running_stitch_tolerance_mm: 2.0,
            pixels_per_mm: PIXELS_PER_MM,
        }
    }
}

impl JumpOptions {
    /// Minimum jump length in drawing units
    pub fn min_jump_length_px(&self) -> f64 {
        mm_to_px(self.min_jump_length_mm, self.pixels_per_mm)
    }

    /// Maximum jump length in drawing units, `None` when unbounded
    pub fn max_jump_length_px(&self) -> Option<f64> {
        (self.max_jump_length_mm > 0.0)
            .then(|| mm_to_px(self.max_jump_length_mm, self.pixels_per_mm))
    }

    /// Validate option ranges
    pub fn validate(&self) -> SettingsResult<()> {
        let invalid = |key: &str, reason: &str| {
            Err(SettingsError::InvalidSetting {
                key: key.to_string(),
                reason: reason.to_string(),
            })
        };

        if !(self.min_jump_length_mm >= 0.0) {
            return invalid("min_jump_length_mm", "must not be negative");
        }
        if self.max_jump_length_mm.is_nan() {
            return invalid("max_jump_length_mm", "must be a number");
        }
        if !(self.running_stitch_length_mm > 0.0) {
            return invalid("running_stitch_length_mm", "must be > 0");
        }
        if !(self.running_stitch_tolerance_mm > 0.0) {
            return invalid("running_stitch_tolerance_mm", "must be > 0");
        }
        if !(self.pixels_per_mm > 0.0) {
            return invalid("pixels_per_mm", "must be > 0");
        }
        Ok(())
    }
}

/// Defaults used by the built-in running stitch planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchPlanSettings {
    /// Running stitch length for elements without their own value (mm)
    pub running_stitch_length_mm: f64,
    /// Curve flattening tolerance (drawing units)
    pub flatten_tolerance: f64,
}

impl Default for StitchPlanSettings {
    fn default() -> Self {
        Self {
            running_stitch_length_mm: 2.5,
            flatten_tolerance: 0.1,
        }
    }
}

/// Complete configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Jump conversion options
    pub jump: JumpOptions,
    /// Stitch planner defaults
    pub stitch_plan: StitchPlanSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/jumpstitch/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("jumpstitch").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from the default location, or defaults when no file exists
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Self::format_of(path)? {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.jump.validate()?;

        if !(self.stitch_plan.running_stitch_length_mm > 0.0) {
            return Err(SettingsError::InvalidSetting {
                key: "stitch_plan.running_stitch_length_mm".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if !(self.stitch_plan.flatten_tolerance > 0.0) {
            return Err(SettingsError::InvalidSetting {
                key: "stitch_plan.flatten_tolerance".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    fn format_of(path: &Path) -> SettingsResult<FileFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

enum FileFormat {
    Json,
    Toml,
}
