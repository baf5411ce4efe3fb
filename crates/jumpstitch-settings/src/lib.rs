//! Jumpstitch Settings Crate
//!
//! Handles the jump conversion options, stitch planner defaults and their
//! persistence as JSON or TOML files.

pub mod config;
pub mod error;

pub use config::{Config, ConnectMode, JumpOptions, StitchPlanSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
