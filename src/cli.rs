//! Command-line argument definitions.
//!
//! Every jump option can be given on the command line; flags override the
//! values loaded from the configuration file.

use clap::Parser;
use jumpstitch_settings::{ConnectMode, JumpOptions};

/// Replace jump stitches between selected elements with running stitch paths
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input design file (JSON)
    pub input: String,

    /// Where to write the modified design; defaults to overwriting the input
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also export the modified design as SVG
    #[arg(long, value_name = "FILE")]
    pub svg: Option<String>,

    /// Node ids to process, in order; defaults to the selection stored in the file
    #[arg(short = 's', long = "select", value_name = "ID")]
    pub select: Vec<u64>,

    /// Path to configuration file (JSON or TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Minimum jump length (mm)
    #[arg(long, value_name = "MM")]
    pub min_jump: Option<f64>,

    /// Maximum jump length (mm), 0 or less for no limit
    #[arg(long, value_name = "MM", allow_negative_numbers = true)]
    pub max_jump: Option<f64>,

    /// Which elements may be connected: all, layer or group
    #[arg(long)]
    pub connect: Option<ConnectMode>,

    /// Keep jumps after elements that trim
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exclude_trim: Option<bool>,

    /// Keep jumps after elements that stop
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exclude_stop: Option<bool>,

    /// Keep jumps after elements with forced lock stitches
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exclude_force_lock_stitch: Option<bool>,

    /// Merge connectors into neighbouring stroke paths
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub merge: Option<bool>,

    /// Running stitch length for inserted connectors (mm)
    #[arg(long, value_name = "MM")]
    pub stitch_length: Option<f64>,

    /// Running stitch tolerance for inserted connectors (mm)
    #[arg(long, value_name = "MM")]
    pub tolerance: Option<f64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Write every option given on the command line into `options`.
    pub fn apply_overrides(&self, options: &mut JumpOptions) {
        if let Some(v) = self.min_jump {
            options.min_jump_length_mm = v;
        }
        if let Some(v) = self.max_jump {
            options.max_jump_length_mm = v;
        }
        if let Some(v) = self.connect {
            options.connect = v;
        }
        if let Some(v) = self.exclude_trim {
            options.exclude_trim = v;
        }
        if let Some(v) = self.exclude_stop {
            options.exclude_stop = v;
        }
        if let Some(v) = self.exclude_force_lock_stitch {
            options.exclude_forced_lock = v;
        }
        if let Some(v) = self.merge {
            options.merge = v;
        }
        if let Some(v) = self.stitch_length {
            options.running_stitch_length_mm = v;
        }
        if let Some(v) = self.tolerance {
            options.running_stitch_tolerance_mm = v;
        }
    }
}
