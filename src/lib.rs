//! # Jumpstitch
//!
//! Turns the jump stitches between selected embroidery elements into
//! running stitch paths.
//!
//! ## Architecture
//!
//! Jumpstitch is organized as a workspace with multiple crates:
//!
//! 1. **jumpstitch-core** - Geometry, unit conversion, error types
//! 2. **jumpstitch-settings** - Jump options and configuration files
//! 3. **jumpstitch-designer** - Document model, stitch planning, jump to stroke
//! 4. **jumpstitch** - Command-line binary that integrates all crates
//!
//! ## Features
//!
//! - **Length Gates**: Only jumps between a minimum and optional maximum length are converted
//! - **Grouping Rules**: Restrict connectors to a layer or group; respect trims, stops and lock stitches
//! - **Merging**: Extend neighbouring stroke paths instead of adding new elements
//! - **Export**: Write the result back as a design file and optionally as SVG

pub mod cli;

use std::path::Path;

use anyhow::Context;
use tracing::info;

pub use cli::Args;
pub use jumpstitch_core::{Error, Result};
pub use jumpstitch_designer as designer;
pub use jumpstitch_designer::{DesignFile, JumpReport, JumpToStroke, NodeId, SelectionManager};
pub use jumpstitch_settings::{Config, ConnectMode, JumpOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Pretty console output on stderr
/// - RUST_LOG environment variable support, falling back to `level`
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Load the configuration named by `args`, or the default one, with
/// command-line overrides applied.
pub fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => Config::load_or_default().context("Failed to load default config")?,
    };
    args.apply_overrides(&mut config.jump);
    config.validate().context("Invalid options")?;
    Ok(config)
}

/// Run jump to stroke on the design named by `args` and write the result.
///
/// Nothing is written when the run fails.
pub fn run(args: &Args) -> anyhow::Result<JumpReport> {
    let config = load_config(args)?;

    let mut design = DesignFile::load_from_file(&args.input)
        .with_context(|| format!("Failed to load design {}", args.input))?;

    let selection = if args.select.is_empty() {
        design.selection_manager()
    } else {
        SelectionManager::from_ids(args.select.iter().map(|&id| NodeId(id)))
    };

    let planner =
        designer::RunningStitchPlanner::new(&config.stitch_plan, config.jump.pixels_per_mm);
    let report = JumpToStroke::from_config(&config).run(&mut design.document, &selection, &planner)?;

    design.touch();
    let output = args.output.as_deref().unwrap_or(&args.input);
    design
        .save_to_file(output)
        .with_context(|| format!("Failed to write design {}", output))?;
    info!("Wrote {}", output);

    if let Some(svg) = &args.svg {
        std::fs::write(svg, designer::render_svg(&design.document))
            .with_context(|| format!("Failed to write SVG {}", svg))?;
        info!("Wrote {}", svg);
    }

    Ok(report)
}
