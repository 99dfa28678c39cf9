//! # Lunar Engine
//!
//! Headless runner for Project Lunar.
//!
//! Loads `lunar.toml` (or the path given as the first argument), builds the
//! demo level and drives the player controller through a scripted run on a
//! fixed timestep.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod demo;
mod timing;


use std::env;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("lunar=info".parse()?))
        .init();

    info!("Project Lunar starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = env::args()
        .nth(1)
        .map_or_else(EngineConfig::config_path, PathBuf::from);
    let mut config = EngineConfig::load_from(&path);
    config.validate();

    let summary = demo::run(&config)?;
    info!("Demo finished: {}", summary);

    info!("Project Lunar shutdown complete");
    Ok(())
}
