//! Bundleforge - An incremental asset bundler for CSS, HTML and JavaScript.

mod builder;
mod bundle;
mod cli;
mod config;
mod core;
mod fetch;
mod logger;
mod persist;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{BundleConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(BundleConfig::load(&cli)?);

    match &cli.command {
        Commands::Build { names } => cli::build::build_bundles(&config, names),
        Commands::Emit { name } => cli::emit::emit_bundle(&config, name),
        Commands::List => cli::emit::list_bundles(&config),
        Commands::Serve { .. } => cli::serve::serve(&config),
    }
}
