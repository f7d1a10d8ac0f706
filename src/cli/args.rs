//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::Env;

/// Incremental asset bundler
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: bundle.toml)
    #[arg(short = 'C', long, global = true, default_value = "bundle.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source root (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Emit mode override
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Env>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build bundles whose entries changed
    #[command(visible_alias = "b")]
    Build {
        /// Bundles to build. If omitted, builds every bundle.
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },

    /// Print the references a page should include for a bundle
    #[command(visible_alias = "e")]
    Emit {
        /// Bundle name
        name: String,
    },

    /// List bundles with their format and entries
    #[command(visible_alias = "l")]
    List,

    /// Serve the source root, building bundles on request
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}
