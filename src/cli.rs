//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio feed and sitemap publisher CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to root (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by every subcommand that reads content
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Render everything, ignoring and not updating the artifact cache
    #[arg(long)]
    pub no_cache: bool,

    /// Number of render workers (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load content and write every configured feed and sitemap
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Load and validate config and content without writing anything
    Check {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

impl Commands {
    pub const fn build_args(&self) -> &BuildArgs {
        match self {
            Self::Build { build_args } | Self::Check { build_args } => build_args,
        }
    }
}

impl Cli {
    /// Root directory with `~` expanded.
    pub fn root_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => {
                let root = root.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&root).as_ref())
            }
            None => PathBuf::from("./"),
        }
    }
}
