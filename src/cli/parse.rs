//! CLI parse: clap types for Reelsmith. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reelsmith CLI - product media studio
#[derive(Parser)]
#[command(name = "reelsmith")]
#[command(about = "Engineer studio-grade image and video prompts for a product and render them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Never prompt; missing credentials and confirmations fail instead
    #[arg(long, default_value = "false")]
    pub non_interactive: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Engineer the image and video prompts for a product
    Prompts {
        /// Product name
        #[arg(long)]
        name: String,
        /// Product description or context
        #[arg(long)]
        description: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the full cycle: prompts, then image and video rendering
    Render {
        /// Product name
        #[arg(long)]
        name: String,
        /// Product description or context
        #[arg(long)]
        description: String,
        /// Skip the confirmation before rendering
        #[arg(long)]
        yes: bool,
        /// Directory for the rendered assets (defaults to output.dir)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Select the API key for this session, replacing any key found in the environment
    Key,
    /// Print the effective configuration
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

impl Commands {
    /// Stable command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Prompts { .. } => "prompts",
            Commands::Render { .. } => "render",
            Commands::Key => "key",
            Commands::Config { .. } => "config",
        }
    }
}
