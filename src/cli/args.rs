//! Command line argument parsing
//!
//! With no subcommand tdl starts the interactive session. The only subcommand
//! is `show-config`, which prints the configuration discovery information.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Interactive(InteractiveConfig),
    ShowConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveConfig {
    pub config_override: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub verbose: bool,
    pub no_banner: bool,
}

#[derive(Debug, Parser)]
#[command(name = "tdl")]
#[command(author = "tdl contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An interactive task list that remembers your tasks between runs")]
#[command(long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Save file to read and write instead of the configured one
    #[arg(short = 'd', long = "data-file")]
    pub data_file: Option<PathBuf>,
    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Skip the greeting
    #[arg(long = "no-banner")]
    pub no_banner: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> ExecutionMode {
        match &self.command {
            Some(Commands::ShowConfig) => ExecutionMode::ShowConfig,
            None => ExecutionMode::Interactive(InteractiveConfig {
                config_override: self.config.clone(),
                data_file: self.data_file.clone(),
                verbose: self.verbose,
                no_banner: self.no_banner,
            }),
        }
    }
}
