use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "warren-server", about = "Runtime host: supervisor pool, router, storage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Boot the runtime and drive a stdin smoke-test harness.
    Run(RunArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Path to an optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interpreter command used to launch guest processes, overriding the config file.
    #[arg(long)]
    pub guest_command: Option<String>,
}
