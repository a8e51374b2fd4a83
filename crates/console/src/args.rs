use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Review and sign off collection changes from the browser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Console directory (defaults to ~/.signoff)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the console directory with a default config
    Init(InitArgs),
    /// Serve the HTML console
    Serve(ServeArgs),
    /// Print build information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct InitArgs {
    /// Port the console will listen on
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Snapshot file to serve, overrides the console directory's
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Hide every workflow action
    #[arg(long)]
    pub read_only: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
