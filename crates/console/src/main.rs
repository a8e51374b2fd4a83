//! Signoff console - review and sign off collection changes from the browser

mod args;
mod process;
mod state;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use args::{Args, Command, InitArgs, ServeArgs};
use service::ServiceConfig;
use state::{ConsoleConfig, ConsoleState};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let result = match args.command {
        Command::Init(init) => run_init(args.config_dir, init),
        Command::Serve(serve) => run_serve(args.config_dir, serve).await,
        Command::Version => {
            match serde_json::to_string_pretty(&common::prelude::build_info()) {
                Ok(info) => println!("{}", info),
                Err(e) => eprintln!("Error: {}", e),
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_init(config_dir: Option<std::path::PathBuf>, init: InitArgs) -> Result<()> {
    let mut config = ConsoleConfig::default();
    if let Some(port) = init.port {
        config.listen_port = port;
    }
    let state = ConsoleState::init(config_dir, Some(config))?;
    println!("Initialized console directory at {}", state.console_dir.display());
    println!("Drop snapshots into {}", state.snapshot_path.display());
    Ok(())
}

async fn run_serve(config_dir: Option<std::path::PathBuf>, serve: ServeArgs) -> Result<()> {
    let state = ConsoleState::load(config_dir)?;
    let log_level: tracing::Level = serve.log_level.parse().unwrap_or(tracing::Level::INFO);

    let log_dir = state.config.log_to_file.then_some(state.logs_path.as_path());
    let _guards = process::init_tracing(log_level, log_dir);

    let service_config = service_config(&state, &serve, log_level);
    tracing::info!(
        config = %state.config_path.display(),
        read_only = service_config.read_only,
        "loaded console configuration"
    );

    process::spawn_service(&service_config).await;
    Ok(())
}

/// Merge the config file with command line overrides.
fn service_config(state: &ConsoleState, serve: &ServeArgs, log_level: tracing::Level) -> ServiceConfig {
    let port = serve.port.unwrap_or(state.config.listen_port);
    let snapshot_path = serve
        .snapshot
        .clone()
        .or_else(|| Some(state.snapshot_path.clone()).filter(|path| path.exists()));

    ServiceConfig {
        listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port),
        snapshot_path,
        max_queue_size: Some(state.config.max_queue_size),
        effect_delay: Duration::from_millis(state.config.effect_delay_ms),
        log_level,
        read_only: serve.read_only || state.config.read_only,
    }
}
