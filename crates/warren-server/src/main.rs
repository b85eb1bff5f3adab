mod cli;
mod config;
mod error;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use warren_router::{AllowAll, Router};
use warren_store::MemoryStore;
use warren_supervisor::LaunchSpec;

use cli::{Cli, Command, RunArgs};
use config::Config;
use error::ServerError;

fn init_tracing() {
    // A server process defaults to `info`, not `error`: `warn` is reserved
    // for actual anomalies, and `RUST_LOG` still overrides this.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Run(args) => match run(args).await {
            Ok(()) => 0,
            Err(err) => {
                tracing::error!("{err}");
                1
            }
        },
    };

    std::process::exit(exit_code);
}

async fn run(args: RunArgs) -> Result<(), ServerError> {
    let config = Config::load(args.config.as_deref())?;
    let guest_command = args.guest_command.unwrap_or(config.guest_command);

    let store = Arc::new(MemoryStore::new());
    let launch = LaunchSpec::new(guest_command);
    let router = Router::new(store, launch, config.restart_cooldown(), Arc::new(AllowAll));
    router.ensure_void().await?;

    tracing::info!("runtime ready, void resource constructed");
    repl::run(router).await?;
    Ok(())
}
