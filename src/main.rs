//! # Client Updater Entry Point
//!
//! `client-updater start <path>` resolves the path, verifies keys, starts the
//! relay strategy and then keeps both clients of the path fresh until
//! SIGINT/SIGTERM.

use clap::{Args, Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use updater::config::CONFIG_ENV;
use updater::shutdown::wait_for_signal;
use updater::{
    run_until_signal, CommandProvider, Config, ConfigError, NaiveStrategy, RefreshScheduler,
    RefreshService, RelayStrategy, SchedulerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "client-updater", version, about = "Keep relayer light clients from expiring")]
struct Cli {
    /// Path to the relayer config file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the listening relayer on a given path
    #[command(alias = "st")]
    Start(StartArgs),
}

#[derive(Args, Debug)]
struct StartArgs {
    /// Name of the configured path
    path: String,

    /// Maximum number of messages per relay transaction
    #[arg(long)]
    max_msgs: Option<u64>,

    /// Maximum relay transaction size, in kilobytes
    #[arg(long)]
    max_tx_size: Option<u64>,

    /// How long before a client expires it gets updated
    #[arg(long, value_parser = humantime::parse_duration, default_value = "6h")]
    time_threshold: Duration,
}

fn setup_logging() {
    let mut log_builder = pretty_env_logger::formatted_timed_builder();
    if let Ok(s) = ::std::env::var("RUST_LOG") {
        log_builder.parse_filters(&s);
    } else {
        // default to 'Info'
        log_builder.filter(None, log::LevelFilter::Info);
    }

    log_builder
        .filter_module("tokio", log::LevelFilter::Warn)
        .filter_module("mio", log::LevelFilter::Warn)
        .init();
}

async fn start(config_path: PathBuf, args: StartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&config_path)?;
    let (src, dst) = config.chains_from_path(&args.path)?;
    config.ensure_keys_exist(&[&src, &dst])?;

    let path = config.path(&args.path)?;
    let options = path
        .strategy
        .with_overrides(args.max_msgs, args.max_tx_size)?;

    let provider = CommandProvider::new(&config.hooks.update_client)
        .ok_or(ConfigError::MissingHook("update_client"))?;
    if config.hooks.relay.is_empty() {
        return Err(ConfigError::MissingHook("relay").into());
    }
    let strategy = NaiveStrategy::new(config.hooks.relay.clone(), options)?;

    let stop = strategy.start(&src, &dst)?;

    let scheduler = Arc::new(RefreshScheduler::new(
        RefreshService::new(provider, src, dst),
        SchedulerConfig {
            threshold: args.time_threshold,
            ..SchedulerConfig::default()
        },
    ));
    run_until_signal(scheduler, stop, wait_for_signal()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    let res = match cli.command {
        Command::Start(args) => start(config_path, args).await,
    };
    if let Err(e) = &res {
        error!("{}", e);
    }
    res
}
