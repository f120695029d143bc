mod channel;
mod config;
mod error;
mod wifi;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use log::{LevelFilter, info};

use crate::{
    channel::{Method, call_once, serve},
    config::ServiceConfig,
    wifi::{WifiScanService, platform_backend},
};

/// A permission-gated WiFi scan service exposed over a JSON-lines channel
#[derive(Parser, Debug)]
#[command(
    name = "wifiscan",
    about = "A permission-gated WiFi scan service exposed over a JSON-lines method channel.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Wait for the scan to finish instead of reading cached results
    #[arg(long, global = true)]
    fresh: bool,

    /// Seconds to wait for a fresh scan
    #[arg(long = "scan-timeout", value_name = "SECS", global = true, requires = "fresh")]
    scan_timeout: Option<u64>,

    /// Channel name to announce
    #[arg(long, value_name = "NAME", global = true)]
    channel: Option<String>,

    /// Debug logging for wifiscan
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Serve the channel on stdin/stdout (default)
    Serve,
    /// Scan once and print the visible networks
    Scan,
    /// Print whether the WiFi radio is enabled
    Enabled,
    /// Request scan permission, prompting if needed
    Permission {
        /// Wait for the prompt to be answered
        #[arg(long)]
        wait: bool,
    },
    /// Invoke a channel method by its wire name
    Call { method: String },
}

fn init_logging(verbose: bool) {
    let crate_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Logs go to stderr; stdout carries the channel
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("wifiscan", crate_level)
        .parse_default_env()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = ServiceConfig::default().with_channel_name(args.channel);
    if args.fresh {
        config = config.with_fresh_scans(args.scan_timeout);
    }

    let (radio, gate) = platform_backend();
    let service = WifiScanService::new(radio, gate, config);

    let (method, wait) = match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                "Serving `{}` on stdio ({:?})",
                service.config().channel_name,
                service.config().scan_mode
            );
            return serve(service, tokio::io::stdin(), tokio::io::stdout()).await;
        }
        Command::Scan => (Method::ScanWifi, false),
        Command::Enabled => (Method::IsWifiEnabled, false),
        Command::Permission { wait } => (Method::RequestWifiPermission, wait),
        Command::Call { method } => (Method::from_name(&method), false),
    };

    if !call_once(service, method, wait).await? {
        std::process::exit(1);
    }
    Ok(())
}
