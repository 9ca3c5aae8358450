// Mock Broker CLI
// Single entry point for streaming the simulated feed and exercising the order API

use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{error, info, warn, Level};
use mock_broker::{BrokerConfig, BrokerError, ConfigError};

// Load command modules from cli directory
#[path = "../cli/feed_commands.rs"]
mod feed_commands;
#[path = "../cli/order_commands.rs"]
mod order_commands;

#[derive(Parser)]
#[command(name = "broker-sim")]
#[command(version = "0.1.0")]
#[command(about = "Simulated option-chain brokerage feed", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "broker.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print one synthesized option chain
    Chain {
        /// Underlying price
        #[arg(short, long, default_value = "100")]
        price: f64,

        /// Chain timestamp in epoch milliseconds (defaults to now)
        #[arg(long)]
        now_ms: Option<i64>,

        /// Include quotes below the probability/size filters
        #[arg(short, long)]
        all: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Stream ticks from the running feed
    Run {
        /// Number of ticks to receive before stopping
        #[arg(short, long, default_value = "20")]
        ticks: u64,

        /// Emit one JSON tick per line
        #[arg(long)]
        json: bool,
    },

    /// Place orders against the latest chain, then cancel the fills
    Trade {
        /// Number of strikes to bid on
        #[arg(short, long, default_value = "5")]
        orders: usize,

        /// Premium below the quoted bid for each limit price
        #[arg(long, default_value = "0")]
        offset: f64,

        /// Contracts per order
        #[arg(short, long, default_value = "1")]
        qty: u32,

        /// Leave filled orders resting instead of cancelling them
        #[arg(short, long)]
        keep_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Read config before logging so its level applies; report failures after setup
    let loaded = load_config(&cli.config);
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        loaded
            .as_ref()
            .ok()
            .and_then(|c| c.logging.level.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚀 Mock Broker v0.1.0");

    let result = match cli.command {
        // Init doesn't require a valid config (it creates it)
        Commands::Init { force } => init_config(&cli.config, force),

        Commands::Chain { price, now_ms, all, json } => {
            let config = config_or_exit(loaded);
            feed_commands::show_chain(price, now_ms, all, json, &config)
        }

        Commands::Run { ticks, json } => {
            let config = config_or_exit(loaded);
            feed_commands::run_feed(ticks, json, config).await
        }

        Commands::Trade { orders, offset, qty, keep_open } => {
            let config = config_or_exit(loaded);
            order_commands::run_trade(orders, offset, qty, keep_open, config).await
        }
    };

    if let Err(e) = result {
        error!("❌ {} error", e.category());
        error!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Defaults when the file is absent; errors only for unreadable or invalid files
fn load_config(path: &str) -> Result<BrokerConfig, ConfigError> {
    if Path::new(path).exists() {
        BrokerConfig::from_file(path)
    } else {
        Ok(BrokerConfig::default())
    }
}

fn config_or_exit(loaded: Result<BrokerConfig, ConfigError>) -> BrokerConfig {
    match loaded {
        Ok(config) => config,
        Err(e) => {
            let e = BrokerError::from(e);
            error!("❌ Configuration Error");
            error!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

fn init_config(path: &str, force: bool) -> Result<(), BrokerError> {
    if Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    BrokerConfig::default().to_file(path)?;
    info!("📝 Created {}", path);
    info!("💡 Next steps:");
    info!("   1. Run: broker-sim chain --price 100");
    info!("   2. Run: broker-sim run --ticks 20");
    info!("   3. Run: broker-sim trade --orders 5");
    Ok(())
}
