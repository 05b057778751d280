use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use turtlebot::execution::{MarketScenario, PaperOrderSink, SyntheticFeed};
use turtlebot::persistence::StateStore;
use turtlebot::{Result, TurtleConfig, TurtleRunner, TurtleStrategy};

/// Turtle trading on one futures contract (paper trading setup)
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (TOML/YAML/JSON); defaults to ./turtle.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Contract to trade
    #[arg(long)]
    symbol: Option<String>,

    /// Where the position and last entry price are persisted
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Seed for the synthetic feed
    #[arg(long)]
    seed: Option<u64>,

    /// Live days to simulate
    #[arg(long)]
    days: Option<usize>,

    /// Market regime for the synthetic feed
    #[arg(long, value_enum)]
    scenario: Option<MarketScenario>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!("🐢 Turtle strategy starting on {}", config.symbol);
    tracing::info!(
        "  Channels: entry {}d / exit {}d, N over {}d ({:?})",
        config.strategy.entry_channel_days,
        config.strategy.exit_channel_days,
        config.strategy.atr_days,
        config.strategy.atr_smoothing
    );
    tracing::info!(
        "  Max risk ratio: {:.0}%",
        config.strategy.risk.max_risk_ratio * 100.0
    );

    let store = StateStore::new(&config.state_file);
    let state = store.load()?;
    tracing::info!(
        "Current position: {}, last entry price: {:?}",
        state.position,
        state.last_price
    );

    let strategy = TurtleStrategy::new(&config.symbol, config.strategy.clone(), state);
    let feed = SyntheticFeed::new(&config.symbol, config.paper.clone());

    let mut runner = TurtleRunner::new(
        feed,
        PaperOrderSink::with_position(state.position),
        strategy,
        store,
        config.startup_deadline(),
    );

    let outcome = runner.run(shutdown_signal()).await;
    log_paper_summary(runner.sink());

    match outcome {
        Ok(reason) => {
            tracing::info!("👋 Turtle strategy stopped ({:?})", reason);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Turtle strategy aborted: {}", e);
            Err(e)
        }
    }
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("turtlebot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<TurtleConfig> {
    let mut config = TurtleConfig::load(cli.config.as_deref())?;

    if let Some(symbol) = &cli.symbol {
        config.symbol = symbol.clone();
    }
    if let Some(state_file) = &cli.state_file {
        config.state_file = state_file.clone();
    }
    if let Some(seed) = cli.seed {
        config.paper.seed = seed;
    }
    if let Some(days) = cli.days {
        config.paper.days = days;
    }
    if let Some(scenario) = cli.scenario {
        config.paper.scenario = scenario;
    }

    Ok(config)
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl+C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

fn log_paper_summary(sink: &PaperOrderSink) {
    let orders = sink.instructions();

    tracing::info!("\n📊 Paper Trading Summary:");
    tracing::info!("  Instructions issued: {}", orders.len());
    tracing::info!("  Final net position: {}", sink.net_position());

    for order in orders {
        tracing::info!(
            "    {} | {:?} | target {} @ {:.2}",
            order.issued_at.format("%H:%M:%S"),
            order.reason,
            order.target_position,
            order.reference_price
        );
    }
}
