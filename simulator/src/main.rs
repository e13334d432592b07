//! SwapDesk Simulator
//!
//! Loads a price list and drives a scripted session through a swap desk.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use swapdesk_fx::{JsonPriceSource, PriceSource};
use swapdesk_session::{SessionConfig, SwapDesk};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::Scenario;

const BUNDLED_PRICES: &str = include_str!("../data/prices.json");

/// SwapDesk Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "SwapDesk scripted swap simulation environment")]
struct Args {
    /// Price list to load (JSON array of {currency, date, price})
    #[arg(short, long)]
    prices: Option<PathBuf>,

    /// Built-in scenario name or path to a scenario file
    #[arg(short, long, default_value = "quote-and-submit")]
    scenario: String,

    /// Random seed for reproducible swap outcomes
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a simulated swap succeeds
    #[arg(long)]
    success_rate: Option<f64>,

    /// Emit logs and the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    ));
    if args.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting SwapDesk Simulator");

    // Load configuration
    let mut config = SessionConfig::from_env();
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(rate) = args.success_rate {
        config.execution.success_rate = rate;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let source: Arc<dyn PriceSource> = match &args.prices {
        Some(path) => Arc::new(JsonPriceSource::from_path(path)),
        None => Arc::new(JsonPriceSource::from_json("bundled", BUNDLED_PRICES)),
    };
    let scenario = Scenario::load(&args.scenario)?;

    let desk = SwapDesk::simulated(config, source)?;
    let report = desk.load_prices().await?;
    info!(
        quotes = desk.catalog().len(),
        invalid = report.invalid,
        duplicates = report.duplicates,
        "Prices loaded"
    );

    let mut controller = SimulationController::new(desk, &scenario.name);
    controller.set_ingest(report);
    controller.run_scenario(&scenario).await?;

    let metrics = controller.finish();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        info!("Simulation complete");
        info!("Steps: {}", metrics.steps);
        info!(
            "Keystrokes: {} ({:.0}% accepted)",
            metrics.keystrokes,
            metrics.keystroke_acceptance() * 100.0
        );
        info!("Conversions: {}", metrics.desk.conversions);
        info!("Swaps succeeded: {}", metrics.swaps_succeeded);
        info!("Swaps failed: {}", metrics.swaps_failed);
        if let Some(snapshot) = &metrics.final_snapshot {
            info!(
                sell = ?snapshot.intent.sell_symbol,
                buy = ?snapshot.intent.buy_symbol,
                sell_amount = %snapshot.intent.sell_amount,
                buy_amount = %snapshot.intent.buy_amount,
                state = %snapshot.state,
                "Final form"
            );
        }
    }

    if !metrics.passed() {
        for failure in &metrics.assertion_failures {
            warn!(failure = %failure, "Assertion failed");
        }
        return Err(anyhow::anyhow!(
            "{} assertion(s) failed",
            metrics.assertion_failures.len()
        ));
    }

    Ok(())
}
