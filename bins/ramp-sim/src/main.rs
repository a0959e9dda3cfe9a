//! ramp-sim — Command-line simulator for Ramp bonding-curve markets.
//!
//! Replays JSON scenario scripts against a fresh in-memory market, prices
//! hypothetical buys and sales, and prints the effective configuration.
//! Reports go to stdout as JSON; logs go to stderr.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use ramp_core::traits::CurvePricer;
use ramp_core::types::{Amount, CurveParams, Quantity};
use ramp_curve::LinearCurve;
use ramp_market::{Scenario, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "ramp-sim")]
#[command(version, about = "Linear bonding-curve market simulator")]
struct Cli {
    /// Config file (defaults to <config dir>/ramp/ramp.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json"); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scenario script and print the report.
    Run(RunArgs),
    /// Price a buy or sale at a given supply.
    Quote(QuoteArgs),
    /// Largest quantity a budget buys at a given supply.
    Afford(AffordArgs),
    /// Print the effective configuration.
    Config,
}

/// Curve overrides shared by every market-facing subcommand.
#[derive(Args, Debug, Default)]
struct CurveArgs {
    /// Price units added per unit of supply
    #[arg(long)]
    slope: Option<u64>,

    /// Price of the first unit
    #[arg(long)]
    base_price: Option<u64>,

    /// Seconds a buyer must wait before selling
    #[arg(long)]
    cooldown: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to a JSON scenario script
    script: PathBuf,

    /// Stop at the first failed step and exit non-zero
    #[arg(long)]
    stop_on_error: bool,

    #[command(flatten)]
    curve: CurveArgs,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Outstanding supply before the move
    #[arg(long)]
    supply: Quantity,

    /// Units to buy or sell
    #[arg(long)]
    quantity: Quantity,

    /// Price a sale instead of a buy
    #[arg(long)]
    sell: bool,

    #[command(flatten)]
    curve: CurveArgs,
}

#[derive(Args, Debug)]
struct AffordArgs {
    /// Outstanding supply before the buy
    #[arg(long)]
    supply: Quantity,

    /// Currency available
    #[arg(long)]
    budget: Amount,

    #[command(flatten)]
    curve: CurveArgs,
}

#[derive(Serialize)]
struct Affordability {
    supply: Quantity,
    budget: Amount,
    quantity: Quantity,
    cost: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SimConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate().context("Invalid configuration")?;

    init_logging(&config.log_level, &config.log_format);

    match cli.command {
        Commands::Run(args) => {
            let params = curve_params(&config, &args.curve);
            run_scenario(&args, params)
        }
        Commands::Quote(args) => {
            let params = curve_params(&config, &args.curve);
            quote(&args, params)
        }
        Commands::Afford(args) => {
            let params = curve_params(&config, &args.curve);
            afford(&args, params)
        }
        Commands::Config => print_json(&config),
    }
}

/// Config-file curve with command-line overrides applied.
fn curve_params(config: &SimConfig, overrides: &CurveArgs) -> CurveParams {
    let mut market = config.market;
    if let Some(slope) = overrides.slope {
        market.slope = slope;
    }
    if let Some(base) = overrides.base_price {
        market.base_price = base;
    }
    if let Some(cooldown) = overrides.cooldown {
        market.cooldown_secs = cooldown;
    }
    market.params()
}

fn run_scenario(args: &RunArgs, params: CurveParams) -> Result<()> {
    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let scenario = Scenario::from_json(&text)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    info!(
        script = %args.script.display(),
        slope = %params.slope,
        base_price = %params.base_price,
        cooldown_secs = params.cooldown_secs,
        "running scenario"
    );
    let report = scenario
        .run(params, args.stop_on_error)
        .context("Scenario run failed")?;
    print_json(&report)?;

    if args.stop_on_error && report.halted {
        error!(failures = report.failures, "scenario halted on failed step");
        process::exit(1);
    }
    Ok(())
}

fn quote(args: &QuoteArgs, params: CurveParams) -> Result<()> {
    let curve = LinearCurve::from_params(&params);
    let quote = if args.sell {
        curve.quote_sell(args.supply, args.quantity)
    } else {
        curve.quote_buy(args.supply, args.quantity)
    };
    print_json(&quote.context("Cannot price this move")?)
}

fn afford(args: &AffordArgs, params: CurveParams) -> Result<()> {
    let curve = LinearCurve::from_params(&params);
    let quantity = curve
        .max_purchasable(args.supply, args.budget)
        .context("Cannot search this curve")?;
    if quantity == 0 {
        bail!("budget {} does not cover a single unit at supply {}", args.budget, args.supply);
    }
    let cost = curve.cost(args.supply, quantity).context("Cannot price this move")?;
    print_json(&Affordability {
        supply: args.supply,
        budget: args.budget,
        quantity,
        cost,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{out}");
    Ok(())
}

/// Initialize the tracing subscriber on stderr.
///
/// Stdout carries the JSON report, so logs must never be written there or
/// they would corrupt output piped into other tools.
///
/// `RUST_LOG`, when set, takes precedence over `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
