use analytics::{
    format_currency, format_percentage, with_rng, MarketAnalysis, OwnershipAnalysis,
    PropertyMetrics, ValuationEngine,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::settings::Config;
use configuration::{ConfigArgs, LoggingSettings};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The main entry point for the proplens application.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment overrides from .env if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let config = cli
        .config
        .load()
        .with_context(|| format!("Failed to load {}", cli.config.config.display()))?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Value(args) => handle_value(args, &config),
        Commands::Portfolio(args) => handle_portfolio(args, &config),
        Commands::Market(args) => handle_market(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Property valuation and portfolio analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API.
    Serve(ServeArgs),
    /// Value a single property from a JSON file.
    Value(ValueArgs),
    /// Analyse one owner's holdings from a JSON array file.
    Portfolio(PortfolioArgs),
    /// Summarise a market slice from a JSON array file.
    Market(MarketArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind, overriding `server.addr` from the configuration.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Args)]
struct OutputArgs {
    /// Seed for the market noise; omit for a fresh draw on every run.
    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValueArgs {
    /// JSON file holding one property object.
    #[arg(long)]
    input: PathBuf,

    /// JSON file holding an array of comparable properties.
    #[arg(long)]
    comparables: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct PortfolioArgs {
    /// JSON file holding an array of properties.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct MarketArgs {
    /// JSON file holding an array of properties.
    #[arg(long)]
    input: PathBuf,

    /// Label echoed back in the analysis, e.g. "Travis County".
    #[arg(long)]
    location: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stderr always, plus a daily file when configured.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Invalid logging.level filter")?;

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, config: Config) -> Result<()> {
    let addr = args.addr.unwrap_or(config.server.addr);
    tracing::info!(%addr, "Starting REST API");
    web_server::run_server(addr, config.valuation).await
}

fn handle_value(args: ValueArgs, config: &Config) -> Result<()> {
    let engine = ValuationEngine::new(config.valuation.clone())?;
    let property = read_json(&args.input)?;
    let comparables = args.comparables.as_deref().map(read_json).transpose()?;

    tracing::info!(input = %args.input.display(), "Valuing property");
    let metrics = with_rng(args.output.seed, |rng| {
        engine.valuation_from_json(&property, comparables.as_ref(), rng)
    })?;

    emit(&args.output, &metrics, metrics_table)
}

fn handle_portfolio(args: PortfolioArgs, config: &Config) -> Result<()> {
    let engine = ValuationEngine::new(config.valuation.clone())?;
    let properties = read_json(&args.input)?;

    tracing::info!(input = %args.input.display(), "Analysing portfolio");
    let analysis = with_rng(args.output.seed, |rng| {
        engine.portfolio_analyzer().analyze_json(&properties, rng)
    })?;

    emit(&args.output, &analysis, ownership_table)
}

fn handle_market(args: MarketArgs, config: &Config) -> Result<()> {
    let engine = ValuationEngine::new(config.valuation.clone())?;
    let properties = read_json(&args.input)?;

    tracing::info!(input = %args.input.display(), "Analysing market");
    let analysis = with_rng(args.output.seed, |rng| {
        engine
            .market_analyzer()
            .analyze_json(&properties, args.location.as_deref(), rng)
    })?;

    emit(&args.output, &analysis, market_table)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Prints `value` as pretty JSON or through the given table renderer.
fn emit<T: Serialize>(output: &OutputArgs, value: &T, table: fn(&T) -> Table) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", table(value));
    }
    Ok(())
}

// ==============================================================================
// Table Rendering
// ==============================================================================

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table
}

fn money(value: u64) -> String {
    format_currency(value as f64)
}

fn metrics_table(m: &PropertyMetrics) -> Table {
    let mut table = new_table();
    table
        .add_row(vec!["Estimated value".to_string(), money(m.estimated_value)])
        .add_row(vec!["Price / sq ft".to_string(), format!("${}", m.price_per_sq_ft)])
        .add_row(vec![
            "Vs. comparables".to_string(),
            format_percentage(m.market_value_adjustment),
        ])
        .add_row(vec![
            "Appreciation".to_string(),
            format_percentage(m.appreciation_rate),
        ]);

    if let (Some(cap), Some(coc), Some(roi)) = (m.cap_rate, m.cash_on_cash_return, m.roi) {
        table
            .add_row(vec!["Cap rate".to_string(), format_percentage(cap)])
            .add_row(vec!["Cash-on-cash".to_string(), format_percentage(coc)])
            .add_row(vec!["ROI".to_string(), format_percentage(roi)]);
    }

    table
        .add_row(vec!["Market score".to_string(), m.market_score.to_string()])
        .add_row(vec!["Liquidity score".to_string(), m.liquidity_score.to_string()])
        .add_row(vec!["Risk score".to_string(), m.risk_score.to_string()])
        .add_row(vec![
            "Price / national median".to_string(),
            format!("{:.2}x", m.price_to_area_median),
        ])
        .add_row(vec!["Value percentile".to_string(), m.value_percentile.to_string()])
        .add_row(vec!["Tax burden".to_string(), format_percentage(m.tax_burden)])
        .add_row(vec![
            "Maintenance / yr".to_string(),
            money(m.maintenance_cost_estimate),
        ])
        .add_row(vec![
            "Insurance / yr".to_string(),
            money(m.insurance_cost_estimate),
        ]);
    table
}

fn ownership_table(a: &OwnershipAnalysis) -> Table {
    let mut table = new_table();
    table
        .add_row(vec!["Portfolio value".to_string(), money(a.portfolio_value)])
        .add_row(vec!["Growth".to_string(), format_percentage(a.portfolio_growth)])
        .add_row(vec![
            "Diversification".to_string(),
            a.diversification_score.to_string(),
        ])
        .add_row(vec![
            "Concentration risk".to_string(),
            a.concentration_risk.to_string(),
        ])
        .add_row(vec!["Leverage".to_string(), format_percentage(a.leverage_ratio)])
        .add_row(vec!["Liquidity".to_string(), format_percentage(a.liquidity_ratio)])
        .add_row(vec!["Performance".to_string(), a.performance_score.to_string()]);
    table
}

fn market_table(a: &MarketAnalysis) -> Table {
    let mut table = new_table();
    if let Some(location) = &a.location {
        table.add_row(vec!["Location".to_string(), location.clone()]);
    }
    table
        .add_row(vec!["Median price".to_string(), money(a.median_price)])
        .add_row(vec!["Average price".to_string(), money(a.average_price)])
        .add_row(vec!["Price growth".to_string(), format_percentage(a.price_growth)])
        .add_row(vec!["Inventory".to_string(), a.inventory.to_string()])
        .add_row(vec!["Days on market".to_string(), a.days_on_market.to_string()])
        .add_row(vec!["Absorption".to_string(), format!("{:.2}", a.absorption)])
        .add_row(vec!["Trend".to_string(), a.market_trend.to_string()])
        .add_row(vec![
            "Competitive index".to_string(),
            a.competitive_index.to_string(),
        ]);
    table
}
