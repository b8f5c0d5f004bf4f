// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::ApiClient;
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::{Engine, EngineConfig, Services};
use execution::{DryRunExecutor, Executor, LiveExecutor};
use notifier::{LogNotifier, Notifier, TelegramNotifier};
use risk::calculate_dca;
use signals::SignalEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

mod input;
mod scanner;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Watches Binance spot holdings, predicts with technical indicators and reports through Telegram."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Checks holdings on a schedule and sends the daily summary until Ctrl-C.
    Run,

    /// Checks every holding once.
    Check {
        /// Also send the portfolio summary afterwards.
        #[arg(long)]
        summary: bool,
    },

    /// Sends the portfolio summary once.
    Summary,

    /// Predicts from a file of close prices, oldest first.
    Predict {
        /// JSON array or newline/comma separated numbers.
        #[arg(short, long)]
        file: PathBuf,

        /// Print the prediction as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prints a DCA plan for a losing position.
    Dca {
        #[arg(short, long)]
        symbol: String,

        /// Current market price.
        #[arg(short, long)]
        price: f64,

        /// Quantity held.
        #[arg(short, long)]
        quantity: f64,

        /// Average buy price of the held quantity.
        #[arg(short, long)]
        average_price: f64,
    },

    /// Predicts every symbol of the watchlist.
    Scan {
        /// Print the results as JSON.
        #[arg(long)]
        json: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // `predict` and `dca` work offline and fall back to defaults without a config.
    let settings = match cli.command {
        Commands::Predict { .. } | Commands::Dca { .. } => app_config::load_settings().ok(),
        _ => Some(app_config::load_settings().context("Failed to load settings")?),
    };
    init_tracing(settings.as_ref().map_or("info", |s| s.app.log_level.as_str()));

    match cli.command {
        Commands::Run => run_app(require(settings)?).await?,
        Commands::Check { summary } => handle_check(require(settings)?, summary).await?,
        Commands::Summary => handle_summary(require(settings)?).await?,
        Commands::Predict { file, json } => handle_predict(settings, file, json)?,
        Commands::Dca {
            symbol,
            price,
            quantity,
            average_price,
        } => handle_dca(settings, &symbol, price, quantity, average_price)?,
        Commands::Scan { json } => handle_scan(require(settings)?, json).await?,
    }

    Ok(())
}

fn require(settings: Option<Settings>) -> Result<Settings> {
    settings.context("Settings are required for this command")
}

fn init_tracing(level: &str) {
    let default_level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("reqwest", tracing::Level::WARN)
            .with_target("hyper", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- Engine wiring ---

fn build_engine(settings: &Settings) -> Result<Engine> {
    let api_client = ApiClient::new(&settings.binance)?;

    let executor: Arc<dyn Executor> = if settings.trading.live_trading_enabled {
        tracing::warn!("LIVE TRADING IS ENABLED. REAL ORDERS WILL BE PLACED.");
        Arc::new(LiveExecutor::new(api_client.clone()))
    } else {
        tracing::info!("Dry run: orders are journaled, not sent.");
        Arc::new(DryRunExecutor::new())
    };

    let notifier: Arc<dyn Notifier> = if settings.telegram.bot_token.is_empty() {
        tracing::warn!("No Telegram bot token configured. Messages go to the log.");
        Arc::new(LogNotifier)
    } else {
        Arc::new(TelegramNotifier::new(&settings.telegram)?)
    };

    let api_client = Arc::new(api_client);
    let services = Services {
        market: api_client.clone(),
        account: api_client,
        executor,
        notifier,
    };
    Engine::new(EngineConfig::from(settings), services)
}

// --- "Run" Subcommand Logic ---

async fn run_app(settings: Settings) -> Result<()> {
    tracing::info!(environment = %settings.app.environment, "Starting sentinel");
    let engine = build_engine(&settings)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    engine.run(shutdown).await?;

    tracing::info!("Sentinel has stopped.");
    Ok(())
}

async fn handle_check(settings: Settings, with_summary: bool) -> Result<()> {
    let engine = build_engine(&settings)?;
    let reports = engine.check_positions().await?;
    tracing::info!(alerts = reports.len(), "Check finished.");
    if with_summary {
        engine.summarize().await?;
    }
    Ok(())
}

async fn handle_summary(settings: Settings) -> Result<()> {
    let engine = build_engine(&settings)?;
    engine.summarize().await?;
    Ok(())
}

// --- Offline Subcommands ---

fn handle_predict(settings: Option<Settings>, file: PathBuf, json: bool) -> Result<()> {
    let signal_settings = settings.map(|s| s.signals).unwrap_or_default();
    let engine = SignalEngine::new(signal_settings)?;
    let closes = input::read_closes(&file)?;
    let prediction = engine.predict(&closes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    let opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    println!("Closes analysed: {}", closes.len());
    println!("Signal:          {}", prediction.signal);
    println!(
        "Next price:      {} ({:+}%)",
        prediction.next_price, prediction.change_pct
    );
    println!(
        "EMA short/long:  {} / {}",
        prediction.short_ema, prediction.long_ema
    );
    println!(
        "MACD:            {} signal {} histogram {}",
        prediction.macd, prediction.macd_signal, prediction.histogram
    );
    println!("RSI:             {}", opt(prediction.rsi));
    println!("StochRSI:        {}", prediction.stoch_rsi);
    println!("Bollinger %B:    {}", opt(prediction.percent_b));
    Ok(())
}

fn handle_dca(
    settings: Option<Settings>,
    symbol: &str,
    price: f64,
    quantity: f64,
    average_price: f64,
) -> Result<()> {
    let targets = settings.map(|s| s.dca.reduction_targets).unwrap_or_else(|| {
        risk::DcaSettings::default().reduction_targets
    });
    let symbol = symbol.to_uppercase();
    let plan = calculate_dca(&symbol, price, quantity, average_price, &targets)?;

    let loss_pct = (price - average_price) / average_price * 100.0;
    println!("📊 DCA Strategy for #{}", symbol);
    println!(
        "Holding {} at avg {:.8}, price {:.8} ({:.2}%)",
        quantity, average_price, price, loss_pct
    );
    if plan.is_empty() {
        println!("Position is not at a loss. Nothing to average down.");
        return Ok(());
    }
    for t in &plan {
        let goal = format!("-{}% loss", t.reduction_pct);
        println!(
            "🎯 {:<12} Target Avg: {:.2} USDT | Buy: {:.1} | Total: {:.1} | Cost: {:.2} USDT | New loss: {:.2}%",
            goal, t.target_avg, t.buy_qty, t.total_qty, t.usdt_cost, t.new_loss_pct
        );
    }
    Ok(())
}

// --- "Scan" Subcommand Logic ---

async fn handle_scan(settings: Settings, json: bool) -> Result<()> {
    let watchlist = app_config::load_watchlist()?;
    let interval = watchlist
        .interval
        .clone()
        .unwrap_or_else(|| settings.trading.interval.clone());
    let engine = SignalEngine::new(settings.signals.clone())?;
    let market = Arc::new(ApiClient::new(&settings.binance)?);

    let rows = scanner::run_scan(
        market,
        engine,
        watchlist.symbols(),
        &interval,
        settings.trading.kline_limit,
        settings.app.scan_threads,
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", scanner::render_scan(&rows));
    }
    Ok(())
}
