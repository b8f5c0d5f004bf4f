// In app/src/scanner.rs

use anyhow::{Context, Result};
use core_types::Symbol;
use engine::MarketData;
use futures::future;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use signals::{PredictionResult, SignalEngine, closes_from_klines};
use std::sync::Arc;

/// One watchlist entry of a scan.
#[derive(Debug, Serialize)]
pub struct ScanRow {
    pub symbol: String,
    pub last_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches klines for every symbol concurrently, then predicts in parallel on a
/// rayon pool. Rows keep the watchlist order.
pub async fn run_scan(
    market: Arc<dyn MarketData>,
    engine: SignalEngine,
    symbols: Vec<Symbol>,
    interval: &str,
    limit: u16,
    threads: Option<usize>,
) -> Result<Vec<ScanRow>> {
    tracing::info!(count = symbols.len(), interval, "Fetching watchlist klines");
    let fetched = future::join_all(
        symbols
            .iter()
            .map(|symbol| market.klines(symbol, interval, limit)),
    )
    .await;

    let series: Vec<(Symbol, std::result::Result<Vec<f64>, String>)> = symbols
        .into_iter()
        .zip(fetched)
        .map(|(symbol, klines)| {
            let closes = klines
                .map_err(|e| format!("{:#}", e))
                .and_then(|k| closes_from_klines(&k).map_err(|e| e.to_string()));
            (symbol, closes)
        })
        .collect();

    // Heavy work goes to a blocking thread so the runtime stays responsive.
    tokio::task::spawn_blocking(move || predict_all(&engine, series, threads))
        .await
        .context("Scan worker panicked")?
}

fn predict_all(
    engine: &SignalEngine,
    series: Vec<(Symbol, std::result::Result<Vec<f64>, String>)>,
    threads: Option<usize>,
) -> Result<Vec<ScanRow>> {
    let mut builder = ThreadPoolBuilder::new();
    if let Some(n) = threads.filter(|n| *n > 0) {
        tracing::info!(threads = n, "Configuring Rayon thread pool.");
        builder = builder.num_threads(n);
    }
    let pool = builder.build().context("Failed to build Rayon thread pool")?;

    Ok(pool.install(|| {
        series
            .par_iter()
            .map(|(symbol, closes)| scan_row(engine, symbol, closes))
            .collect()
    }))
}

fn scan_row(
    engine: &SignalEngine,
    symbol: &Symbol,
    closes: &std::result::Result<Vec<f64>, String>,
) -> ScanRow {
    let closes = match closes {
        Ok(closes) => closes,
        Err(e) => {
            return ScanRow {
                symbol: symbol.0.clone(),
                last_close: None,
                prediction: None,
                error: Some(e.clone()),
            };
        }
    };
    let (prediction, error) = match engine.predict(closes) {
        Ok(p) => (Some(p), None),
        Err(e) => (None, Some(e.to_string())),
    };
    ScanRow {
        symbol: symbol.0.clone(),
        last_close: closes.last().copied(),
        prediction,
        error,
    }
}

/// Plain-text table of a scan.
pub fn render_scan(rows: &[ScanRow]) -> String {
    let mut out = format!(
        "{:<12} {:>14} {:>14} {:>8} {:>6} {:>8} {:>8} {:>7}\n",
        "SYMBOL", "CLOSE", "NEXT", "CHG%", "SIGNAL", "RSI", "STOCH", "%B"
    );
    for row in rows {
        match &row.prediction {
            Some(p) => out.push_str(&format!(
                "{:<12} {:>14.8} {:>14.2} {:>8.2} {:>6} {:>8} {:>8.3} {:>7}\n",
                row.symbol,
                row.last_close.unwrap_or_default(),
                p.next_price,
                p.change_pct,
                p.signal,
                p.rsi.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
                p.stoch_rsi,
                p.percent_b.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v)),
            )),
            None => out.push_str(&format!(
                "{:<12} error: {}\n",
                row.symbol,
                row.error.as_deref().unwrap_or("unknown")
            )),
        }
    }
    out
}
