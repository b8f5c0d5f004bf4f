// In crates/engine/src/report.rs

use api_client::Holding;
use core_types::{Execution, Position, Side};
use risk::DcaTarget;
use signals::PredictionResult;
use std::fmt::Write;

/// What happened to the order the risk manager asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Executed(Execution),
    Vetoed(String),
    Failed(String),
}

/// Result of checking one holding that moved past the alert threshold.
#[derive(Debug, Clone)]
pub struct HoldingReport {
    pub holding: Holding,
    pub position: Position,
    pub pnl_pct: f64,
    /// Unrealized PnL in the quote asset.
    pub pnl_value: f64,
    pub prediction: PredictionResult,
    pub dca_plan: Vec<DcaTarget>,
    pub order: Option<OrderOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub symbol: String,
    pub quantity: f64,
    pub average_price: f64,
    pub current_price: f64,
    pub invested: f64,
    pub current_value: f64,
    pub pnl: f64,
    pub change_pct: f64,
}

impl SummaryLine {
    pub fn new(holding: &Holding, average_price: f64, current_price: f64) -> Self {
        let invested = average_price * holding.total;
        let current_value = current_price * holding.total;
        Self {
            symbol: holding.symbol.0.clone(),
            quantity: holding.total,
            average_price,
            current_price,
            invested,
            current_value,
            pnl: current_value - invested,
            change_pct: (current_price - average_price) / average_price * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub lines: Vec<SummaryLine>,
    pub total_invested: f64,
    pub total_value: f64,
    pub total_pnl: f64,
    /// 0 when nothing is invested.
    pub total_change_pct: f64,
}

impl PortfolioSummary {
    pub fn from_lines(lines: Vec<SummaryLine>) -> Self {
        // An empty f64 `sum()` is -0.0; fold from +0.0.
        let total_invested = lines.iter().fold(0.0, |acc, l| acc + l.invested);
        let total_value = lines.iter().fold(0.0, |acc, l| acc + l.current_value);
        let total_pnl = lines.iter().fold(0.0, |acc, l| acc + l.pnl);
        let total_change_pct = if total_invested > 0.0 {
            (total_value - total_invested) / total_invested * 100.0
        } else {
            0.0
        };
        Self {
            lines,
            total_invested,
            total_value,
            total_pnl,
            total_change_pct,
        }
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.*}", decimals, v))
}

/// Markdown alert for one holding.
pub fn render_check(report: &HoldingReport) -> String {
    let p = &report.prediction;
    let pos = &report.position;
    let outcome = if report.pnl_value > 0.0 { "Profit" } else { "Loss" };

    let mut msg = String::new();
    let _ = write!(
        msg,
        "🚀 *Auto-Trade for: #{}*\n\
         PnL: {:.2}% ({:.8} → {:.8})\n\
         {}: {:.2} USDT\n\
         Signal: *{}*\n\
         Quantity: {:.8}\n\
         Entry Price: {}\n\
         Average Price: {:.8}\n\
         Current Price: {:.8}\n\
         High: {} - Low: {}\n\
         Next Price: {:.8} ({:+.2}%)\n\
         RSI: {} | StochRSI: {:.3} | %B: {}",
        pos.symbol,
        report.pnl_pct,
        pos.average_price,
        pos.current_price,
        outcome,
        report.pnl_value,
        p.signal,
        pos.quantity,
        fmt_opt(report.holding.cost_price, 8),
        pos.average_price,
        pos.current_price,
        fmt_opt(p.day_high, 8),
        fmt_opt(p.day_low, 8),
        p.next_price,
        p.change_pct,
        fmt_opt(p.rsi, 2),
        p.stoch_rsi,
        fmt_opt(p.percent_b, 3),
    );

    if !report.dca_plan.is_empty() {
        let _ = write!(msg, "\n\n📊 DCA Strategy for #{}\n", pos.symbol);
        for t in &report.dca_plan {
            let _ = writeln!(
                msg,
                "🎯 Target Avg: {:.2} USDT | Buy: {:.1} | Total: {:.1} | Cost: {:.2} USDT",
                t.target_avg, t.buy_qty, t.total_qty, t.usdt_cost
            );
        }
    }

    match &report.order {
        Some(OrderOutcome::Executed(execution)) => {
            let action = match execution.side {
                Side::Sell => "Partial Take-Profit: Sold",
                Side::Buy => "DCA Buy Order: Bought",
            };
            let _ = write!(msg, "\n\n{} {} units.", action, execution.quantity);
        }
        Some(OrderOutcome::Vetoed(reason)) => {
            let _ = write!(msg, "\n\nOrder skipped: {}", reason);
        }
        Some(OrderOutcome::Failed(reason)) => {
            let _ = write!(msg, "\n\n⚠️ Order failed: {}", reason);
        }
        None => {}
    }

    msg
}

/// Markdown portfolio summary.
pub fn render_summary(summary: &PortfolioSummary) -> String {
    let mut msg = String::from("📊 *Account Balances Summary:*\n\n");
    for line in &summary.lines {
        let _ = writeln!(
            msg,
            "[#{}]: {:.4} - Avg: {:.4} - PnL: {:.2} ({:.2}%)",
            line.symbol, line.quantity, line.average_price, line.pnl, line.change_pct
        );
    }
    let _ = write!(
        msg,
        "\n*Total Portfolio Value:* {:.2} USDT.\n*Current:* {:.2} USDT.\n*PNL:* {:.2} USDT ({:.2}%)",
        summary.total_invested, summary.total_value, summary.total_pnl, summary.total_change_pct
    );
    msg
}
