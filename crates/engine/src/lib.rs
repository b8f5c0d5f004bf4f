// In crates/engine/src/lib.rs

pub mod report;
pub mod scheduler;
pub mod sources;
pub mod task;

use anyhow::{Context, Result};
use api_client::Holding;
use app_config::{Settings, TradingSettings};
use chrono::NaiveTime;
use execution::Executor;
use futures::future;
use notifier::Notifier;
use num_traits::ToPrimitive;
use risk::{DcaPlanner, DcaSettings, ThresholdRiskManager};
use signals::{SignalEngine, SignalSettings};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

pub use report::{HoldingReport, OrderOutcome, PortfolioSummary, SummaryLine};
pub use sources::{AccountSource, MarketData};

/// Daily kline used for the day's high and low.
pub const DAY_INTERVAL: &str = "1d";

/// The settings the engine needs, cut out of the full application settings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub trading: TradingSettings,
    pub signals: SignalSettings,
    pub dca: DcaSettings,
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            trading: settings.trading.clone(),
            signals: settings.signals.clone(),
            dca: settings.dca.clone(),
        }
    }
}

/// The collaborators the engine talks to.
#[derive(Clone)]
pub struct Services {
    pub market: Arc<dyn MarketData>,
    pub account: Arc<dyn AccountSource>,
    pub executor: Arc<dyn Executor>,
    pub notifier: Arc<dyn Notifier>,
}

/// The portfolio-level orchestrator: checks every holding, trades on the risk
/// manager's decisions and reports through the notifier.
pub struct Engine {
    trading: TradingSettings,
    summary_time: NaiveTime,
    signal_engine: SignalEngine,
    risk_manager: ThresholdRiskManager,
    dca_planner: DcaPlanner,
    services: Services,
}

impl Engine {
    pub fn new(config: EngineConfig, services: Services) -> Result<Self> {
        let summary_time = scheduler::parse_daily_time(&config.trading.summary_time)?;
        let signal_engine =
            SignalEngine::new(config.signals).context("invalid [signals] settings")?;
        let risk_manager = ThresholdRiskManager::new(config.trading.thresholds.clone())
            .context("invalid [trading.thresholds] settings")?;
        if config.trading.check_interval_secs == 0 {
            anyhow::bail!("trading.check_interval_secs must be greater than 0");
        }

        Ok(Self {
            trading: config.trading,
            summary_time,
            signal_engine,
            risk_manager,
            dca_planner: DcaPlanner::new(config.dca),
            services,
        })
    }

    pub fn signal_engine(&self) -> &SignalEngine {
        &self.signal_engine
    }

    /// Checks every priced holding concurrently.
    ///
    /// Holdings that moved less than the alert threshold produce no report. A
    /// failure on one holding is logged and does not affect the others.
    pub async fn check_positions(&self) -> Result<Vec<HoldingReport>> {
        let holdings = self
            .services
            .account
            .holdings(&self.trading.quote_asset)
            .await
            .context("failed to fetch holdings")?;
        tracing::info!(count = holdings.len(), "Checking account holdings");

        let priced: Vec<&Holding> = holdings
            .iter()
            .filter(|h| {
                let priced = h.average_price.is_some_and(|p| p > 0.0);
                if !priced {
                    tracing::info!(asset = %h.asset, quantity = h.total, "No average price from trade history. Skipping.");
                }
                priced
            })
            .collect();

        let results = future::join_all(priced.iter().map(|h| self.check_holding(h))).await;

        let mut reports = Vec::new();
        for (holding, result) in priced.iter().zip(results) {
            match result {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(symbol = %holding.symbol, error = %format!("{:#}", e), "Holding check failed")
                }
            }
        }
        Ok(reports)
    }

    /// Values every priced holding at the current market price and sends the summary.
    pub async fn summarize(&self) -> Result<PortfolioSummary> {
        let holdings = self
            .services
            .account
            .holdings(&self.trading.quote_asset)
            .await
            .context("failed to fetch holdings")?;

        let priced: Vec<(&Holding, f64)> = holdings
            .iter()
            .filter_map(|h| h.average_price.filter(|p| *p > 0.0).map(|avg| (h, avg)))
            .collect();
        let prices = future::join_all(
            priced
                .iter()
                .map(|(h, _)| self.services.market.price(&h.symbol)),
        )
        .await;

        let mut lines = Vec::with_capacity(priced.len());
        for ((holding, average_price), price) in priced.into_iter().zip(prices) {
            let price = match price.map(|p| p.to_f64()) {
                Ok(Some(p)) => p,
                Ok(None) => {
                    tracing::warn!(symbol = %holding.symbol, "Price is not representable. Skipping.");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(symbol = %holding.symbol, error = %e, "Price lookup failed. Skipping.");
                    continue;
                }
            };
            lines.push(SummaryLine::new(holding, average_price, price));
        }

        let summary = PortfolioSummary::from_lines(lines);
        tracing::info!(
            invested = summary.total_invested,
            value = summary.total_value,
            pnl = summary.total_pnl,
            change_pct = summary.total_change_pct,
            "Portfolio summary"
        );
        self.notify(&report::render_summary(&summary)).await;
        Ok(summary)
    }

    /// Checks positions every `check_interval_secs` and summarizes once a day at
    /// `summary_time`, until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.trading.check_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let summary_sleep = tokio::time::sleep(scheduler::until_next_local(self.summary_time));
        tokio::pin!(summary_sleep);
        tokio::pin!(shutdown);

        tracing::info!(
            every_secs = self.trading.check_interval_secs,
            summary_at = %self.summary_time,
            executor = self.services.executor.name(),
            notifier = self.services.notifier.name(),
            "Engine started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested. Stopping engine.");
                    break;
                }
                _ = ticker.tick() => {
                    match self.check_positions().await {
                        Ok(reports) => tracing::info!(alerts = reports.len(), "Position check complete"),
                        Err(e) => tracing::error!(error = %format!("{:#}", e), "Position check failed"),
                    }
                }
                _ = &mut summary_sleep => {
                    if let Err(e) = self.summarize().await {
                        tracing::error!(error = %format!("{:#}", e), "Daily summary failed");
                    }
                    let next = scheduler::until_next_local(self.summary_time);
                    summary_sleep.as_mut().reset(Instant::now() + next);
                }
            }
        }
        Ok(())
    }

    /// Notification failures are logged, never propagated.
    async fn notify(&self, message: &str) {
        if let Err(e) = self.services.notifier.send(message).await {
            tracing::error!(notifier = self.services.notifier.name(), error = %e, "Notification failed");
        }
    }
}
