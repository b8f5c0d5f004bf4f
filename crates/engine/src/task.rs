// In crates/engine/src/task.rs

use crate::report::{self, HoldingReport, OrderOutcome};
use crate::{DAY_INTERVAL, Engine};
use anyhow::{Context, Result};
use api_client::Holding;
use core_types::Symbol;
use num_traits::ToPrimitive;
use risk::RiskManager;
use signals::{PredictionResult, closes_from_klines};

impl Engine {
    /// Runs the full check for one holding.
    ///
    /// Returns `None` when the move is below the alert threshold. Only the price
    /// lookup, the kline fetch and the prediction are fatal for the holding; the
    /// day range, the DCA plan and the notification degrade with a log line.
    pub async fn check_holding(&self, holding: &Holding) -> Result<Option<HoldingReport>> {
        let symbol = &holding.symbol;
        let price_dec = self
            .services
            .market
            .price(symbol)
            .await
            .with_context(|| format!("price lookup failed for {}", symbol))?;
        let price = price_dec
            .to_f64()
            .with_context(|| format!("price {} for {} is not representable", price_dec, symbol))?;
        let position = holding
            .to_position(price)
            .with_context(|| format!("{} has no average price", symbol))?;

        let pnl_pct = self.risk_manager.pnl_percent(&position);
        let pnl_value = (price - position.average_price) * holding.total;
        tracing::info!(
            %symbol,
            quantity = holding.total,
            average_price = position.average_price,
            price,
            pnl_pct = %format!("{:.2}", pnl_pct),
            "Holding priced"
        );

        if !self.risk_manager.is_significant(&position) {
            tracing::debug!(%symbol, "Change below alert threshold. Skipping.");
            return Ok(None);
        }

        // --- Prediction ---
        let klines = self
            .services
            .market
            .klines(symbol, &self.trading.interval, self.trading.kline_limit)
            .await
            .with_context(|| format!("kline fetch failed for {}", symbol))?;
        let closes = closes_from_klines(&klines)
            .with_context(|| format!("bad kline history for {}", symbol))?;
        let prediction = self
            .signal_engine
            .predict(&closes)
            .with_context(|| format!("prediction failed for {}", symbol))?;
        let prediction = self.attach_day_range(symbol, prediction).await;
        tracing::info!(
            %symbol,
            signal = %prediction.signal,
            next_price = prediction.next_price,
            change_pct = prediction.change_pct,
            "Prediction ready"
        );

        // --- DCA plan ---
        let dca_plan = if self.risk_manager.wants_dca_plan(&position) {
            self.dca_planner.plan(&position).unwrap_or_else(|e| {
                tracing::warn!(%symbol, error = %e, "DCA plan unavailable");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        // --- Risk and execution ---
        let order = match self.risk_manager.evaluate(&position, &prediction) {
            Ok(Some(request)) => {
                tracing::info!(%symbol, side = %request.side, quantity = %request.quantity, "Risk manager requested an order");
                match self.services.executor.execute(&request, price_dec).await {
                    Ok(execution) => Some(OrderOutcome::Executed(execution)),
                    Err(e) => {
                        tracing::error!(%symbol, error = %e, "Order execution failed");
                        Some(OrderOutcome::Failed(e.to_string()))
                    }
                }
            }
            Ok(None) => None,
            Err(risk::Error::Vetoed { reason }) => {
                tracing::warn!(%symbol, %reason, "Order vetoed");
                Some(OrderOutcome::Vetoed(reason))
            }
            Err(e) => return Err(e).with_context(|| format!("risk evaluation failed for {}", symbol)),
        };

        let report = HoldingReport {
            holding: holding.clone(),
            position,
            pnl_pct,
            pnl_value,
            prediction,
            dca_plan,
            order,
        };
        self.notify(&report::render_check(&report)).await;
        Ok(Some(report))
    }

    async fn attach_day_range(&self, symbol: &Symbol, prediction: PredictionResult) -> PredictionResult {
        match self.services.market.klines(symbol, DAY_INTERVAL, 1).await {
            Ok(klines) => match klines.last() {
                Some(day) => prediction.with_day_range(day.high.to_f64(), day.low.to_f64()),
                None => prediction,
            },
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "Day range unavailable");
                prediction
            }
        }
    }
}
