// In crates/risk/src/threshold_manager.rs

use crate::types::ThresholdSettings;
use crate::{Error, Result, RiskManager};
use core_types::{OrderRequest, Position, Side, Signal};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use signals::PredictionResult;

/// Risk manager that trades a fixed quantity once unrealized PnL crosses
/// configured percent thresholds.
///
/// It implements two rules:
/// 1. Take profit: sell when the gain exceeds the sell threshold and the price is
///    at or above the day high, or the signal engine says SELL.
/// 2. Average down: buy when the signal engine says BUY and the loss reaches the
///    buy threshold.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRiskManager {
    settings: ThresholdSettings,
}

impl ThresholdRiskManager {
    pub fn new(settings: ThresholdSettings) -> Result<Self> {
        let s = &settings;
        let all_finite = [
            s.percent_threshold,
            s.percent_threshold_buy,
            s.percent_threshold_sell,
            s.min_quantity,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite || s.min_quantity <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "thresholds must be finite and min_quantity positive: {:?}",
                settings
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ThresholdSettings {
        &self.settings
    }

    /// Unrealized PnL of the holding in percent of its average price.
    pub fn pnl_percent(&self, position: &Position) -> f64 {
        (position.current_price - position.average_price) / position.average_price * 100.0
    }

    /// Whether the move is large enough to analyse and report.
    pub fn is_significant(&self, position: &Position) -> bool {
        self.pnl_percent(position).abs() >= self.settings.percent_threshold
    }

    /// Whether the loss is deep enough to attach a DCA plan to the report.
    pub fn wants_dca_plan(&self, position: &Position) -> bool {
        self.pnl_percent(position) <= -self.settings.percent_threshold
    }

    fn order(&self, position: &Position, side: Side, signal: Signal) -> Result<OrderRequest> {
        let quantity = Decimal::from_f64(self.settings.min_quantity).ok_or_else(|| {
            Error::InvalidParameters(format!(
                "min_quantity {} is not representable",
                self.settings.min_quantity
            ))
        })?;
        Ok(OrderRequest {
            symbol: position.symbol.clone(),
            side,
            quantity,
            originating_signal: signal,
        })
    }
}

impl RiskManager for ThresholdRiskManager {
    fn name(&self) -> &'static str {
        "ThresholdRiskManager"
    }

    fn evaluate(
        &self,
        position: &Position,
        prediction: &PredictionResult,
    ) -> Result<Option<OrderRequest>> {
        if !(position.average_price > 0.0) {
            return Err(Error::InvalidInput {
                symbol: position.symbol.to_string(),
                reason: format!("average price must be positive, got {}", position.average_price),
            });
        }

        let change = self.pnl_percent(position);
        let s = &self.settings;

        // --- Take profit ---
        if change > s.percent_threshold_sell {
            let at_day_high = prediction
                .day_high
                .is_some_and(|high| position.current_price >= high);
            if at_day_high || prediction.signal == Signal::Sell {
                if position.quantity < s.min_quantity {
                    return Err(Error::Vetoed {
                        reason: format!(
                            "Holding {:.4} {} is below the minimum order quantity {}",
                            position.quantity, position.symbol, s.min_quantity
                        ),
                    });
                }
                return self.order(position, Side::Sell, prediction.signal).map(Some);
            }
        }

        // --- Average down ---
        if prediction.signal == Signal::Buy && change <= -s.percent_threshold_buy {
            return self.order(position, Side::Buy, prediction.signal).map(Some);
        }

        Ok(None)
    }
}
