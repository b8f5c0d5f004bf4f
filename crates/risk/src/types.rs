// In crates/risk/src/types.rs

use serde::{Deserialize, Serialize};

/// Loss-reduction goals for the DCA planner, in percent of the current loss.
///
/// Goals that do not lower the loss, such as `0`, produce no plan step.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DcaSettings {
    pub reduction_targets: Vec<f64>,
}

impl Default for DcaSettings {
    fn default() -> Self {
        Self {
            reduction_targets: vec![30.0, 50.0, 80.0, 0.0],
        }
    }
}

/// One step of a DCA plan: buy `buy_qty` at the current price to move the average.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct DcaTarget {
    /// Requested reduction of the current loss, in percent.
    pub reduction_pct: f64,
    /// Average buy price after the purchase.
    pub target_avg: f64,
    pub buy_qty: f64,
    pub total_qty: f64,
    /// Quote-currency cost of the purchase.
    pub usdt_cost: f64,
    /// Loss relative to the new average, in percent.
    pub new_loss_pct: f64,
}

/// Percent thresholds (of unrealized PnL) that drive alerts and automatic orders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Moves smaller than this, in either direction, are ignored.
    pub percent_threshold: f64,
    /// Loss at which a BUY signal turns into a buy order.
    pub percent_threshold_buy: f64,
    /// Gain above which profits are taken.
    pub percent_threshold_sell: f64,
    /// Quantity of every automatic order.
    pub min_quantity: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            percent_threshold: 10.0,
            percent_threshold_buy: 10.0,
            percent_threshold_sell: 15.0,
            min_quantity: 5.0,
        }
    }
}
