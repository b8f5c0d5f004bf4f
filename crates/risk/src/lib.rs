// In crates/risk/src/lib.rs

use core_types::{OrderRequest, Position};
use signals::PredictionResult;

pub mod dca;
pub mod error;
pub mod threshold_manager;
pub mod types;

// Re-export public types
pub use dca::{DcaPlanner, calculate_dca};
pub use error::{Error, Result};
pub use threshold_manager::ThresholdRiskManager;
pub use types::{DcaSettings, DcaTarget, ThresholdSettings};

/// The universal interface for a risk management module.
///
/// A `RiskManager` looks at an existing holding together with the latest
/// prediction for its symbol and decides whether a market order should be placed.
pub trait RiskManager: Send + Sync {
    /// The name of the risk management strategy.
    fn name(&self) -> &'static str;

    /// Evaluates a holding against the risk rules.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(OrderRequest))`: an order should be placed.
    /// * `Ok(None)`: no action is required.
    /// * `Err(Error::Vetoed)`: an order was warranted but a rule blocked it.
    fn evaluate(
        &self,
        position: &Position,
        prediction: &PredictionResult,
    ) -> Result<Option<OrderRequest>>;
}
