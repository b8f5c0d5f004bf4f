// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::{Execution, OrderRequest};
use rust_decimal::Decimal;

pub mod error;
pub mod live;
pub mod simulated;

// Re-export public types
pub use error::{Error, Result};
pub use live::LiveExecutor;
pub use simulated::DryRunExecutor;

/// The universal interface for an execution handler.
///
/// An `Executor` takes an approved `OrderRequest` and submits it to a target,
/// which is either the exchange or a dry-run journal.
#[async_trait]
pub trait Executor: Send + Sync {
    /// The name of the executor (e.g., "LiveExecutor", "DryRunExecutor").
    fn name(&self) -> &'static str;

    /// Executes a given order request.
    ///
    /// # Arguments
    ///
    /// * `order_request`: The order to place.
    /// * `current_price`: The last known market price, used when the target does
    ///   not report a fill price.
    async fn execute(
        &self,
        order_request: &OrderRequest,
        current_price: Decimal,
    ) -> Result<Execution>;
}
