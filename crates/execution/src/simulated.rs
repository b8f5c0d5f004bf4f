// In crates/execution/src/simulated.rs

use crate::{Error, Executor, Result};
use async_trait::async_trait;
use core_types::{Execution, OrderRequest};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

/// Status reported for orders that were only journaled.
pub const DRY_RUN_STATUS: &str = "DRY_RUN";

/// An executor that fills every order at the current price without touching the
/// exchange, and keeps a journal of what it would have sent.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    journal: Mutex<Vec<Execution>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every execution produced so far, oldest first.
    pub async fn journal(&self) -> Vec<Execution> {
        self.journal.lock().await.clone()
    }
}

#[async_trait]
impl Executor for DryRunExecutor {
    fn name(&self) -> &'static str {
        "DryRunExecutor"
    }

    async fn execute(
        &self,
        order_request: &OrderRequest,
        current_price: Decimal,
    ) -> Result<Execution> {
        if order_request.quantity <= Decimal::ZERO {
            return Err(Error::ExecutionFailed {
                reason: format!("Quantity must be positive, got {}", order_request.quantity),
            });
        }

        let mut journal = self.journal.lock().await;
        // Negative ids never collide with exchange order ids.
        let order_id = -(journal.len() as i64 + 1);
        let execution = Execution {
            symbol: order_request.symbol.clone(),
            side: order_request.side,
            order_id,
            status: DRY_RUN_STATUS.to_string(),
            price: current_price,
            quantity: order_request.quantity,
            source_request: order_request.clone(),
        };
        journal.push(execution.clone());

        tracing::info!(
            symbol = %order_request.symbol,
            side = %order_request.side,
            quantity = %order_request.quantity,
            price = %current_price,
            "Dry run: order not sent"
        );
        Ok(execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Side, Signal, Symbol};
    use rust_decimal_macros::dec;

    fn order(side: Side, quantity: Decimal) -> OrderRequest {
        OrderRequest {
            symbol: Symbol("BTCUSDT".to_string()),
            side,
            quantity,
            originating_signal: Signal::Sell,
        }
    }

    #[tokio::test]
    async fn fills_at_current_price_and_journals() {
        let executor = DryRunExecutor::new();
        let first = executor.execute(&order(Side::Sell, dec!(5)), dec!(101.5)).await.unwrap();
        let second = executor.execute(&order(Side::Buy, dec!(5)), dec!(99)).await.unwrap();

        assert_eq!(first.price, dec!(101.5));
        assert_eq!(first.status, DRY_RUN_STATUS);
        assert_eq!(first.order_id, -1);
        assert_eq!(second.order_id, -2);
        assert_eq!(executor.journal().await, vec![first, second]);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let executor = DryRunExecutor::new();
        let result = executor.execute(&order(Side::Buy, Decimal::ZERO), dec!(1)).await;
        assert!(matches!(result, Err(Error::ExecutionFailed { .. })));
        assert!(executor.journal().await.is_empty());
    }
}
