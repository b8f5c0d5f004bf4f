// In crates/execution/src/live.rs

use crate::{Executor, Result};
use api_client::ApiClient;
use async_trait::async_trait;
use core_types::{Execution, OrderRequest};
use rust_decimal::Decimal;

/// An executor that places real market orders on Binance Spot.
#[derive(Debug, Clone)]
pub struct LiveExecutor {
    api_client: ApiClient,
}

impl LiveExecutor {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl Executor for LiveExecutor {
    fn name(&self) -> &'static str {
        "LiveExecutor"
    }

    async fn execute(
        &self,
        order_request: &OrderRequest,
        current_price: Decimal,
    ) -> Result<Execution> {
        tracing::info!(?order_request, "Executing live order request...");

        // --- Place the Market Order ---
        let order_response = self
            .api_client
            .place_market_order(&order_request.symbol, order_request.side, order_request.quantity)
            .await
            .inspect_err(|e| {
                tracing::error!(symbol = %order_request.symbol, side = %order_request.side, error = %e, "Failed to place market order.");
            })?;

        // --- Build the Execution Record from the Fill ---
        // Unfilled orders keep the price the decision was made at.
        let execution = Execution {
            symbol: order_request.symbol.clone(),
            side: order_request.side,
            order_id: order_response.order_id,
            status: order_response.status.clone(),
            price: order_response.avg_price().unwrap_or(current_price),
            quantity: order_response.executed_qty,
            source_request: order_request.clone(),
        };
        tracing::info!(?execution, "Market order acknowledged.");

        Ok(execution)
    }
}
