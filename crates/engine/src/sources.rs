// In crates/engine/src/sources.rs

use anyhow::Result;
use api_client::{ApiClient, Holding};
use async_trait::async_trait;
use core_types::{Kline, Symbol};
use rust_decimal::Decimal;

/// Candles and prices for a symbol.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Klines oldest first.
    async fn klines(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Kline>>;

    async fn price(&self, symbol: &Symbol) -> Result<Decimal>;
}

/// The account's holdings with their cost basis.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn holdings(&self, quote_asset: &str) -> Result<Vec<Holding>>;
}

#[async_trait]
impl MarketData for ApiClient {
    async fn klines(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Kline>> {
        Ok(self.get_klines(symbol, interval, Some(limit)).await?)
    }

    async fn price(&self, symbol: &Symbol) -> Result<Decimal> {
        Ok(self.get_price(symbol).await?)
    }
}

#[async_trait]
impl AccountSource for ApiClient {
    async fn holdings(&self, quote_asset: &str) -> Result<Vec<Holding>> {
        Ok(self.get_holdings(quote_asset).await?)
    }
}
