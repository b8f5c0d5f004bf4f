// In crates/api-client/src/types.rs

use crate::{Error, Result};
use core_types::{Kline, Position, Symbol};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The main client for interacting with the Binance Spot API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The user's Binance API key.
    pub api_key: String,
    /// The user's Binance secret key.
    pub secret_key: String,
    /// The base URL for the Binance Spot API.
    pub base_url: String,
}

/// Temporary struct to deserialize the kline response from Binance,
/// which is a JSON array of mixed types.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,    // 0: Open time
    pub String, // 1: Open
    pub String, // 2: High
    pub String, // 3: Low
    pub String, // 4: Close
    pub String, // 5: Volume
    pub i64,    // 6: Close time
    pub String, // 7: Quote asset volume
    pub i64,    // 8: Number of trades
    pub String, // 9: Taker buy base asset volume
    pub String, // 10: Taker buy quote asset volume
    pub String, // 11: Ignore
);

impl RawKline {
    /// Converts into the internal kline type, rejecting malformed prices.
    pub fn into_kline(self) -> Result<Kline> {
        let field = |value: &str, name: &str| -> Result<Decimal> {
            value.parse().map_err(|_| {
                Error::InvalidResponse(format!("kline {} is not a decimal: {:?}", name, value))
            })
        };
        Ok(Kline {
            open_time: self.0,
            open: field(&self.1, "open")?,
            high: field(&self.2, "high")?,
            low: field(&self.3, "low")?,
            close: field(&self.4, "close")?,
            volume: field(&self.5, "volume")?,
            close_time: self.6,
        })
    }
}

/// `GET /api/v3/ticker/price`.
#[derive(Debug, Deserialize, Clone)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// One asset line of `GET /api/v3/account`.
#[derive(Debug, Deserialize, Clone)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// The parts of the spot account we use.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub balances: Vec<AssetBalance>,
}

/// A fill from `GET /api/v3/myTrades`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub price: Decimal,
    pub qty: Decimal,
    pub is_buyer: bool,
    /// Fill time, milliseconds since the epoch.
    pub time: i64,
}

/// A non-quote asset held in the account, valued against its fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub asset: String,
    pub symbol: Symbol,
    pub free: f64,
    pub locked: f64,
    pub total: f64,
    /// Volume-weighted price of every buy fill.
    pub average_price: Option<f64>,
    /// Average cost of what is still held, after sells.
    pub cost_price: Option<f64>,
}

impl Holding {
    /// Quote currency spent on the current quantity at the average price.
    pub fn invested(&self) -> Option<f64> {
        self.average_price.map(|avg| avg * self.total)
    }

    /// The free quantity as a position priced at `current_price`.
    pub fn to_position(&self, current_price: f64) -> Option<Position> {
        let average_price = self.average_price.filter(|p| *p > 0.0)?;
        Some(Position {
            symbol: self.symbol.clone(),
            quantity: self.free,
            average_price,
            current_price,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub status: String,
    pub side: String,       // "BUY" or "SELL"
    pub r#type: String,     // "MARKET", "LIMIT", etc.
    pub executed_qty: Decimal,
    /// Quote asset spent or received (Binance's spelling).
    pub cummulative_quote_qty: Decimal,
}

impl NewOrderResponse {
    /// Average fill price, when anything was filled.
    pub fn avg_price(&self) -> Option<Decimal> {
        (!self.executed_qty.is_zero()).then(|| self.cummulative_quote_qty / self.executed_qty)
    }
}
