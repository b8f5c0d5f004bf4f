// In crates/api-client/src/lib.rs

use app_config::types::BinanceSettings;
use chrono::Utc;
use core_types::{Kline, Side, Symbol};
use hmac::{Hmac, Mac};
use num_traits::ToPrimitive;
use reqwest::RequestBuilder;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod cost_basis;
pub mod error;
pub mod types;

// Re-export public types
pub use cost_basis::{CostBasis, compute_cost_basis};
pub use error::{Error, Result};
pub use types::*;

/// Balances at or below this are dust and are not reported.
const DUST_THRESHOLD: f64 = 0.01;
/// Fills fetched per symbol for cost-basis bookkeeping.
const TRADE_HISTORY_LIMIT: u16 = 500;

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Generates an HMAC-SHA256 signature for a given query string.
    ///
    /// # Returns
    ///
    /// A hexadecimal string representation of the signature.
    fn sign(&self, query_string: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Appends the timestamp and the signature to `params`.
    fn create_signed_query(&self, params: &mut String) {
        let timestamp = Utc::now().timestamp_millis();

        if !params.is_empty() {
            params.push('&');
        }
        params.push_str(&format!("timestamp={}", timestamp));

        let signature = self.sign(params);
        params.push_str(&format!("&signature={}", signature));
    }

    /// Sends a request and decodes the body, surfacing Binance error objects.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(Error::RequestFailed)?;
        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;
        decode_response(status.as_u16(), &text)
    }

    async fn signed_get<T: DeserializeOwned>(&self, path: &str, mut params: String) -> Result<T> {
        self.create_signed_query(&mut params);
        let url = format!("{}{}?{}", self.base_url, path, params);
        let request = self.http_client.get(&url).header("X-MBX-APIKEY", &self.api_key);
        self.send(request).await
    }

    /// Fetches historical kline (candlestick) data, oldest first.
    ///
    /// This corresponds to the `GET /api/v3/klines` endpoint.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "1m", "4h", "1d").
    /// * `limit`: Optional number of klines to return (max 1000, default 500).
    pub async fn get_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: Option<u16>,
    ) -> Result<Vec<Kline>> {
        let mut params = format!("symbol={}&interval={}", symbol.0, interval);
        if let Some(l) = limit {
            params.push_str(&format!("&limit={}", l));
        }
        let url = format!("{}/api/v3/klines?{}", self.base_url, params);

        let raw_klines: Vec<RawKline> = self.send(self.http_client.get(&url)).await?;
        raw_klines.into_iter().map(RawKline::into_kline).collect()
    }

    /// Latest traded price. `GET /api/v3/ticker/price`.
    pub async fn get_price(&self, symbol: &Symbol) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol.0);
        let ticker: TickerPrice = self.send(self.http_client.get(&url)).await?;
        Ok(ticker.price)
    }

    /// Spot balances. `GET /api/v3/account` (signed).
    pub async fn get_account_info(&self) -> Result<AccountInfo> {
        self.signed_get("/api/v3/account", String::new()).await
    }

    /// The account's fills for a symbol, oldest first. `GET /api/v3/myTrades` (signed).
    pub async fn get_trade_history(&self, symbol: &Symbol, limit: Option<u16>) -> Result<Vec<Trade>> {
        let mut params = format!("symbol={}", symbol.0);
        if let Some(l) = limit {
            params.push_str(&format!("&limit={}", l));
        }
        let mut trades: Vec<Trade> = self.signed_get("/api/v3/myTrades", params).await?;
        trades.sort_by_key(|t| t.time);
        Ok(trades)
    }

    /// Every non-dust asset except `quote_asset`, with its cost basis against
    /// the `<ASSET><QUOTE>` pair.
    ///
    /// A holding whose history cannot be priced is still returned, without an
    /// average price.
    pub async fn get_holdings(&self, quote_asset: &str) -> Result<Vec<Holding>> {
        let account = self.get_account_info().await?;
        let mut holdings = Vec::new();

        for balance in account.balances {
            let free = balance.free.to_f64().unwrap_or(0.0);
            let locked = balance.locked.to_f64().unwrap_or(0.0);
            let total = free + locked;
            if total <= DUST_THRESHOLD || balance.asset == quote_asset {
                continue;
            }

            let symbol = Symbol::from_asset(&balance.asset, quote_asset);
            let basis = self
                .get_trade_history(&symbol, Some(TRADE_HISTORY_LIMIT))
                .await
                .and_then(|trades| compute_cost_basis(&symbol.0, &trades));
            let (average_price, cost_price) = match basis {
                Ok(basis) => (
                    basis.average_price.to_f64(),
                    basis.cost_price.and_then(|c| c.to_f64()),
                ),
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Cannot compute buy price");
                    (None, None)
                }
            };

            holdings.push(Holding {
                asset: balance.asset,
                symbol,
                free,
                locked,
                total,
                average_price,
                cost_price,
            });
        }

        Ok(holdings)
    }

    /// Places a new market order.
    /// Corresponds to `POST /api/v3/order`.
    pub async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
    ) -> Result<NewOrderResponse> {
        let mut params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}",
            symbol.0,
            side.as_str(),
            quantity.round_dp(6).normalize()
        );
        self.create_signed_query(&mut params);

        let url = format!("{}/api/v3/order", self.base_url);
        let request = self
            .http_client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(params);

        let order: NewOrderResponse = self.send(request).await?;
        tracing::info!(
            symbol = %symbol,
            side = %side,
            order_id = order.order_id,
            status = %order.status,
            "Order placed"
        );
        Ok(order)
    }
}

/// Binance reports failures as `{"code": -1121, "msg": "..."}`, sometimes with a
/// 200 status; anything else non-2xx is an invalid response.
fn decode_response<T: DeserializeOwned>(status: u16, text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        if (200..300).contains(&status) {
            Error::DeserializationFailed(e)
        } else {
            Error::InvalidResponse(format!("HTTP {}: {}", status, text))
        }
    })?;

    if let Some(code) = value.get("code").and_then(Value::as_i64) {
        if code != 0 {
            let msg = value
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(Error::ApiError { code, msg });
        }
    }
    if !(200..300).contains(&status) {
        return Err(Error::InvalidResponse(format!("HTTP {}: {}", status, text)));
    }

    serde_json::from_value(value).map_err(Error::DeserializationFailed)
}
