// In crates/app-config/src/types.rs

use core_types::Symbol;
use risk::types::{DcaSettings, ThresholdSettings};
use serde::Deserialize;
use signals::SignalSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Binance API.
    pub binance: BinanceSettings,
    /// Settings for the Telegram bot that receives reports.
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub signals: SignalSettings,
    #[serde(default)]
    pub dca: DcaSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Worker threads for the `scan` command; `None` lets rayon decide.
    #[serde(default)]
    pub scan_threads: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BinanceSettings {
    /// The API key for Binance.
    pub api_key: String,
    /// The secret key for Binance.
    pub secret_key: String,
    /// The REST API base URL for Binance.
    pub rest_base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_url")]
    pub api_base_url: String,
}

/// Everything that drives the periodic position check.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TradingSettings {
    /// Kline interval fed to the signal engine (e.g., "4h").
    pub interval: String,
    pub kline_limit: u16,
    /// Quote asset holdings are valued in.
    pub quote_asset: String,
    /// When false, orders are logged instead of sent.
    pub live_trading_enabled: bool,
    pub check_interval_secs: u64,
    /// Local wall-clock time of the daily summary, `HH:MM`.
    pub summary_time: String,
    pub thresholds: ThresholdSettings,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            interval: "4h".to_string(),
            kline_limit: 200,
            quote_asset: "USDT".to_string(),
            live_trading_enabled: false,
            check_interval_secs: 300,
            summary_time: "12:30".to_string(),
            thresholds: ThresholdSettings::default(),
        }
    }
}

// --- Structs for watchlist.toml ---

/// Symbols analysed by the `scan` command.
#[derive(Deserialize, Debug, Clone)]
pub struct Watchlist {
    /// Overrides `trading.interval` for the scan.
    #[serde(default)]
    pub interval: Option<String>,
    pub symbols: Vec<String>,
}

impl Watchlist {
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|s| Symbol(s.to_uppercase())).collect()
    }
}

fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}
