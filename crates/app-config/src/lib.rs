// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AppSettings, BinanceSettings, Settings, TelegramSettings, TradingSettings, Watchlist,
};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP__BINANCE__API_KEY=...`, `APP__TRADING__THRESHOLDS__MIN_QUANTITY=2`
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}

/// Loads the scan watchlist from `config/watchlist.toml`.
pub fn load_watchlist() -> Result<Watchlist> {
    load_watchlist_from("config/watchlist.toml")
}

pub fn load_watchlist_from(path: impl AsRef<Path>) -> Result<Watchlist> {
    let content = std::fs::read_to_string(path)?;
    parse_watchlist(&content)
}

fn parse_watchlist(content: &str) -> Result<Watchlist> {
    let watchlist: Watchlist = toml::from_str(content)?;
    Ok(watchlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchlist_symbols_are_uppercased() {
        let watchlist = parse_watchlist(
            r#"
            interval = "1h"
            symbols = ["btcusdt", "ETHUSDT"]
            "#,
        )
        .unwrap();
        assert_eq!(watchlist.interval.as_deref(), Some("1h"));
        let symbols: Vec<String> = watchlist.symbols().into_iter().map(|s| s.0).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn malformed_watchlist_is_a_toml_error() {
        assert!(matches!(
            parse_watchlist("symbols = 3"),
            Err(Error::TomlError(_))
        ));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [app]
                environment = "test"
                log_level = "debug"

                [binance]
                api_key = "k"
                secret_key = "s"
                rest_base_url = "https://api.binance.com"

                [telegram]
                bot_token = "t"
                chat_id = "1"

                [trading.thresholds]
                min_quantity = 2.0
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.trading.interval, "4h");
        assert_eq!(settings.trading.check_interval_secs, 300);
        assert_eq!(settings.trading.thresholds.min_quantity, 2.0);
        assert_eq!(settings.trading.thresholds.percent_threshold_sell, 15.0);
        assert_eq!(settings.signals.min_closes, 60);
        assert_eq!(settings.dca.reduction_targets, vec![30.0, 50.0, 80.0, 0.0]);
        assert_eq!(settings.telegram.api_base_url, "https://api.telegram.org");
    }
}
