// In crates/signals/src/lib.rs

//! Indicator computation and signal classification over closing-price series.
//!
//! Every function in this crate is pure: it takes a chronological slice of
//! closes (oldest first) and returns a value or an explicit [`Error`]. Nothing
//! here performs I/O or keeps state between calls, except [`IndicatorState`],
//! which is an explicit incremental alternative to the batch functions.

use core_types::Kline;
use num_traits::cast::ToPrimitive;

pub mod averaging;
pub mod bollinger;
pub mod engine;
pub mod error;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod stoch_rsi;
pub mod types;

// Re-export public types
pub use averaging::{RollingEma, ema, sma};
pub use bollinger::{BandPoint, bollinger_bands, percent_b};
pub use engine::{SignalEngine, round_to};
pub use error::{Error, Result};
pub use macd::{MacdOutput, macd, macd_line};
pub use rolling::IndicatorState;
pub use rsi::{RollingRsi, rsi};
pub use stoch_rsi::stoch_rsi;
pub use types::{IndicatorSnapshot, PredictionResult, SignalSettings};

/// Extracts the close prices of a kline history, oldest first.
///
/// Every close must convert to a finite, strictly positive `f64`.
pub fn closes_from_klines(klines: &[Kline]) -> Result<Vec<f64>> {
    klines
        .iter()
        .map(|k| match k.close.to_f64() {
            Some(close) if close.is_finite() && close > 0.0 => Ok(close),
            _ => Err(Error::InvalidInput(format!(
                "close {} of kline opened at {} is not a positive price",
                k.close, k.open_time
            ))),
        })
        .collect()
}
