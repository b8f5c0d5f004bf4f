// In crates/signals/src/types.rs

use crate::{Error, Result};
use core_types::Signal;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the signal pipeline.
///
/// Missing keys in a config file fall back to [`SignalSettings::default`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SignalSettings {
    /// Shortest close history `predict` accepts.
    pub min_closes: usize,

    // Trend filter
    pub short_ema_period: usize,
    pub long_ema_period: usize,

    // MACD
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,

    // Oscillators
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub stoch_smoothing: usize,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,

    // Volatility bands
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub bollinger_lower: f64,
    pub bollinger_upper: f64,
    pub require_bollinger_confirmation: bool,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            min_closes: 60,
            short_ema_period: 7,
            long_ema_period: 20,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            rsi_period: 14,
            stoch_period: 14,
            stoch_smoothing: 3,
            stoch_oversold: 0.2,
            stoch_overbought: 0.8,
            bollinger_period: 20,
            bollinger_std: 2.0,
            bollinger_lower: 0.2,
            bollinger_upper: 0.8,
            require_bollinger_confirmation: true,
        }
    }
}

impl SignalSettings {
    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("short_ema_period", self.short_ema_period),
            ("long_ema_period", self.long_ema_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("rsi_period", self.rsi_period),
            ("stoch_period", self.stoch_period),
            ("bollinger_period", self.bollinger_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(Error::InvalidInput(format!("{} must be greater than 0", name)));
        }
        // Momentum needs the last two closes.
        if self.min_closes < 2 {
            return Err(Error::InvalidInput(format!(
                "min_closes must be at least 2, got {}",
                self.min_closes
            )));
        }
        if !self.bollinger_std.is_finite() || self.bollinger_std <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "bollinger_std must be a positive number, got {}",
                self.bollinger_std
            )));
        }
        Ok(())
    }
}

/// Latest value of every indicator, unrounded.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub short_ema: f64,
    pub long_ema: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub histogram: f64,
    pub rsi: Option<f64>,
    pub stoch_rsi: f64,
    pub percent_b: Option<f64>,
}

/// What the signal engine reports for one close history.
///
/// Price-like fields carry 2 decimals, oscillator and ratio fields 3.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub next_price: f64,
    pub change_pct: f64,
    pub signal: Signal,
    pub short_ema: f64,
    pub long_ema: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub histogram: f64,
    pub rsi: Option<f64>,
    pub stoch_rsi: f64,
    pub percent_b: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
}

impl PredictionResult {
    /// Attaches the current trading day's range, when the caller knows it.
    pub fn with_day_range(mut self, high: Option<f64>, low: Option<f64>) -> Self {
        self.day_high = high;
        self.day_low = low;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SignalSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_period_is_rejected_by_name() {
        let settings = SignalSettings {
            stoch_period: 0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidInput("stoch_period must be greater than 0".to_string())
        );
    }

    #[test]
    fn single_close_minimum_is_rejected() {
        let settings = SignalSettings {
            min_closes: 1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
