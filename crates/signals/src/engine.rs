// In crates/signals/src/engine.rs

use crate::averaging::ema;
use crate::bollinger::percent_b;
use crate::macd::macd;
use crate::rolling::IndicatorState;
use crate::rsi::rsi;
use crate::stoch_rsi::stoch_rsi;
use crate::types::{IndicatorSnapshot, PredictionResult, SignalSettings};
use crate::{Error, Result};
use core_types::Signal;

/// Combines the oscillators into a BUY/SELL/HOLD verdict and a next-price estimate.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    settings: SignalSettings,
}

impl SignalEngine {
    pub fn new(settings: SignalSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SignalSettings {
        &self.settings
    }

    /// Latest unrounded value of every indicator.
    pub fn snapshot(&self, closes: &[f64]) -> Result<IndicatorSnapshot> {
        let s = &self.settings;
        if closes.len() < s.min_closes {
            return Err(Error::InsufficientData {
                indicator: "signal engine",
                have: closes.len(),
                need: s.min_closes,
            });
        }

        let trend = macd(
            closes,
            s.macd_fast_period,
            s.macd_slow_period,
            s.macd_signal_period,
        )?;

        Ok(IndicatorSnapshot {
            short_ema: ema(closes, s.short_ema_period),
            long_ema: ema(closes, s.long_ema_period),
            macd: trend.macd,
            macd_signal: trend.signal,
            histogram: trend.histogram,
            rsi: rsi(closes, s.rsi_period)?,
            stoch_rsi: stoch_rsi(closes, s.rsi_period, s.stoch_period, s.stoch_smoothing)?,
            percent_b: percent_b(closes, s.bollinger_period, s.bollinger_std)?,
        })
    }

    /// Runs the full pipeline over a close history, oldest first.
    pub fn predict(&self, closes: &[f64]) -> Result<PredictionResult> {
        let snapshot = self.snapshot(closes)?;
        let n = closes.len();
        Ok(self.build_result(&snapshot, closes[n - 1], closes[n - 2]))
    }

    /// Builds a prediction from the latest snapshot of an incremental state.
    pub fn predict_from_state(&self, state: &IndicatorState) -> Result<PredictionResult> {
        let (Some(snapshot), Some((previous, current))) = (state.snapshot(), state.last_two())
        else {
            return Err(Error::InsufficientData {
                indicator: "signal engine",
                have: state.count(),
                need: self.settings.min_closes,
            });
        };
        Ok(self.build_result(snapshot, current, previous))
    }

    /// Applies the classification rules to a snapshot.
    pub fn classify(&self, snapshot: &IndicatorSnapshot) -> Signal {
        let s = &self.settings;

        // An absent %B never confirms.
        let band_confirms = |check: fn(f64, f64) -> bool, level: f64| {
            !s.require_bollinger_confirmation
                || snapshot.percent_b.is_some_and(|b| check(b, level))
        };

        let bullish = snapshot.short_ema > snapshot.long_ema
            && snapshot.macd > snapshot.macd_signal
            && snapshot.stoch_rsi < s.stoch_oversold
            && band_confirms(|b, l| b < l, s.bollinger_lower);
        if bullish {
            return Signal::Buy;
        }

        let bearish = snapshot.short_ema < snapshot.long_ema
            && snapshot.macd < snapshot.macd_signal
            && snapshot.stoch_rsi > s.stoch_overbought
            && band_confirms(|b, l| b > l, s.bollinger_upper);
        if bearish {
            return Signal::Sell;
        }

        Signal::Hold
    }

    fn build_result(&self, snapshot: &IndicatorSnapshot, current: f64, previous: f64) -> PredictionResult {
        // --- Next-price extrapolation ---
        let momentum = (current - previous) / previous * 100.0;
        let predicted = current * (1.0 + momentum / 200.0);
        let change_pct = (predicted - current) / current * 100.0;

        PredictionResult {
            next_price: round_to(predicted, 2),
            change_pct: round_to(change_pct, 2),
            signal: self.classify(snapshot),
            short_ema: round_to(snapshot.short_ema, 2),
            long_ema: round_to(snapshot.long_ema, 2),
            macd: round_to(snapshot.macd, 3),
            macd_signal: round_to(snapshot.macd_signal, 3),
            histogram: round_to(snapshot.histogram, 3),
            rsi: snapshot.rsi.map(|v| round_to(v, 3)),
            stoch_rsi: round_to(snapshot.stoch_rsi, 3),
            percent_b: snapshot.percent_b.map(|v| round_to(v, 3)),
            day_high: None,
            day_low: None,
        }
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
