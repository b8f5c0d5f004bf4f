// In crates/signals/src/stoch_rsi.rs

use crate::rsi::rsi;
use crate::{Error, Result};

/// Stochastic RSI of the latest close, on a 0–1 scale.
///
/// 1. Build an RSI series from every trailing window of `rsi_period + 1` closes.
///    Windows whose RSI is absent are skipped; genuine zero readings are kept.
/// 2. For every trailing `stoch_period` window of that series compute
///    `(latest - min) / (max - min)`, clamped to [0, 1] (0 when the window is flat).
/// 3. Return the trailing SMA of the last `smoothing` raw values, or the last raw
///    value when fewer exist, clamped to [0, 1].
pub fn stoch_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    smoothing: usize,
) -> Result<f64> {
    if rsi_period == 0 || stoch_period == 0 {
        return Err(Error::InvalidInput(format!(
            "StochRSI periods must be greater than 0 (rsi={}, stoch={})",
            rsi_period, stoch_period
        )));
    }
    let need = rsi_period + stoch_period;
    if closes.len() < need {
        return Err(Error::InsufficientData {
            indicator: "StochRSI",
            have: closes.len(),
            need,
        });
    }

    let rsi_points = rsi_series(closes, rsi_period);
    if rsi_points.len() < stoch_period {
        return Err(Error::InsufficientData {
            indicator: "StochRSI window",
            have: rsi_points.len(),
            need: stoch_period,
        });
    }

    let raw: Vec<f64> = rsi_points.windows(stoch_period).map(raw_stoch).collect();
    Ok(smooth(&raw, smoothing))
}

/// RSI of each trailing window of `period + 1` closes, skipping absent readings.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let window = period + 1;
    if closes.len() < window {
        return Vec::new();
    }
    (window..=closes.len())
        .filter_map(|end| rsi(&closes[end - window..end], period).ok().flatten())
        .collect()
}

/// Position of the window's latest value inside its own range.
pub(crate) fn raw_stoch(window: &[f64]) -> f64 {
    let latest = window[window.len() - 1];
    let (mut min, mut max) = (window[0], window[0]);
    for &v in window {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if max == min {
        return 0.0;
    }
    ((latest - min) / (max - min)).clamp(0.0, 1.0)
}

/// Trailing SMA over the last `smoothing` raw values.
pub(crate) fn smooth<'a, I>(raw: I, smoothing: usize) -> f64
where
    I: IntoIterator<Item = &'a f64>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let raw = raw.into_iter();
    let len = raw.len();
    if smoothing == 0 || len < smoothing {
        // Unsmoothed; raw values are already within [0, 1].
        return raw.last().copied().unwrap_or(0.0);
    }
    let mut sum = 0.0;
    for v in raw.skip(len - smoothing) {
        sum += v;
    }
    (sum / smoothing as f64).clamp(0.0, 1.0)
}
