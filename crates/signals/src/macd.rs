// In crates/signals/src/macd.rs

use crate::averaging::{RollingEma, ema};
use crate::{Error, Result};
use serde::Serialize;
use ta::Next;

/// The latest values of the MACD oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line at every position: `ema(prefix, short) - ema(prefix, long)`.
///
/// Uses [`RollingEma`], so each entry equals the per-prefix recomputation exactly
/// while costing O(n) instead of O(n²).
pub fn macd_line(closes: &[f64], short_period: usize, long_period: usize) -> Vec<f64> {
    let mut short = RollingEma::new(short_period);
    let mut long = RollingEma::new(long_period);
    closes
        .iter()
        .map(|&close| short.next(close) - long.next(close))
        .collect()
}

/// MACD line, signal line and histogram of the latest close.
///
/// The signal line is the EMA of the full MACD-line series; the histogram is
/// `macd - signal`. Short series are not rejected: the EMAs degrade to SMAs.
pub fn macd(
    closes: &[f64],
    short_period: usize,
    long_period: usize,
    signal_period: usize,
) -> Result<MacdOutput> {
    let line = macd_line(closes, short_period, long_period);
    let Some(&last) = line.last() else {
        return Err(Error::InsufficientData {
            indicator: "MACD",
            have: 0,
            need: 1,
        });
    };

    let signal = ema(&line, signal_period);
    Ok(MacdOutput {
        macd: last,
        signal,
        histogram: last - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_series_is_rejected() {
        assert!(matches!(
            macd(&[], 12, 26, 9),
            Err(Error::InsufficientData { have: 0, need: 1, .. })
        ));
    }

    #[test]
    fn line_matches_per_prefix_recomputation() {
        let closes: Vec<f64> = (0..50).map(|i| 50.0 + (i as f64 * 0.4).cos() * 3.0).collect();
        let line = macd_line(&closes, 12, 26);
        for (i, value) in line.iter().enumerate() {
            let prefix = &closes[..=i];
            assert_eq!(*value, ema(prefix, 12) - ema(prefix, 26));
        }
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let out = macd(&closes, 12, 26, 9).unwrap();
        assert!(out.macd > 0.0);
    }

    #[test]
    fn single_close_degrades_to_zero_line() {
        let out = macd(&[42.0], 12, 26, 9).unwrap();
        assert_eq!(out.macd, 0.0);
        assert_eq!(out.signal, 0.0);
        assert_eq!(out.histogram, 0.0);
    }

    proptest! {
        #[test]
        fn histogram_is_exactly_line_minus_signal(
            closes in prop::collection::vec(1.0f64..1_000.0, 1..150),
        ) {
            let out = macd(&closes, 12, 26, 9).unwrap();
            prop_assert_eq!(out.histogram, out.macd - out.signal);
        }
    }
}
