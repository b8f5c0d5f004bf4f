// In crates/signals/src/rsi.rs

use crate::{Error, Result};
use ta::{Next, Period, Reset};

/// Relative Strength Index over the whole series, using Wilder's smoothing.
///
/// The initial average gain/loss is taken over the first `period` deltas; every
/// later delta updates them with `avg = (avg * (period - 1) + current) / period`.
///
/// Returns `Ok(Some(100.0))` when there were no losses at all and `Ok(None)` when
/// the reading is not a finite number. A genuine floor reading is `Ok(Some(0.0))`.
pub fn rsi(closes: &[f64], period: usize) -> Result<Option<f64>> {
    if period == 0 {
        return Err(Error::InvalidInput(
            "RSI period must be greater than 0".to_string(),
        ));
    }
    let need = period + 1;
    if closes.len() < need {
        return Err(Error::InsufficientData {
            indicator: "RSI",
            have: closes.len(),
            need,
        });
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }
    let p = period as f64;
    let mut avg_gain = gain_sum / p;
    let mut avg_loss = loss_sum / p;

    for i in period + 1..closes.len() {
        let (gain, loss) = split_delta(closes[i] - closes[i - 1]);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
    }

    Ok(reading(avg_gain, avg_loss))
}

fn split_delta(delta: f64) -> (f64, f64) {
    if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) }
}

fn reading(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    value.is_finite().then_some(value)
}

/// Incremental Wilder RSI over an unbounded stream of closes.
///
/// After `n` closes the output equals `rsi(&closes[..n], period)` for `n > period`.
/// Before that the indicator is not ready and yields `None`.
#[derive(Debug, Clone)]
pub struct RollingRsi {
    period: usize,
    prev_close: Option<f64>,
    deltas: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: f64,
    avg_loss: f64,
}

impl RollingRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            deltas: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    /// True once `period + 1` closes have been seen.
    pub fn is_ready(&self) -> bool {
        self.period > 0 && self.deltas >= self.period
    }
}

impl Next<f64> for RollingRsi {
    type Output = Option<f64>;

    fn next(&mut self, close: f64) -> Option<f64> {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };
        if self.period == 0 {
            return None;
        }

        let delta = close - prev;
        self.deltas += 1;
        let p = self.period as f64;

        if self.deltas <= self.period {
            if delta > 0.0 {
                self.gain_sum += delta;
            } else {
                self.loss_sum += -delta;
            }
            if self.deltas < self.period {
                return None;
            }
            self.avg_gain = self.gain_sum / p;
            self.avg_loss = self.loss_sum / p;
        } else {
            let (gain, loss) = split_delta(delta);
            self.avg_gain = (self.avg_gain * (p - 1.0) + gain) / p;
            self.avg_loss = (self.avg_loss * (p - 1.0) + loss) / p;
        }

        reading(self.avg_gain, self.avg_loss)
    }
}

impl Reset for RollingRsi {
    fn reset(&mut self) {
        *self = Self::new(self.period);
    }
}

impl Period for RollingRsi {
    fn period(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn rejects_short_series() {
        let err = rsi(&[1.0, 2.0, 3.0], 14).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientData {
                indicator: "RSI",
                have: 3,
                need: 15
            }
        );
    }

    #[test]
    fn rejects_zero_period() {
        assert!(matches!(rsi(&[1.0, 2.0], 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn strictly_rising_series_is_exactly_100() {
        let closes: Vec<f64> = (1..=40).map(|i| 100.0 + i as f64 * 0.7).collect();
        assert_eq!(rsi(&closes, 14).unwrap(), Some(100.0));
    }

    #[test]
    fn strictly_falling_series_is_exactly_0() {
        let closes: Vec<f64> = (1..=40).map(|i| 500.0 - i as f64 * 3.0).collect();
        assert_eq!(rsi(&closes, 14).unwrap(), Some(0.0));
    }

    #[test]
    fn balanced_moves_sit_at_50() {
        let closes = [10.0, 11.0, 10.0, 11.0, 10.0];
        // Two gains of 1 and two losses of 1 over period 4.
        assert_relative_eq!(rsi(&closes, 4).unwrap().unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_reading_is_absent_not_zero() {
        let closes = [10.0, f64::NAN, 11.0];
        assert_eq!(rsi(&closes, 2).unwrap(), None);
    }

    #[test]
    fn rolling_rsi_is_not_ready_during_warmup() {
        let mut rolling = RollingRsi::new(3);
        assert_eq!(rolling.next(1.0), None);
        assert_eq!(rolling.next(2.0), None);
        assert_eq!(rolling.next(3.0), None);
        assert!(!rolling.is_ready());
        assert_eq!(rolling.next(4.0), Some(100.0));
        assert!(rolling.is_ready());
    }

    proptest! {
        #[test]
        fn rsi_stays_within_bounds(closes in prop::collection::vec(1.0f64..500.0, 15..120)) {
            let value = rsi(&closes, 14).unwrap().unwrap();
            prop_assert!((0.0..=100.0).contains(&value));
        }

        #[test]
        fn rolling_rsi_matches_batch(closes in prop::collection::vec(1.0f64..500.0, 2..80), period in 1usize..20) {
            let mut rolling = RollingRsi::new(period);
            for n in 1..=closes.len() {
                let incremental = rolling.next(closes[n - 1]);
                if n > period {
                    prop_assert_eq!(incremental, rsi(&closes[..n], period).unwrap());
                } else {
                    prop_assert_eq!(incremental, None);
                }
            }
        }
    }
}
