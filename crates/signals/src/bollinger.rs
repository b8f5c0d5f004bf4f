// In crates/signals/src/bollinger.rs

use crate::{Error, Result};
use serde::Serialize;

/// Bollinger bands for one close, computed from the `period` closes before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(close - lower) / (upper - lower)`; `None` when the bands have zero width.
    /// Not clamped: values above 1 or below 0 mean the close is outside the bands.
    pub percent_b: Option<f64>,
}

/// Bands and %B for every close.
///
/// Index `i` is computed from `closes[i - period..i]` (population standard
/// deviation); indices before `period` have no value.
pub fn bollinger_bands(closes: &[f64], period: usize, num_std: f64) -> Vec<Option<BandPoint>> {
    let mut points = vec![None; closes.len()];
    if period == 0 {
        return points;
    }
    for i in period..closes.len() {
        points[i] = Some(band_point(&closes[i - period..i], closes[i], num_std));
    }
    points
}

/// %B of the latest close.
pub fn percent_b(closes: &[f64], period: usize, num_std: f64) -> Result<Option<f64>> {
    if period == 0 {
        return Err(Error::InvalidInput(
            "Bollinger period must be greater than 0".to_string(),
        ));
    }
    let need = period + 1;
    if closes.len() < need {
        return Err(Error::InsufficientData {
            indicator: "Bollinger %B",
            have: closes.len(),
            need,
        });
    }
    let last = closes.len() - 1;
    Ok(band_point(&closes[last - period..last], closes[last], num_std).percent_b)
}

pub(crate) fn band_point<'a, I>(window: I, close: f64, num_std: f64) -> BandPoint
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut n = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for &c in window {
        n += 1;
        sum += c;
        sum_sq += c * c;
    }
    let n = n as f64;
    let mean = sum / n;
    // Cancellation can push the variance a hair below zero on flat windows.
    let stddev = (sum_sq / n - mean * mean).max(0.0).sqrt();
    let upper = mean + num_std * stddev;
    let lower = mean - num_std * stddev;
    let width = upper - lower;

    BandPoint {
        upper,
        middle: mean,
        lower,
        percent_b: (width > 0.0).then(|| (close - lower) / width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn oscillating(len: usize) -> Vec<f64> {
        (0..len).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect()
    }

    #[test]
    fn leading_indices_are_empty() {
        let points = bollinger_bands(&oscillating(25), 20, 2.0);
        assert!(points[..20].iter().all(Option::is_none));
        assert!(points[20..].iter().all(Option::is_some));
    }

    #[test]
    fn close_above_upper_band_is_not_clamped() {
        let mut closes = oscillating(20);
        closes.push(120.0);
        // mean 100.5, stddev 0.5 -> bands 99.5 / 101.5
        let value = percent_b(&closes, 20, 2.0).unwrap().unwrap();
        assert_relative_eq!(value, 10.25, epsilon = 1e-9);
        assert!(value > 1.0);
    }

    #[test]
    fn close_below_lower_band_goes_negative() {
        let mut closes = oscillating(20);
        closes.push(90.0);
        assert!(percent_b(&closes, 20, 2.0).unwrap().unwrap() < 0.0);
    }

    #[test]
    fn middle_close_reads_one_half() {
        let mut closes = oscillating(20);
        closes.push(100.5);
        assert_relative_eq!(percent_b(&closes, 20, 2.0).unwrap().unwrap(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn flat_window_has_no_percent_b() {
        let closes = vec![50.0; 21];
        let point = bollinger_bands(&closes, 20, 2.0)[20].unwrap();
        assert_eq!(point.upper, point.lower);
        assert_eq!(point.percent_b, None);
    }

    #[test]
    fn percent_b_needs_one_close_beyond_the_window() {
        assert_eq!(
            percent_b(&oscillating(20), 20, 2.0).unwrap_err(),
            Error::InsufficientData {
                indicator: "Bollinger %B",
                have: 20,
                need: 21
            }
        );
    }
}
