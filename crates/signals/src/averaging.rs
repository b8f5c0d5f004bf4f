// In crates/signals/src/averaging.rs

use ta::{Next, Period, Reset};

/// Arithmetic mean of all values. An empty slice averages to 0.
pub fn sma(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for v in values {
        sum += v;
    }
    sum / values.len() as f64
}

/// Exponential moving average of the whole series, returning only the final value.
///
/// The EMA is seeded with the SMA of the first `period` values and then follows
/// `ema = (value - ema) * k + ema` with `k = 2 / (period + 1)`. A series shorter
/// than `period` (or a zero period) degrades to the SMA of everything it has.
pub fn ema(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period {
        return sma(values);
    }

    let k = smoothing_factor(period);
    let mut ema = sma(&values[..period]);
    for &value in &values[period..] {
        ema = (value - ema) * k + ema;
    }
    ema
}

fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Incremental form of [`ema`].
///
/// After `n` calls to `next`, the returned value is exactly `ema(&values[..n], period)`:
/// the warm-up uses the same running sum as [`sma`] and the recurrence is applied
/// in the same order, so no rounding drift is introduced.
#[derive(Debug, Clone)]
pub struct RollingEma {
    period: usize,
    k: f64,
    count: usize,
    sum: f64,
    value: f64,
}

impl RollingEma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            k: smoothing_factor(period),
            count: 0,
            sum: 0.0,
            value: 0.0,
        }
    }

    /// The latest EMA value (0 before the first input).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of values fed so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Next<f64> for RollingEma {
    type Output = f64;

    fn next(&mut self, input: f64) -> f64 {
        self.count += 1;
        if self.period == 0 || self.count <= self.period {
            self.sum += input;
            self.value = self.sum / self.count as f64;
        } else {
            self.value = (input - self.value) * self.k + self.value;
        }
        self.value
    }
}

impl Reset for RollingEma {
    fn reset(&mut self) {
        self.count = 0;
        self.sum = 0.0;
        self.value = 0.0;
    }
}

impl Period for RollingEma {
    fn period(&self) -> usize {
        self.period
    }
}
