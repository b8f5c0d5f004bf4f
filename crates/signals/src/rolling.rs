// In crates/signals/src/rolling.rs

use crate::averaging::RollingEma;
use crate::bollinger::band_point;
use crate::rsi::{RollingRsi, rsi};
use crate::stoch_rsi::{raw_stoch, smooth};
use crate::types::{IndicatorSnapshot, SignalSettings};
use crate::Result;
use std::collections::VecDeque;
use ta::{Next, Reset};

/// Incremental form of [`SignalEngine::snapshot`](crate::SignalEngine::snapshot).
///
/// Feed closes one at a time. Once `min_closes` closes have been seen, every call
/// yields the snapshot the batch pipeline would compute over the same prefix,
/// at a per-update cost bounded by the indicator windows instead of the history.
#[derive(Debug, Clone)]
pub struct IndicatorState {
    settings: SignalSettings,
    short_ema: RollingEma,
    long_ema: RollingEma,
    macd_fast: RollingEma,
    macd_slow: RollingEma,
    macd_signal: RollingEma,
    rsi: RollingRsi,
    /// Trailing closes, enough for one RSI window and one Bollinger window.
    closes: VecDeque<f64>,
    close_capacity: usize,
    /// Latest `stoch_period` window RSI readings.
    rsi_points: VecDeque<f64>,
    /// Latest raw stochastic values, as many as the smoothing needs.
    raw_stoch: VecDeque<f64>,
    raw_capacity: usize,
    count: usize,
    latest: Option<IndicatorSnapshot>,
}

impl IndicatorState {
    pub fn new(settings: SignalSettings) -> Result<Self> {
        settings.validate()?;
        let close_capacity = (settings.rsi_period + 1).max(settings.bollinger_period + 1);
        let raw_capacity = settings.stoch_smoothing.max(1);
        Ok(Self {
            short_ema: RollingEma::new(settings.short_ema_period),
            long_ema: RollingEma::new(settings.long_ema_period),
            macd_fast: RollingEma::new(settings.macd_fast_period),
            macd_slow: RollingEma::new(settings.macd_slow_period),
            macd_signal: RollingEma::new(settings.macd_signal_period),
            rsi: RollingRsi::new(settings.rsi_period),
            closes: VecDeque::with_capacity(close_capacity),
            close_capacity,
            rsi_points: VecDeque::with_capacity(settings.stoch_period),
            raw_stoch: VecDeque::with_capacity(raw_capacity),
            raw_capacity,
            count: 0,
            latest: None,
            settings,
        })
    }

    /// Feeds one close and returns the snapshot once enough history exists.
    pub fn push(&mut self, close: f64) -> Option<IndicatorSnapshot> {
        self.count += 1;

        // --- Trend ---
        let short_ema = self.short_ema.next(close);
        let long_ema = self.long_ema.next(close);
        let line = self.macd_fast.next(close) - self.macd_slow.next(close);
        let macd_signal = self.macd_signal.next(line);

        // --- Momentum ---
        let rsi_value = self.rsi.next(close);

        push_bounded(&mut self.closes, close, self.close_capacity);
        self.update_stoch();

        // --- Emit ---
        let s = &self.settings;
        let ready = self.count >= s.min_closes
            && self.count > s.bollinger_period
            && self.rsi.is_ready()
            && !self.raw_stoch.is_empty();
        if !ready {
            self.latest = None;
            return None;
        }

        let last = self.closes.len() - 1;
        let window = self.closes.range(last - s.bollinger_period..last);
        let bands = band_point(window, close, s.bollinger_std);

        let snapshot = IndicatorSnapshot {
            short_ema,
            long_ema,
            macd: line,
            macd_signal,
            histogram: line - macd_signal,
            rsi: rsi_value,
            stoch_rsi: smooth(&self.raw_stoch, s.stoch_smoothing),
            percent_b: bands.percent_b,
        };
        self.latest = Some(snapshot);
        self.latest
    }

    /// Window RSI of the newest `rsi_period + 1` closes, then a new raw stochastic value.
    fn update_stoch(&mut self) {
        let window_len = self.settings.rsi_period + 1;
        if self.closes.len() < window_len {
            return;
        }
        let closes = self.closes.make_contiguous();
        let window = &closes[closes.len() - window_len..];
        let Ok(Some(point)) = rsi(window, self.settings.rsi_period) else {
            return;
        };

        push_bounded(&mut self.rsi_points, point, self.settings.stoch_period);
        if self.rsi_points.len() == self.settings.stoch_period {
            let raw = raw_stoch(self.rsi_points.make_contiguous());
            push_bounded(&mut self.raw_stoch, raw, self.raw_capacity);
        }
    }

    /// The snapshot produced by the latest `push`, if any.
    pub fn snapshot(&self) -> Option<&IndicatorSnapshot> {
        self.latest.as_ref()
    }

    /// `(previous, current)` closes.
    pub fn last_two(&self) -> Option<(f64, f64)> {
        let n = self.closes.len();
        (n >= 2).then(|| (self.closes[n - 2], self.closes[n - 1]))
    }

    /// Number of closes fed since creation or the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn settings(&self) -> &SignalSettings {
        &self.settings
    }
}

fn push_bounded(buf: &mut VecDeque<f64>, value: f64, capacity: usize) {
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(value);
}

impl Next<f64> for IndicatorState {
    type Output = Option<IndicatorSnapshot>;

    fn next(&mut self, close: f64) -> Self::Output {
        self.push(close)
    }
}

impl Reset for IndicatorState {
    fn reset(&mut self) {
        self.short_ema.reset();
        self.long_ema.reset();
        self.macd_fast.reset();
        self.macd_slow.reset();
        self.macd_signal.reset();
        self.rsi.reset();
        self.closes.clear();
        self.rsi_points.clear();
        self.raw_stoch.clear();
        self.count = 0;
        self.latest = None;
    }
}
