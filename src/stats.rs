use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::VecDeque;

/// Number of standard deviations a value may stray from its mean before it
/// counts as an outlier.
pub const OUTLIER_SIGMAS: f64 = 2.0;

/// Streaming mean and sample standard deviation (Welford update).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    /// Sample standard deviation, `None` with fewer than two values.
    pub std_dev: Option<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                Some((self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt())
            } else {
                None
            },
        }
    }
}

/// Trailing mean over a fixed span of elapsed time.
///
/// Values must be pushed in non-decreasing time order. A value pushed at `t`
/// stays in the window while the newest time is before `t + span`.
pub struct RollingMean {
    span: Duration,
    window: VecDeque<(NaiveDateTime, f64)>,
    sum: f64,
}

impl RollingMean {
    pub fn new(span: Duration) -> Self {
        Self {
            span,
            window: VecDeque::new(),
            sum: 0.0,
        }
    }

    /// Push a value and return the mean of the window ending at `time`.
    pub fn push(&mut self, time: NaiveDateTime, val: f64) -> f64 {
        self.window.push_back((time, val));
        self.sum += val;

        // No lower bound near the start of the calendar.
        let lower = time.checked_sub_signed(self.span);
        while let Some(&(oldest, old_val)) = self.window.front() {
            if lower.is_none_or(|lower| oldest > lower) {
                break;
            }
            self.window.pop_front();
            self.sum -= old_val;
        }

        // Resync the running sum.
        if self.window.len() == 1 {
            self.sum = val;
        }

        self.sum / self.window.len() as f64
    }
}

/// Two-sided test of `val` against `mean ± OUTLIER_SIGMAS * std_dev`.
///
/// An undefined standard deviation never flags a value.
pub fn is_outlier(val: f64, mean: f64, std_dev: Option<f64>) -> bool {
    match std_dev {
        Some(std_dev) if std_dev.is_finite() && mean.is_finite() => {
            let half_width = OUTLIER_SIGMAS * std_dev;
            val < mean - half_width || val > mean + half_width
        }
        _ => false,
    }
}
