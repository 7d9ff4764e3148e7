// SPDX-License-Identifier: MIT
//! Delta computation between timestamped absolute counters.
//!
//! Kernel counters (jiffies, network bytes) only ever accumulate; rates are
//! derived from two samples. Sampling intervals are irregular, so every
//! derivation guards against non-positive deltas: a clock anomaly retains
//! the previous value instead of emitting garbage.

use std::time::Instant;

/// Aggregate CPU jiffie counters from the `cpu` line of `/proc/stat`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    #[must_use]
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Converts successive jiffie samples into a utilization percentage.
///
/// Utilization is `1 - Δidle/Δtotal`, scaled to 0..=100. The first sample
/// seeds the baseline and reports the (zero) previous value; a non-positive
/// total delta retains the previous value.
pub struct CpuUtilTracker {
    prev: Option<CpuTimes>,
    last_pct: f64,
}

impl CpuUtilTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prev: None,
            last_pct: 0.0,
        }
    }

    pub fn update(&mut self, current: CpuTimes) -> f64 {
        let Some(prev) = self.prev.replace(current) else {
            return self.last_pct;
        };
        let total_delta = current.total().saturating_sub(prev.total());
        if total_delta == 0 {
            return self.last_pct;
        }
        let idle_delta = current.idle_total().saturating_sub(prev.idle_total());
        #[allow(clippy::cast_precision_loss)]
        let pct = (1.0 - idle_delta as f64 / total_delta as f64) * 100.0;
        self.last_pct = pct.clamp(0.0, 100.0);
        self.last_pct
    }

    #[must_use]
    pub fn current(&self) -> f64 {
        self.last_pct
    }
}

impl Default for CpuUtilTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a monotonically increasing byte counter into a bytes/sec rate.
///
/// Counter regression (reboot, wrap) clamps the delta to zero; a
/// non-positive wall-clock delta retains the previous rate.
pub struct CounterRate {
    prev: Option<(u64, Instant)>,
    last_rate: f64,
}

impl CounterRate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prev: None,
            last_rate: 0.0,
        }
    }

    pub fn update(&mut self, value: u64, at: Instant) -> f64 {
        let Some((prev_value, prev_at)) = self.prev.replace((value, at)) else {
            return self.last_rate;
        };
        let Some(elapsed) = at.checked_duration_since(prev_at) else {
            return self.last_rate;
        };
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return self.last_rate;
        }
        #[allow(clippy::cast_precision_loss)]
        let delta = value.saturating_sub(prev_value) as f64;
        self.last_rate = delta / secs;
        self.last_rate
    }

    #[must_use]
    pub fn current(&self) -> f64 {
        self.last_rate
    }
}

impl Default for CounterRate {
    fn default() -> Self {
        Self::new()
    }
}

/// Running maximum of an observed rate. Never decreases; reset only by
/// process restart.
#[derive(Default)]
pub struct Peak {
    max: f64,
}

impl Peak {
    pub fn observe(&mut self, rate: f64) {
        if rate > self.max {
            self.max = rate;
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sampler::history::HistoryBuffer;

    const HISTORY_TEST_CAP: usize = 300;

    fn jiffies(busy: u64, idle: u64) -> CpuTimes {
        CpuTimes {
            user: busy,
            idle,
            ..CpuTimes::default()
        }
    }

    #[test]
    fn utilization_matches_closed_form() {
        let mut tracker = CpuUtilTracker::new();
        assert!(tracker.update(jiffies(0, 0)).abs() < f64::EPSILON);

        // 25 busy jiffies out of 100 elapsed.
        let pct = tracker.update(jiffies(25, 75));
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_delta_retains_previous() {
        let mut tracker = CpuUtilTracker::new();
        tracker.update(jiffies(0, 0));
        let pct = tracker.update(jiffies(40, 60));
        assert!((pct - 40.0).abs() < 1e-9);

        // Identical counters: no elapsed jiffies, previous value survives.
        let retained = tracker.update(jiffies(40, 60));
        assert!((retained - 40.0).abs() < 1e-9);
        assert!((tracker.current() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn first_sample_seeds_baseline_only() {
        let mut tracker = CpuUtilTracker::new();
        let pct = tracker.update(jiffies(1000, 1000));
        assert!(pct.abs() < f64::EPSILON);
    }

    #[test]
    fn three_frame_scenario_fills_history() {
        let mut tracker = CpuUtilTracker::new();
        let mut history = HistoryBuffer::new(HISTORY_TEST_CAP);
        tracker.update(jiffies(0, 0));

        // Idle deltas 90/100, 50/100, 10/100 over cumulative counters.
        let frames = [jiffies(10, 90), jiffies(60, 140), jiffies(150, 150)];
        for frame in frames {
            history.push(tracker.update(frame));
        }

        let observed: Vec<f64> = history.iter().copied().collect();
        assert_eq!(observed.len(), 3);
        for (value, expected) in observed.iter().zip([10.0, 50.0, 90.0]) {
            assert!((value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn counter_rate_closed_form() {
        let mut rate = CounterRate::new();
        let t0 = Instant::now();
        rate.update(1000, t0);

        let t1 = t0 + Duration::from_secs(2);
        let value = rate.update(5000, t1);
        assert!((value - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn counter_rate_zero_elapsed_retains_previous() {
        let mut rate = CounterRate::new();
        let t0 = Instant::now();
        rate.update(0, t0);
        let t1 = t0 + Duration::from_secs(1);
        rate.update(4096, t1);

        let retained = rate.update(9999, t1);
        assert!((retained - 4096.0).abs() < 1e-9);
    }

    #[test]
    fn counter_regression_yields_zero() {
        let mut rate = CounterRate::new();
        let t0 = Instant::now();
        rate.update(10_000, t0);

        let value = rate.update(100, t0 + Duration::from_secs(1));
        assert!(value.abs() < f64::EPSILON);
    }

    #[test]
    fn peak_never_decreases() {
        let mut peak = Peak::default();
        peak.observe(900.0);
        for rate in [800.0, 500.0, 100.0, 0.0] {
            peak.observe(rate);
            assert!((peak.value() - 900.0).abs() < f64::EPSILON);
        }
        peak.observe(950.0);
        assert!((peak.value() - 950.0).abs() < f64::EPSILON);
    }
}
