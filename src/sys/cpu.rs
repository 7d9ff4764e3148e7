// SPDX-License-Identifier: MIT
//! Aggregate CPU sampling: jiffie counters, core count, frequency.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use super::raw::{self, ProcFile};
use crate::sampler::delta::CpuTimes;

const STAT_PATH: &str = "/proc/stat";
const CPUINFO_PATH: &str = "/proc/cpuinfo";
const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

// Frequency churns slowly and the sysfs read is comparatively expensive.
const FREQ_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct CpuProbe {
    stat: ProcFile,
    cores: usize,
    freq_mhz: Option<f64>,
    last_freq_poll: Option<Instant>,
}

impl CpuProbe {
    /// Opens `/proc/stat` and determines the core count.
    ///
    /// # Errors
    ///
    /// Returns an error if `/proc/stat` cannot be opened or carries no
    /// aggregate line; there is nothing to monitor without CPU accounting,
    /// so callers treat this as fatal.
    pub fn new() -> Result<Self> {
        let mut stat = ProcFile::open(STAT_PATH)?;
        let (cores, has_aggregate) = {
            let content = stat.read()?;
            (count_cores(content), parse_aggregate(content).is_some())
        };
        if !has_aggregate {
            bail!("no aggregate cpu line in {STAT_PATH}");
        }
        let cores = if cores == 0 { default_core_count() } else { cores };
        Ok(Self {
            stat,
            cores,
            freq_mhz: None,
            last_freq_poll: None,
        })
    }

    /// Reads the current jiffie counters.
    ///
    /// # Errors
    ///
    /// Returns an error if `/proc/stat` cannot be re-read or has lost its
    /// aggregate line.
    pub fn sample(&mut self) -> Result<CpuTimes> {
        let content = self.stat.read()?;
        parse_aggregate(content).context("malformed /proc/stat")
    }

    #[must_use]
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// Current CPU frequency in MHz, re-polled at most every five seconds.
    pub fn frequency_mhz(&mut self, now: Instant) -> Option<f64> {
        let due = self
            .last_freq_poll
            .is_none_or(|at| now.duration_since(at) >= FREQ_POLL_INTERVAL);
        if due {
            self.freq_mhz = read_sysfs_freq_mhz(Path::new(CPUFREQ_DIR)).or_else(cpuinfo_freq_mhz);
            self.last_freq_poll = Some(now);
        }
        self.freq_mhz
    }
}

fn parse_aggregate(content: &str) -> Option<CpuTimes> {
    let line = content.lines().find(|l| l.starts_with("cpu "))?;
    let mut fields = line.split_whitespace().skip(1);
    let mut next = || fields.next()?.parse::<u64>().ok();
    Some(CpuTimes {
        user: next()?,
        nice: next()?,
        system: next()?,
        idle: next()?,
        iowait: next()?,
        irq: next()?,
        softirq: next()?,
        steal: next()?,
    })
}

fn count_cores(content: &str) -> usize {
    content
        .lines()
        .filter(|l| l.starts_with("cpu") && l.as_bytes().get(3).is_some_and(u8::is_ascii_digit))
        .count()
}

fn default_core_count() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

fn read_sysfs_freq_mhz(cpufreq_dir: &Path) -> Option<f64> {
    let raw_khz = raw::read_trimmed(&cpufreq_dir.join("scaling_cur_freq"))?;
    let khz: f64 = raw_khz.parse().ok()?;
    if khz <= 0.0 {
        return None;
    }
    Some(khz / 1000.0)
}

fn cpuinfo_freq_mhz() -> Option<f64> {
    let content = std::fs::read_to_string(CPUINFO_PATH).ok()?;
    parse_cpuinfo_freq(&content)
}

fn parse_cpuinfo_freq(content: &str) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("cpu MHz")
            && let Some((_, value)) = rest.split_once(':')
            && let Ok(mhz) = value.trim().parse::<f64>()
        {
            sum += mhz;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}
