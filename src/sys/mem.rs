// SPDX-License-Identifier: MIT
//! System memory and swap totals from `/proc/meminfo`.

use anyhow::{Context, Result, bail};

use super::raw::ProcFile;

const MEMINFO_PATH: &str = "/proc/meminfo";

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemoryStats {
    #[must_use]
    pub fn used_pct(&self) -> f64 {
        percentage(self.used, self.total)
    }

    #[must_use]
    pub fn swap_pct(&self) -> f64 {
        percentage(self.swap_used, self.swap_total)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = part as f64 / whole as f64 * 100.0;
    pct.min(100.0)
}

pub struct MemProbe {
    meminfo: ProcFile,
}

impl MemProbe {
    /// Opens `/proc/meminfo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or lacks a `MemTotal`
    /// line; callers treat this as fatal.
    pub fn new() -> Result<Self> {
        let mut meminfo = ProcFile::open(MEMINFO_PATH)?;
        if parse_meminfo(meminfo.read()?).total == 0 {
            bail!("no MemTotal in {MEMINFO_PATH}");
        }
        Ok(Self { meminfo })
    }

    /// Reads the current memory totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be re-read.
    pub fn sample(&mut self) -> Result<MemoryStats> {
        let content = self.meminfo.read().context("failed to read meminfo")?;
        Ok(parse_meminfo(content))
    }
}

fn parse_meminfo(content: &str) -> MemoryStats {
    let mut total_kb = 0;
    let mut available_kb = 0;
    let mut swap_total_kb = 0;
    let mut swap_free_kb = 0;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("SwapTotal:") {
            swap_total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("SwapFree:") {
            swap_free_kb = parse_kb(rest);
        }
    }

    MemoryStats {
        total: total_kb * 1024,
        available: available_kb * 1024,
        used: total_kb.saturating_sub(available_kb) * 1024,
        swap_total: swap_total_kb * 1024,
        swap_used: swap_total_kb.saturating_sub(swap_free_kb) * 1024,
    }
}

fn parse_kb(rest: &str) -> u64 {
    rest.split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO_SAMPLE: &str = "\
MemTotal:       16384000 kB
MemFree:         1024000 kB
MemAvailable:    8192000 kB
Buffers:          512000 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
";

    #[test]
    fn totals_are_converted_to_bytes() {
        let stats = parse_meminfo(MEMINFO_SAMPLE);
        assert_eq!(stats.total, 16_384_000 * 1024);
        assert_eq!(stats.available, 8_192_000 * 1024);
        assert_eq!(stats.used, 8_192_000 * 1024);
        assert_eq!(stats.swap_total, 4_096_000 * 1024);
        assert_eq!(stats.swap_used, 1_024_000 * 1024);
    }

    #[test]
    fn percentages_guard_zero_totals() {
        let stats = MemoryStats::default();
        assert!(stats.used_pct().abs() < f64::EPSILON);
        assert!(stats.swap_pct().abs() < f64::EPSILON);
    }

    #[test]
    fn used_percentage() {
        let stats = parse_meminfo(MEMINFO_SAMPLE);
        assert!((stats.used_pct() - 50.0).abs() < 1e-9);
        assert!((stats.swap_pct() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_degrade_to_zero() {
        let stats = parse_meminfo("MemTotal:  1000 kB\n");
        assert_eq!(stats.total, 1000 * 1024);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.swap_total, 0);
    }
}
