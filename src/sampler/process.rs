// SPDX-License-Identifier: MIT
//! Process enumeration with a TTL'd pid cache.
//!
//! Enumerating every pid and reading its memory breakdown is the most
//! expensive per-frame operation, so the full `/proc` walk runs only when
//! the cache TTL lapses. Known pids are re-read each frame for CPU/memory
//! deltas; the heavier statm read is deferred until the displayed subset is
//! known. A process exiting between enumeration and read drops out of the
//! frame and is evicted on the next full rescan.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::sys::proc::{self, PidStat};

/// Rows per process table.
pub const TABLE_ROWS: usize = 10;

const CACHE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ProcessSnapshot {
    pub pid: i32,
    pub comm: String,
    pub cpu_time_prev: Option<u64>,
    pub cpu_time_curr: u64,
    pub rss_bytes: u64,
    /// Shared pages in bytes; filled only for rows that render.
    pub shared_bytes: Option<u64>,
    /// Per-core percentage; may exceed 100 for multi-threaded processes.
    /// `None` until a second sample establishes the baseline.
    pub cpu_core_pct: Option<f64>,
    /// System-normalized percentage (core percentage over the core count).
    pub cpu_pct: Option<f64>,
    pub mem_pct: f64,
    alive: bool,
}

pub struct ProcessScanner {
    cache: HashMap<i32, ProcessSnapshot>,
    last_full_scan: Option<Instant>,
    last_frame: Option<Instant>,
    page_size: u64,
    clock_ticks: f64,
}

impl ProcessScanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            last_full_scan: None,
            last_frame: None,
            page_size: proc::page_size(),
            clock_ticks: proc::clock_ticks_per_sec(),
        }
    }

    /// Refreshes CPU and memory figures for tracked processes, rescanning
    /// the pid set only when the cache TTL has lapsed.
    pub fn refresh(&mut self, now: Instant, cores: usize, total_mem_bytes: u64) {
        let elapsed_secs = self
            .last_frame
            .replace(now)
            .and_then(|at| now.checked_duration_since(at))
            .map_or(0.0, |d| d.as_secs_f64());

        let full_scan = self
            .last_full_scan
            .is_none_or(|at| now.duration_since(at) >= CACHE_TTL);
        let pids: Vec<i32> = if full_scan {
            self.last_full_scan = Some(now);
            let listed = proc::list_pids();
            let listed_set: HashSet<i32> = listed.iter().copied().collect();
            self.cache.retain(|pid, _| listed_set.contains(pid));
            listed
        } else {
            self.cache.keys().copied().collect()
        };

        for snapshot in self.cache.values_mut() {
            snapshot.alive = false;
        }
        for pid in pids {
            let Some(stat) = proc::read_stat(pid) else {
                // Exit race: dropped for this frame, evicted at next rescan.
                continue;
            };
            self.apply_stat(pid, &stat, elapsed_secs, cores, total_mem_bytes);
        }
    }

    fn apply_stat(
        &mut self,
        pid: i32,
        stat: &PidStat,
        elapsed_secs: f64,
        cores: usize,
        total_mem_bytes: u64,
    ) {
        let ticks = stat.total_ticks();
        let rss_bytes = stat.rss_pages * self.page_size;
        let mem_pct = if total_mem_bytes == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let pct = rss_bytes as f64 / total_mem_bytes as f64 * 100.0;
            pct.min(100.0)
        };

        if let Some(snapshot) = self.cache.get_mut(&pid) {
            snapshot.cpu_time_prev = Some(snapshot.cpu_time_curr);
            snapshot.cpu_time_curr = ticks;
            snapshot.comm.clone_from(&stat.comm);
            snapshot.rss_bytes = rss_bytes;
            snapshot.mem_pct = mem_pct;
            snapshot.alive = true;
            if elapsed_secs > 0.0
                && let Some(prev_ticks) = snapshot.cpu_time_prev
            {
                #[allow(clippy::cast_precision_loss)]
                let delta_secs = ticks.saturating_sub(prev_ticks) as f64 / self.clock_ticks;
                let core_pct = delta_secs / elapsed_secs * 100.0;
                #[allow(clippy::cast_precision_loss)]
                let core_count = cores.max(1) as f64;
                snapshot.cpu_core_pct = Some(core_pct);
                snapshot.cpu_pct = Some(core_pct / core_count);
            }
            // A non-positive wall delta retains the previous percentages.
        } else {
            // First sighting seeds the baseline; percentages stay pending
            // until the next frame.
            self.cache.insert(
                pid,
                ProcessSnapshot {
                    pid,
                    comm: stat.comm.clone(),
                    cpu_time_prev: None,
                    cpu_time_curr: ticks,
                    rss_bytes,
                    shared_bytes: None,
                    cpu_core_pct: None,
                    cpu_pct: None,
                    mem_pct,
                    alive: true,
                },
            );
        }
    }

    /// Returns the by-CPU and by-memory tables, top `rows` each. The statm
    /// read happens only for rows that will actually render.
    pub fn tables(&mut self, rows: usize) -> (Vec<ProcessSnapshot>, Vec<ProcessSnapshot>) {
        let (top_cpu_pids, top_mem_pids) = self.ranked_pids(rows);

        let mut displayed = top_cpu_pids.clone();
        displayed.extend(&top_mem_pids);
        displayed.sort_unstable();
        displayed.dedup();
        for pid in displayed {
            if let Some(statm) = proc::read_statm(pid)
                && let Some(snapshot) = self.cache.get_mut(&pid)
            {
                // statm is the authoritative breakdown for rendered rows.
                snapshot.rss_bytes = statm.resident_pages * self.page_size;
                snapshot.shared_bytes = Some(statm.shared_pages * self.page_size);
            }
        }

        (
            self.collect_rows(&top_cpu_pids),
            self.collect_rows(&top_mem_pids),
        )
    }

    fn ranked_pids(&self, rows: usize) -> (Vec<i32>, Vec<i32>) {
        let mut live: Vec<&ProcessSnapshot> = self.cache.values().filter(|s| s.alive).collect();

        live.sort_by(|a, b| {
            b.cpu_pct
                .unwrap_or(-1.0)
                .total_cmp(&a.cpu_pct.unwrap_or(-1.0))
                .then_with(|| b.rss_bytes.cmp(&a.rss_bytes))
        });
        let by_cpu: Vec<i32> = live.iter().take(rows).map(|s| s.pid).collect();

        live.sort_by(|a, b| {
            b.rss_bytes
                .cmp(&a.rss_bytes)
                .then_with(|| a.pid.cmp(&b.pid))
        });
        let by_mem: Vec<i32> = live.iter().take(rows).map(|s| s.pid).collect();
        (by_cpu, by_mem)
    }

    fn collect_rows(&self, pids: &[i32]) -> Vec<ProcessSnapshot> {
        pids.iter()
            .filter_map(|pid| self.cache.get(pid))
            .cloned()
            .collect()
    }
}

impl Default for ProcessScanner {
    fn default() -> Self {
        Self::new()
    }
}
