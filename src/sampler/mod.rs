// SPDX-License-Identifier: MIT
//! The per-frame sampling engine.
//!
//! One `sample` call per refresh tick, in strict order: read counters,
//! derive deltas, refresh the process cache, poll the OOM tracker on its
//! own cadence. The render layer only ever sees the finished
//! [`FrameSnapshot`].

pub mod delta;
pub mod history;
pub mod oom;
pub mod process;
pub mod profile;

use std::time::Instant;

use anyhow::{Context, Result};

use crate::sampler::delta::{CounterRate, CpuUtilTracker, Peak};
use crate::sampler::oom::{OomEvent, OomTracker};
use crate::sampler::process::{ProcessScanner, ProcessSnapshot};
use crate::sampler::profile::Profiler;
use crate::sys::cpu::CpuProbe;
use crate::sys::gpu::{GpuMonitor, GpuReading};
use crate::sys::mem::{MemProbe, MemoryStats};
use crate::sys::net::{NetCounters, NetProbe};

/// Network figures for one frame. Rates are raw bytes/sec; unit selection
/// is a presentation concern.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetRates {
    pub recv_rate: f64,
    pub sent_rate: f64,
    pub recv_peak: f64,
    pub sent_peak: f64,
    pub total_recv: u64,
    pub total_sent: u64,
}

pub struct FrameSnapshot {
    pub cpu_pct: f64,
    pub cores: usize,
    pub freq_mhz: Option<f64>,
    pub memory: MemoryStats,
    pub net: NetRates,
    pub gpus: Vec<GpuReading>,
    pub top_cpu: Vec<ProcessSnapshot>,
    pub top_mem: Vec<ProcessSnapshot>,
    pub last_oom: Option<OomEvent>,
}

pub struct SystemSampler {
    cpu: CpuProbe,
    cpu_util: CpuUtilTracker,
    memory: MemProbe,
    last_memory: MemoryStats,
    net: Option<NetProbe>,
    recv_rate: CounterRate,
    sent_rate: CounterRate,
    recv_peak: Peak,
    sent_peak: Peak,
    last_counters: NetCounters,
    gpus: GpuMonitor,
    processes: ProcessScanner,
    oom: OomTracker,
}

impl SystemSampler {
    /// Opens every probe. GPU and network absence degrade; missing CPU or
    /// memory accounting is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error when `/proc/stat` or `/proc/meminfo` is unreadable.
    pub fn new(simulate: bool) -> Result<Self> {
        let cpu = CpuProbe::new().context("no readable CPU accounting interface")?;
        let memory = MemProbe::new().context("no readable memory accounting interface")?;
        Ok(Self {
            cpu,
            cpu_util: CpuUtilTracker::new(),
            memory,
            last_memory: MemoryStats::default(),
            net: NetProbe::new(),
            recv_rate: CounterRate::new(),
            sent_rate: CounterRate::new(),
            recv_peak: Peak::default(),
            sent_peak: Peak::default(),
            last_counters: NetCounters::default(),
            gpus: GpuMonitor::discover(),
            processes: ProcessScanner::new(),
            oom: OomTracker::new(simulate),
        })
    }

    #[must_use]
    pub fn gpu_count(&self) -> usize {
        self.gpus.device_count()
    }

    /// Takes one full frame of readings.
    pub fn sample(&mut self, now: Instant, profiler: &mut Profiler) -> FrameSnapshot {
        let cpu_pct = profiler.time("cpu", || match self.cpu.sample() {
            Ok(times) => self.cpu_util.update(times),
            // Transient read failure: keep the previous figure for a frame.
            Err(_) => self.cpu_util.current(),
        });
        let freq_mhz = self.cpu.frequency_mhz(now);
        let cores = self.cpu.cores();

        let memory = profiler.time("memory", || {
            if let Ok(stats) = self.memory.sample() {
                self.last_memory = stats;
            }
            self.last_memory
        });

        let net = profiler.time("net", || self.sample_net(now));
        let gpus = profiler.time("gpu", || self.gpus.sample());

        let (top_cpu, top_mem) = profiler.time("processes", || {
            self.processes.refresh(now, cores, memory.total);
            self.processes.tables(process::TABLE_ROWS)
        });

        profiler.time("oom", || self.oom.poll(now));

        FrameSnapshot {
            cpu_pct,
            cores,
            freq_mhz,
            memory,
            net,
            gpus,
            top_cpu,
            top_mem,
            last_oom: self.oom.last_event().cloned(),
        }
    }

    fn sample_net(&mut self, now: Instant) -> NetRates {
        if let Some(probe) = &mut self.net
            && let Some(counters) = probe.sample()
        {
            self.last_counters = counters;
            let recv = self.recv_rate.update(counters.bytes_recv, now);
            let sent = self.sent_rate.update(counters.bytes_sent, now);
            self.recv_peak.observe(recv);
            self.sent_peak.observe(sent);
        }
        NetRates {
            recv_rate: self.recv_rate.current(),
            sent_rate: self.sent_rate.current(),
            recv_peak: self.recv_peak.value(),
            sent_peak: self.sent_peak.value(),
            total_recv: self.last_counters.bytes_recv,
            total_sent: self.last_counters.bytes_sent,
        }
    }
}
