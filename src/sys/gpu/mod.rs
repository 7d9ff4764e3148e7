// SPDX-License-Identifier: MIT
//! GPU discovery and per-frame polling.
//!
//! The vendor set is small and fixed, so vendors are a closed enum rather
//! than dynamic dispatch. Discovery runs once at startup; each frame only
//! re-polls the per-field readings. Devices from both vendors merge into a
//! single contiguously indexed list.

pub mod amd;
pub mod nvidia;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nvidia => write!(f, "NVIDIA"),
            Self::Amd => write!(f, "AMD"),
        }
    }
}

/// One device's readings for the current frame. Fields a vendor cannot
/// supply degrade individually; the device record itself always exists.
#[derive(Clone, Debug)]
pub struct GpuReading {
    pub index: usize,
    pub vendor: GpuVendor,
    pub name: String,
    pub util_pct: f64,
    pub mem_used: u64,
    pub mem_total: u64,
    pub temp_c: Option<f64>,
    pub temp_crit_c: Option<f64>,
}

impl GpuReading {
    #[must_use]
    pub fn mem_pct(&self) -> f64 {
        if self.mem_total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.mem_used as f64 / self.mem_total as f64 * 100.0;
        pct.min(100.0)
    }
}

pub struct GpuMonitor {
    nvidia: Option<nvidia::NvidiaProbe>,
    amd: Vec<amd::AmdDevice>,
}

impl GpuMonitor {
    /// Discovers devices once. A vendor that fails to probe contributes no
    /// devices; it never aborts startup.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            nvidia: nvidia::NvidiaProbe::init(),
            amd: amd::discover(),
        }
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        let nvidia = self
            .nvidia
            .as_ref()
            .map_or(0, nvidia::NvidiaProbe::device_count);
        nvidia + self.amd.len()
    }

    /// One uniform reading per device, contiguously indexed across vendors.
    #[must_use]
    pub fn sample(&self) -> Vec<GpuReading> {
        let mut readings = Vec::with_capacity(self.device_count());
        if let Some(probe) = &self.nvidia {
            probe.sample_into(&mut readings);
        }
        for device in &self.amd {
            readings.push(device.sample());
        }
        for (index, reading) in readings.iter_mut().enumerate() {
            reading.index = index;
        }
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_pct_guards_zero_total() {
        let reading = GpuReading {
            index: 0,
            vendor: GpuVendor::Amd,
            name: "AMD GPU (card0)".to_owned(),
            util_pct: 0.0,
            mem_used: 0,
            mem_total: 0,
            temp_c: None,
            temp_crit_c: None,
        };
        assert!(reading.mem_pct().abs() < f64::EPSILON);
    }

    #[test]
    fn vendor_names_render() {
        assert_eq!(GpuVendor::Nvidia.to_string(), "NVIDIA");
        assert_eq!(GpuVendor::Amd.to_string(), "AMD");
    }
}
