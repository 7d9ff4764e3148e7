// SPDX-License-Identifier: MIT
//! NVIDIA devices via the NVML query library.

use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;

use super::{GpuReading, GpuVendor};

pub struct NvidiaProbe {
    nvml: Nvml,
    device_count: u32,
}

impl NvidiaProbe {
    /// Initializes NVML. `None` when the library or devices are absent.
    #[must_use]
    pub fn init() -> Option<Self> {
        let nvml = Nvml::init().ok()?;
        let device_count = nvml.device_count().ok()?;
        if device_count == 0 {
            return None;
        }
        Some(Self { nvml, device_count })
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        #[allow(clippy::cast_possible_truncation)]
        {
            self.device_count as usize
        }
    }

    /// Polls every device. A failing query for an optional field degrades
    /// that field only; the device record is still emitted.
    pub fn sample_into(&self, readings: &mut Vec<GpuReading>) {
        for i in 0..self.device_count {
            let Ok(device) = self.nvml.device_by_index(i) else {
                continue;
            };
            let name = device.name().unwrap_or_else(|_| "NVIDIA GPU".to_owned());
            let util_pct = device
                .utilization_rates()
                .map_or(0.0, |util| f64::from(util.gpu));
            let (mem_used, mem_total) = device
                .memory_info()
                .map_or((0, 0), |mem| (mem.used, mem.total));
            let temp_c = device
                .temperature(TemperatureSensor::Gpu)
                .ok()
                .map(f64::from);
            readings.push(GpuReading {
                index: 0,
                vendor: GpuVendor::Nvidia,
                name,
                util_pct,
                mem_used,
                mem_total,
                temp_c,
                temp_crit_c: None,
            });
        }
    }
}
