// SPDX-License-Identifier: MIT
//! AMD devices via DRM sysfs leaves.
//!
//! A card qualifies when its `device/vendor` file carries the AMD PCI
//! vendor id. Utilization, VRAM, and temperature each live in a distinct
//! leaf; older cards and APUs miss some of them, which degrades that one
//! field and never excludes the device.

use std::path::{Path, PathBuf};

use super::{GpuReading, GpuVendor};
use crate::sys::raw;

const DRM_ROOT: &str = "/sys/class/drm";
const AMD_VENDOR_ID: &str = "0x1002";

pub struct AmdDevice {
    name: String,
    device_dir: PathBuf,
    hwmon_temp: Option<PathBuf>,
    temp_crit_c: Option<f64>,
}

/// Scans `/sys/class/drm` for AMD cards.
#[must_use]
pub fn discover() -> Vec<AmdDevice> {
    discover_in(Path::new(DRM_ROOT))
}

fn discover_in(root: &Path) -> Vec<AmdDevice> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut cards: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let card = entry.file_name().to_string_lossy().into_owned();
            // `card0-HDMI-A-1` style entries are connectors, not devices.
            (card.starts_with("card") && !card.contains('-')).then_some(card)
        })
        .collect();
    cards.sort();

    let mut devices = Vec::new();
    for card in cards {
        let device_dir = root.join(&card).join("device");
        let Some(vendor) = raw::read_trimmed(&device_dir.join("vendor")) else {
            continue;
        };
        if vendor != AMD_VENDOR_ID {
            continue;
        }
        let hwmon_temp = find_hwmon_leaf(&device_dir, "temp1_input");
        let temp_crit_c =
            find_hwmon_leaf(&device_dir, "temp1_crit").and_then(|p| read_millidegrees(&p));
        devices.push(AmdDevice {
            name: format!("AMD GPU ({card})"),
            device_dir,
            hwmon_temp,
            temp_crit_c,
        });
    }
    devices
}

fn find_hwmon_leaf(device_dir: &Path, leaf: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(device_dir.join("hwmon")).ok()?;
    for entry in entries.flatten() {
        let candidate = entry.path().join(leaf);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

fn read_millidegrees(path: &Path) -> Option<f64> {
    let raw_value: f64 = raw::read_trimmed(path)?.parse().ok()?;
    Some(raw_value / 1000.0)
}

fn read_u64_leaf(path: &Path) -> Option<u64> {
    raw::read_trimmed(path)?.parse().ok()
}

impl AmdDevice {
    /// Polls the per-field leaves. Missing leaves degrade to 0% utilization,
    /// 0/0 VRAM, and no temperature.
    #[must_use]
    pub fn sample(&self) -> GpuReading {
        let util_pct = read_u64_leaf(&self.device_dir.join("gpu_busy_percent"))
            .map_or(0.0, |v| {
                #[allow(clippy::cast_precision_loss)]
                {
                    v as f64
                }
            });
        let mem_total = read_u64_leaf(&self.device_dir.join("mem_info_vram_total")).unwrap_or(0);
        let mem_used = read_u64_leaf(&self.device_dir.join("mem_info_vram_used")).unwrap_or(0);
        let temp_c = self.hwmon_temp.as_deref().and_then(read_millidegrees);
        GpuReading {
            index: 0,
            vendor: GpuVendor::Amd,
            name: self.name.clone(),
            util_pct,
            mem_used,
            mem_total,
            temp_c,
            temp_crit_c: self.temp_crit_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    struct FakeDrm {
        root: PathBuf,
    }

    impl FakeDrm {
        fn new(tag: &str) -> Self {
            let root = std::env::temp_dir().join(format!("ktop-amd-test-{}-{tag}", std::process::id()));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).expect("create fake drm root");
            Self { root }
        }

        fn add_card(&self, card: &str, vendor: &str) -> PathBuf {
            let device = self.root.join(card).join("device");
            fs::create_dir_all(&device).expect("create device dir");
            fs::write(device.join("vendor"), format!("{vendor}\n")).expect("write vendor");
            device
        }
    }

    impl Drop for FakeDrm {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    #[test]
    fn non_amd_cards_are_skipped() {
        let drm = FakeDrm::new("skip");
        drm.add_card("card0", "0x10de");
        drm.add_card("card1", "0x1002");
        fs::create_dir_all(drm.root.join("card1-HDMI-A-1")).expect("connector dir");

        let devices = discover_in(&drm.root);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "AMD GPU (card1)");
    }

    #[test]
    fn missing_temperature_degrades_that_field_only() {
        let drm = FakeDrm::new("no-temp");
        let device = drm.add_card("card0", "0x1002");
        fs::write(device.join("gpu_busy_percent"), "37\n").expect("write busy");
        fs::write(device.join("mem_info_vram_total"), "8589934592\n").expect("write total");
        fs::write(device.join("mem_info_vram_used"), "2147483648\n").expect("write used");
        // hwmon dir present but without a temp1_input leaf.
        fs::create_dir_all(device.join("hwmon").join("hwmon3")).expect("hwmon dir");

        let devices = discover_in(&drm.root);
        assert_eq!(devices.len(), 1);
        let reading = devices[0].sample();
        assert!((reading.util_pct - 37.0).abs() < f64::EPSILON);
        assert_eq!(reading.mem_total, 8_589_934_592);
        assert_eq!(reading.mem_used, 2_147_483_648);
        assert!((reading.mem_pct() - 25.0).abs() < 1e-9);
        assert!(reading.temp_c.is_none());
    }

    #[test]
    fn bare_device_degrades_all_fields() {
        let drm = FakeDrm::new("bare");
        drm.add_card("card0", "0x1002");

        let devices = discover_in(&drm.root);
        assert_eq!(devices.len(), 1);
        let reading = devices[0].sample();
        assert!(reading.util_pct.abs() < f64::EPSILON);
        assert_eq!(reading.mem_used, 0);
        assert_eq!(reading.mem_total, 0);
        assert!(reading.temp_c.is_none());
        assert!(reading.temp_crit_c.is_none());
    }

    #[test]
    fn hwmon_temperature_is_millidegrees() {
        let drm = FakeDrm::new("temp");
        let device = drm.add_card("card0", "0x1002");
        let hwmon = device.join("hwmon").join("hwmon0");
        fs::create_dir_all(&hwmon).expect("hwmon dir");
        fs::write(hwmon.join("temp1_input"), "64500\n").expect("write temp");
        fs::write(hwmon.join("temp1_crit"), "100000\n").expect("write crit");

        let devices = discover_in(&drm.root);
        let reading = devices[0].sample();
        assert!((reading.temp_c.expect("temp") - 64.5).abs() < 1e-9);
        assert!((reading.temp_crit_c.expect("crit") - 100.0).abs() < 1e-9);
    }
}
