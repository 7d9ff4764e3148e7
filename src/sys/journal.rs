// SPDX-License-Identifier: MIT
//! Journal queries for OOM kill events.
//!
//! `journalctl` runs with `-o short-unix` so kernel and oomd entries carry
//! epoch-seconds timestamps comparable across both sources. A failed query
//! is detected by exit status, never by scraping stderr, so a logging
//! redirection cannot mask it.

use std::process::Command;

const LOOKBACK: &str = "-8h";

/// Kernel ring-buffer entries from the lookback window, or `None` when the
/// query itself failed.
#[must_use]
pub fn kernel_lines() -> Option<Vec<String>> {
    run(&["-k"])
}

/// systemd-oomd unit entries from the lookback window, or `None` when the
/// query itself failed.
#[must_use]
pub fn oomd_lines() -> Option<Vec<String>> {
    run(&["-u", "systemd-oomd.service"])
}

fn run(selector: &[&str]) -> Option<Vec<String>> {
    let output = Command::new("journalctl")
        .args(selector)
        .args(["-o", "short-unix", "--since", LOOKBACK, "--no-pager", "-q"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Some(text.lines().map(str::to_owned).collect())
}
