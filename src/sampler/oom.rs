// SPDX-License-Identifier: MIT
//! Out-of-memory kill tracking from the system journal.
//!
//! Scans run every five seconds, never per frame: the journal query is an
//! external process and must not eat the frame budget. Kernel OOM-killer
//! lines and systemd-oomd kill lines are merged, deduplicated, and reduced
//! to the single most recent event. A failed query keeps the prior state
//! and retries on the next cadence.

use std::time::{Duration, Instant, SystemTime};

use crate::sys::journal;

pub const SCAN_INTERVAL: Duration = Duration::from_secs(5);

/// Events closer together than this are considered one kill seen through
/// two differently-granular sources. One second is conservative for both:
/// kernel entries carry microseconds, oomd entries are journal-stamped.
const DEDUP_TOLERANCE_SECS: f64 = 1.0;

const LOOKBACK_SECS: f64 = 8.0 * 3600.0;

const KERNEL_KILL_MARKER: &str = "Out of memory: Killed process ";
const OOMD_KILL_MARKER: &str = ": Killed ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OomSource {
    Kernel,
    OomDaemon,
}

#[derive(Clone, Debug)]
pub struct OomEvent {
    pub process_name: String,
    pub pid: Option<i32>,
    /// Unix epoch seconds; `short-unix` journal output keeps both sources
    /// directly comparable.
    pub timestamp: f64,
    pub source: OomSource,
}

pub struct OomTracker {
    last_known_event: Option<OomEvent>,
    last_scan: Option<Instant>,
    simulate: bool,
}

impl OomTracker {
    #[must_use]
    pub fn new(simulate: bool) -> Self {
        Self {
            last_known_event: None,
            last_scan: None,
            simulate,
        }
    }

    /// Runs a journal scan when the cadence is due; otherwise a no-op.
    pub fn poll(&mut self, now: Instant) {
        let due = self
            .last_scan
            .is_none_or(|at| now.duration_since(at) >= SCAN_INTERVAL);
        if !due {
            return;
        }
        self.last_scan = Some(now);

        if self.simulate {
            self.last_known_event = Some(synthetic_event());
            return;
        }

        if let Some(events) = scan() {
            self.last_known_event = select_latest(events);
        }
        // else: soft failure, prior state retained, retried next cadence.

        let horizon = unix_now() - LOOKBACK_SECS;
        if self
            .last_known_event
            .as_ref()
            .is_some_and(|event| event.timestamp < horizon)
        {
            self.last_known_event = None;
        }
    }

    #[must_use]
    pub fn last_event(&self) -> Option<&OomEvent> {
        self.last_known_event.as_ref()
    }
}

fn scan() -> Option<Vec<OomEvent>> {
    let kernel = journal::kernel_lines();
    let daemon = journal::oomd_lines();
    if kernel.is_none() && daemon.is_none() {
        return None;
    }

    let mut events: Vec<OomEvent> = Vec::new();
    for line in kernel.unwrap_or_default() {
        if let Some(event) = parse_kernel_line(&line) {
            events.push(event);
        }
    }
    for line in daemon.unwrap_or_default() {
        if let Some(event) = parse_oomd_line(&line) {
            events.push(event);
        }
    }
    Some(events)
}

/// `1722950000.123456 host kernel: Out of memory: Killed process 1234 (chrome) ...`
fn parse_kernel_line(line: &str) -> Option<OomEvent> {
    let timestamp = parse_timestamp(line)?;
    let rest = line.split_once(KERNEL_KILL_MARKER)?.1;
    let (pid_str, rest) = rest.split_once(' ')?;
    let pid = pid_str.parse::<i32>().ok()?;
    let name = rest.strip_prefix('(')?.split_once(')')?.0;
    Some(OomEvent {
        process_name: name.to_owned(),
        pid: Some(pid),
        timestamp,
        source: OomSource::Kernel,
    })
}

/// `1722950000.500000 host systemd-oomd[612]: Killed /user.slice/.../app-gnome-chrome-4321.scope due to memory pressure ...`
fn parse_oomd_line(line: &str) -> Option<OomEvent> {
    let timestamp = parse_timestamp(line)?;
    let rest = line.split_once(OOMD_KILL_MARKER)?.1;
    let unit = rest.split_whitespace().next()?;
    if !unit.starts_with('/') {
        return None;
    }
    Some(OomEvent {
        process_name: normalize_unit_name(unit),
        pid: None,
        timestamp,
        source: OomSource::OomDaemon,
    })
}

fn parse_timestamp(line: &str) -> Option<f64> {
    line.split_whitespace().next()?.parse().ok()
}

/// Reduces a cgroup path to a stable display name: the last path segment
/// with the unit suffix, trailing instance ids, and launcher prefixes
/// stripped, so repeated kills of the same service read identically.
fn normalize_unit_name(unit: &str) -> String {
    let mut name = unit.rsplit('/').next().unwrap_or(unit);
    for suffix in [".scope", ".service"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
        }
    }
    while let Some((head, tail)) = name.rsplit_once('-') {
        if is_instance_id(tail) {
            name = head;
        } else {
            break;
        }
    }
    for prefix in ["app-", "gnome-", "flatpak-", "kde-"] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped;
        }
    }
    name.to_owned()
}

/// Instance ids are numeric or hex (uuid segments); requiring a digit keeps
/// ordinary hex-alphabet words intact.
fn is_instance_id(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_hexdigit())
        && segment.bytes().any(|b| b.is_ascii_digit())
}

fn select_latest(events: Vec<OomEvent>) -> Option<OomEvent> {
    let mut retained: Vec<OomEvent> = Vec::new();
    for event in events {
        if let Some(existing) = retained.iter_mut().find(|e| same_event(e, &event)) {
            // One kill seen through both sources: keep the record with a pid.
            if existing.pid.is_none() && event.pid.is_some() {
                *existing = event;
            }
        } else {
            retained.push(event);
        }
    }
    retained
        .into_iter()
        .max_by(|a, b| a.timestamp.total_cmp(&b.timestamp))
}

fn same_event(a: &OomEvent, b: &OomEvent) -> bool {
    let same_identity = match (a.pid, b.pid) {
        (Some(x), Some(y)) => x == y,
        _ => a.process_name == b.process_name,
    };
    same_identity && (a.timestamp - b.timestamp).abs() <= DEDUP_TOLERANCE_SECS
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

fn synthetic_event() -> OomEvent {
    OomEvent {
        process_name: "memhog".to_owned(),
        pid: Some(4242),
        timestamp: unix_now(),
        source: OomSource::Kernel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNEL_LINE: &str = "1722950000.123456 host kernel: Out of memory: \
Killed process 1234 (chrome) total-vm:2097152kB, anon-rss:1048576kB, file-rss:0kB";
    const OOMD_LINE: &str = "1722950000.500000 host systemd-oomd[612]: Killed \
/user.slice/user-1000.slice/user@1000.service/app.slice/app-gnome-chrome-4321.scope \
due to memory pressure for /user.slice/user-1000.slice being 72.40% > 50.00%";

    #[test]
    fn kernel_line_parses() {
        let event = parse_kernel_line(KERNEL_LINE).expect("event");
        assert_eq!(event.process_name, "chrome");
        assert_eq!(event.pid, Some(1234));
        assert!((event.timestamp - 1_722_950_000.123_456).abs() < 1e-6);
        assert_eq!(event.source, OomSource::Kernel);
    }

    #[test]
    fn oomd_line_parses_and_normalizes() {
        let event = parse_oomd_line(OOMD_LINE).expect("event");
        assert_eq!(event.process_name, "chrome");
        assert_eq!(event.pid, None);
        assert_eq!(event.source, OomSource::OomDaemon);
    }

    #[test]
    fn non_kill_lines_are_ignored() {
        assert!(parse_kernel_line("1722950000.0 host kernel: usb 1-1: reset").is_none());
        assert!(parse_oomd_line("1722950000.0 host systemd-oomd[612]: Swap is running low").is_none());
    }

    #[test]
    fn instance_ids_normalize_identically() {
        assert_eq!(
            normalize_unit_name("app-gnome-chrome-4321.scope"),
            normalize_unit_name("app-gnome-chrome-9977.scope"),
        );
        assert_eq!(normalize_unit_name("app-gnome-chrome-4321.scope"), "chrome");
    }

    #[test]
    fn uuid_segments_are_stripped() {
        assert_eq!(
            normalize_unit_name("vte-spawn-7a9c2e1b-4f3d-4a6e-9b0f-1c2d3e4f5a6b.scope"),
            "vte-spawn",
        );
    }

    #[test]
    fn service_names_survive_normalization() {
        assert_eq!(normalize_unit_name("nginx.service"), "nginx");
        // Hex-alphabet words without digits are not instance ids.
        assert_eq!(normalize_unit_name("face-decode.service"), "face-decode");
    }

    fn event(name: &str, pid: Option<i32>, timestamp: f64, source: OomSource) -> OomEvent {
        OomEvent {
            process_name: name.to_owned(),
            pid,
            timestamp,
            source,
        }
    }

    #[test]
    fn identical_events_from_both_sources_collapse() {
        let events = vec![
            event("chrome", None, 1000.0, OomSource::OomDaemon),
            event("chrome", Some(1234), 1000.0, OomSource::Kernel),
        ];
        let latest = select_latest(events).expect("event");
        // The collapsed record keeps the pid-bearing kernel entry.
        assert_eq!(latest.pid, Some(1234));
        assert_eq!(latest.source, OomSource::Kernel);
    }

    #[test]
    fn distinct_kills_of_same_pid_keep_most_recent() {
        let events = vec![
            event("chrome", Some(1234), 1000.0, OomSource::Kernel),
            event("chrome", Some(1234), 1001.5, OomSource::Kernel),
        ];
        let latest = select_latest(events).expect("event");
        assert!((latest.timestamp - 1001.5).abs() < 1e-9);
    }

    #[test]
    fn near_simultaneous_same_identity_dedups() {
        let events = vec![
            event("chrome", Some(1234), 1000.0, OomSource::Kernel),
            event("chrome", None, 1000.4, OomSource::OomDaemon),
            event("vim", Some(77), 900.0, OomSource::Kernel),
        ];
        let latest = select_latest(events).expect("event");
        assert_eq!(latest.pid, Some(1234));
        assert!((latest.timestamp - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_scan_yields_none() {
        assert!(select_latest(Vec::new()).is_none());
    }

    #[test]
    fn cadence_gates_scans() {
        let mut tracker = OomTracker::new(true);
        let t0 = Instant::now();
        tracker.poll(t0);
        assert!(tracker.last_event().is_some());

        // Within the cadence the simulated event is not refreshed.
        let first_ts = tracker.last_event().expect("event").timestamp;
        tracker.poll(t0 + Duration::from_secs(1));
        let second_ts = tracker.last_event().expect("event").timestamp;
        assert!((first_ts - second_ts).abs() < f64::EPSILON);
    }

    #[test]
    fn simulated_events_are_injected() {
        let mut tracker = OomTracker::new(true);
        tracker.poll(Instant::now());
        let event = tracker.last_event().expect("event");
        assert_eq!(event.process_name, "memhog");
        assert_eq!(event.source, OomSource::Kernel);
    }
}
