// SPDX-License-Identifier: MIT
//! Per-process stat/statm reads.

use std::path::PathBuf;

use super::raw;

const STAT_BUF_LEN: usize = 1024;

/// Fields from `/proc/<pid>/stat` needed every frame: command name, CPU
/// ticks, and resident pages.
#[derive(Clone, Debug)]
pub struct PidStat {
    pub comm: String,
    pub utime: u64,
    pub stime: u64,
    pub rss_pages: u64,
}

impl PidStat {
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.utime + self.stime
    }
}

/// The heavier `/proc/<pid>/statm` breakdown, read only for displayed rows.
#[derive(Clone, Copy, Debug)]
pub struct PidStatm {
    pub resident_pages: u64,
    pub shared_pages: u64,
}

/// Enumerates numeric entries of `/proc`.
#[must_use]
pub fn list_pids() -> Vec<i32> {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    let mut pids: Vec<i32> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_string_lossy().parse().ok())
        .collect();
    pids.sort_unstable();
    pids
}

/// Reads and parses one process's stat line. `None` when the process has
/// exited between enumeration and read.
#[must_use]
pub fn read_stat(pid: i32) -> Option<PidStat> {
    let mut buf = [0u8; STAT_BUF_LEN];
    let raw_stat = raw::read_once(&PathBuf::from(format!("/proc/{pid}/stat")), &mut buf)?;
    parse_stat(&raw_stat)
}

/// Parses a stat line. The command name sits in parentheses and may itself
/// contain `)` or spaces, so the split anchors on the last `)`.
#[must_use]
pub fn parse_stat(raw_stat: &str) -> Option<PidStat> {
    let open = raw_stat.find('(')?;
    let close = raw_stat.rfind(')')?;
    if open >= close {
        return None;
    }
    let comm = raw_stat[open + 1..close].to_owned();
    let fields: Vec<&str> = raw_stat[close + 1..].split_whitespace().collect();
    // Fields after comm: state(0) ppid(1) ... utime(11) stime(12) ... rss(21)
    if fields.len() < 22 {
        return None;
    }
    let rss: i64 = fields[21].parse().unwrap_or(0);
    #[allow(clippy::cast_sign_loss)]
    let rss_pages = rss.max(0) as u64;
    Some(PidStat {
        comm,
        utime: fields[11].parse().unwrap_or(0),
        stime: fields[12].parse().unwrap_or(0),
        rss_pages,
    })
}

/// Reads and parses `/proc/<pid>/statm`.
#[must_use]
pub fn read_statm(pid: i32) -> Option<PidStatm> {
    let mut buf = [0u8; 256];
    let raw_statm = raw::read_once(&PathBuf::from(format!("/proc/{pid}/statm")), &mut buf)?;
    parse_statm(&raw_statm)
}

/// Parses statm: size(0) resident(1) shared(2) text lib data dt.
#[must_use]
pub fn parse_statm(raw_statm: &str) -> Option<PidStatm> {
    let mut fields = raw_statm.split_whitespace().skip(1);
    let resident_pages = fields.next()?.parse().ok()?;
    let shared_pages = fields.next()?.parse().ok()?;
    Some(PidStatm {
        resident_pages,
        shared_pages,
    })
}

/// Kernel page size in bytes.
#[must_use]
pub fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions.
    let value = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if value > 0 {
        #[allow(clippy::cast_sign_loss)]
        {
            value as u64
        }
    } else {
        4096
    }
}

/// Jiffies per second for converting stat ticks to CPU seconds.
#[must_use]
pub fn clock_ticks_per_sec() -> f64 {
    // SAFETY: sysconf has no preconditions.
    let value = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if value > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            value as f64
        }
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_SAMPLE: &str = "1234 (kworker/u8:3) S 2 0 0 0 -1 69238880 0 0 0 0 \
        150 75 0 0 20 0 1 0 12345 178258 2048 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0";

    #[test]
    fn stat_fields_are_extracted() {
        let stat = parse_stat(STAT_SAMPLE).expect("stat");
        assert_eq!(stat.comm, "kworker/u8:3");
        assert_eq!(stat.utime, 150);
        assert_eq!(stat.stime, 75);
        assert_eq!(stat.total_ticks(), 225);
        assert_eq!(stat.rss_pages, 2048);
    }

    #[test]
    fn comm_with_embedded_parenthesis() {
        let raw_stat = "99 (weird) name)) R 1 0 0 0 -1 0 0 0 0 0 \
            10 20 0 0 20 0 1 0 1 1 512 0 1 1 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0";
        let stat = parse_stat(raw_stat).expect("stat");
        assert_eq!(stat.comm, "weird) name)");
        assert_eq!(stat.utime, 10);
        assert_eq!(stat.rss_pages, 512);
    }

    #[test]
    fn truncated_stat_is_rejected() {
        assert!(parse_stat("1 (init) S 0 0").is_none());
        assert!(parse_stat("").is_none());
    }

    #[test]
    fn negative_rss_clamps_to_zero() {
        let raw_stat = "7 (x) S 1 0 0 0 -1 0 0 0 0 0 \
            1 1 0 0 20 0 1 0 1 1 -1 0 1 1 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0";
        let stat = parse_stat(raw_stat).expect("stat");
        assert_eq!(stat.rss_pages, 0);
    }

    #[test]
    fn statm_resident_and_shared() {
        let statm = parse_statm("44000 2100 350 120 0 4000 0").expect("statm");
        assert_eq!(statm.resident_pages, 2100);
        assert_eq!(statm.shared_pages, 350);
    }

    #[test]
    fn statm_too_short_is_rejected() {
        assert!(parse_statm("44000 2100").is_none());
    }
}
