// SPDX-License-Identifier: MIT
//! Cumulative network byte counters from `/proc/net/dev`.

use super::raw::ProcFile;

const NET_DEV_PATH: &str = "/proc/net/dev";

/// Byte counters summed over all physical interfaces (loopback excluded).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

pub struct NetProbe {
    dev: ProcFile,
}

impl NetProbe {
    /// Opens `/proc/net/dev`. Absence degrades the network panel rather
    /// than aborting startup.
    #[must_use]
    pub fn new() -> Option<Self> {
        let dev = ProcFile::open(NET_DEV_PATH).ok()?;
        Some(Self { dev })
    }

    /// Reads the current counters; `None` on a transient read failure.
    pub fn sample(&mut self) -> Option<NetCounters> {
        let content = self.dev.read().ok()?;
        Some(parse_net_dev(content))
    }
}

fn parse_net_dev(content: &str) -> NetCounters {
    let mut counters = NetCounters::default();
    // Two header lines, then one line per interface:
    //   eth0: <rx bytes> packets errs ... <tx bytes> packets ...
    for line in content.lines().skip(2) {
        let Some((iface, rest)) = line.split_once(':') else {
            continue;
        };
        if iface.trim() == "lo" {
            continue;
        }
        let mut fields = rest.split_whitespace();
        let recv = fields.next().and_then(|v| v.parse::<u64>().ok());
        let sent = fields.nth(7).and_then(|v| v.parse::<u64>().ok());
        if let (Some(recv), Some(sent)) = (recv, sent) {
            counters.bytes_recv = counters.bytes_recv.saturating_add(recv);
            counters.bytes_sent = counters.bytes_sent.saturating_add(sent);
        }
    }
    counters
}
