// SPDX-License-Identifier: MIT
//! Minimal raw reads of kernel pseudo-files.
//!
//! Pseudo-files are tiny and regenerated by the kernel on every read; the
//! cost that matters at frame rate is open/alloc churn. [`ProcFile`] keeps
//! one fd open and re-reads through a reusable buffer. [`read_once`] serves
//! per-pid files, where the owning process may vanish between enumeration
//! and read and a persistent fd would go stale anyway.

use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};

pub struct ProcFile {
    file: File,
    buf: Vec<u8>,
}

impl ProcFile {
    /// Opens a pseudo-file and keeps the fd for repeated sampling.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
        Ok(Self {
            file,
            buf: Vec::with_capacity(16 * 1024),
        })
    }

    /// Re-reads the whole file from offset zero.
    ///
    /// # Errors
    ///
    /// Returns an error if seeking or reading fails, or if the content is
    /// not UTF-8 (never the case for the files sampled here).
    pub fn read(&mut self) -> Result<&str> {
        self.buf.clear();
        self.file
            .seek(SeekFrom::Start(0))
            .context("failed to seek pseudo-file")?;
        self.file
            .read_to_end(&mut self.buf)
            .context("failed to read pseudo-file")?;
        std::str::from_utf8(&self.buf).context("pseudo-file is not valid UTF-8")
    }
}

/// Reads a small file with a single `read` call into the caller's buffer.
///
/// Returns `None` on any failure; per-pid files routinely disappear
/// mid-frame and callers treat a vanished file as an evicted entry, not an
/// error.
pub fn read_once<'b>(path: &Path, buf: &'b mut [u8]) -> Option<Cow<'b, str>> {
    let mut file = File::open(path).ok()?;
    let n = file.read(buf).ok()?;
    if n == 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&buf[..n]))
}

/// Reads and trims a one-value sysfs leaf.
#[must_use]
pub fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_owned())
}
