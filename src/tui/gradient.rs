// SPDX-License-Identifier: MIT
//! Memoized gradient colors for bar charts.
//!
//! The gradient is a fixed function of block position within the bar's full
//! width, not of the current fill, so re-filling a bar never recolors
//! already-drawn blocks between frames. The key space is theme count times
//! bar width, so the memo map stays small for the process lifetime.

use std::collections::HashMap;

use ratatui::style::Color;

use super::theme::Rgb;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct GradientKey {
    start: Rgb,
    end: Rgb,
    index: u16,
    total: u16,
}

#[derive(Default)]
pub struct GradientColorCache {
    cache: HashMap<GradientKey, Rgb>,
    computed: u64,
}

impl GradientColorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of block `index` in a bar `total` blocks wide, linearly
    /// interpolated in RGB between the two endpoints.
    pub fn block_color(&mut self, start: Rgb, end: Rgb, index: usize, total: usize) -> Color {
        #[allow(clippy::cast_possible_truncation)]
        let key = GradientKey {
            start,
            end,
            index: index.min(usize::from(u16::MAX)) as u16,
            total: total.min(usize::from(u16::MAX)) as u16,
        };
        if let Some(&(r, g, b)) = self.cache.get(&key) {
            return Color::Rgb(r, g, b);
        }
        let (r, g, b) = interpolate(start, end, index, total);
        self.computed += 1;
        self.cache.insert(key, (r, g, b));
        Color::Rgb(r, g, b)
    }

    /// How many interpolations were actually computed (cache misses).
    #[allow(dead_code)]
    #[must_use]
    pub fn computed(&self) -> u64 {
        self.computed
    }
}

fn interpolate(start: Rgb, end: Rgb, index: usize, total: usize) -> Rgb {
    let t = if total <= 1 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            index as f64 / (total - 1) as f64
        }
    };
    (
        lerp(start.0, end.0, t),
        lerp(start.1, end.1, t),
        lerp(start.2, end.2, t),
    )
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let blended = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        blended.round().clamp(0.0, 255.0) as u8
    }
}
