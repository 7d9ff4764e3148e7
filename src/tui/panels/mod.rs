// SPDX-License-Identifier: MIT
pub mod cpu;
pub mod gpu;
pub mod header;
pub mod memory;
pub mod net;
pub mod picker;
pub mod procs;

use ratatui::style::Style;
use ratatui::text::Span;

use super::gradient::GradientColorCache;
use super::theme::{BAR_EMPTY, BAR_FILLED, Rgb, SPARK_CHARS, Theme};

/// Formats a raw bytes/sec rate with the smallest unit keeping the value
/// at or above one.
#[must_use]
pub fn format_rate(bytes_per_sec: f64) -> String {
    let (value, unit) = scale_bytes(bytes_per_sec);
    format!("{value:.1} {unit}/s")
}

#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let (value, unit) = scale_bytes(bytes as f64);
    format!("{value:.1} {unit}")
}

fn scale_bytes(mut value: f64) -> (f64, &'static str) {
    for unit in ["B", "KB", "MB", "GB"] {
        if value.abs() < 1024.0 {
            return (value, unit);
        }
        value /= 1024.0;
    }
    (value, "TB")
}

/// Renders values in the 0-100 range as block glyphs, newest at the right.
#[must_use]
pub fn sparkline<I: Iterator<Item = f64>>(values: I, width: usize) -> String {
    let collected: Vec<f64> = values.collect();
    let start = collected.len().saturating_sub(width);
    collected[start..].iter().map(|v| spark_char(*v)).collect()
}

fn spark_char(value: f64) -> char {
    let clamped = value.clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let index = (clamped / 100.0 * (SPARK_CHARS.len() - 1) as f64) as usize;
    SPARK_CHARS[index.min(SPARK_CHARS.len() - 1)]
}

/// Gradient-colored bar: each filled block takes its position's gradient
/// color, so the left edge stays cool and only the advancing edge runs hot.
pub fn gradient_bar(
    pct: f64,
    width: usize,
    gradient: (Rgb, Rgb),
    theme: &Theme,
    cache: &mut GradientColorCache,
) -> Vec<Span<'static>> {
    let clamped = pct.clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (clamped / 100.0 * width as f64).round() as usize;
    let mut spans = Vec::with_capacity(width);
    for i in 0..width {
        if i < filled {
            let color = cache.block_color(gradient.0, gradient.1, i, width);
            spans.push(Span::styled(
                BAR_FILLED.to_string(),
                Style::default().fg(color),
            ));
        } else {
            spans.push(Span::styled(BAR_EMPTY.to_string(), theme.dim_style()));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_pick_the_smallest_unit_at_least_one() {
        assert_eq!(format_rate(0.4), "0.4 B/s");
        assert_eq!(format_rate(512.0), "512.0 B/s");
        assert_eq!(format_rate(2048.0), "2.0 KB/s");
        assert_eq!(format_rate(3.5 * 1024.0 * 1024.0), "3.5 MB/s");
        assert_eq!(format_rate(1024.0 * 1024.0 * 1024.0), "1.0 GB/s");
    }

    #[test]
    fn byte_sizes_scale_the_same_way() {
        assert_eq!(format_bytes(0), "0.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1 << 30), "1.0 GB");
    }

    #[test]
    fn sparkline_clamps_and_truncates_to_width() {
        let values = [0.0, 50.0, 100.0, 200.0, -5.0];
        let line = sparkline(values.into_iter(), 4);
        assert_eq!(line.chars().count(), 4);
        assert_eq!(line.chars().last(), Some(' '));
    }

    #[test]
    fn sparkline_keeps_the_newest_values() {
        let values = [0.0, 0.0, 0.0, 100.0];
        let line = sparkline(values.into_iter(), 2);
        assert_eq!(line, format!(" {}", SPARK_CHARS[SPARK_CHARS.len() - 1]));
    }

    #[test]
    fn gradient_bar_fill_tracks_percentage() {
        let theme = &crate::tui::theme::THEMES[0];
        let mut cache = GradientColorCache::new();
        let spans = gradient_bar(50.0, 10, theme.cpu_gradient, theme, &mut cache);
        assert_eq!(spans.len(), 10);
        let filled_glyph = BAR_FILLED.to_string();
        let filled = spans
            .iter()
            .filter(|span| span.content.as_ref() == filled_glyph)
            .count();
        assert_eq!(filled, 5);
    }

    #[test]
    fn refilling_never_recolors_earlier_blocks() {
        let theme = &crate::tui::theme::THEMES[0];
        let mut cache = GradientColorCache::new();
        let low = gradient_bar(30.0, 10, theme.cpu_gradient, theme, &mut cache);
        let high = gradient_bar(90.0, 10, theme.cpu_gradient, theme, &mut cache);
        for (a, b) in low.iter().zip(high.iter()).take(3) {
            assert_eq!(a.style, b.style);
        }
    }
}
