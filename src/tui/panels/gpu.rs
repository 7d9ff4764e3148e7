// SPDX-License-Identifier: MIT
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{format_bytes, gradient_bar, sparkline};
use crate::sampler::history::HistoryBuffer;
use crate::sys::gpu::GpuReading;
use crate::tui::gradient::GradientColorCache;
use crate::tui::theme::Theme;

const BAR_WIDTH: usize = 25;

pub fn render(
    frame: &mut ratatui::Frame,
    area: Rect,
    gpus: &[GpuReading],
    util_history: &[HistoryBuffer<f64>],
    mem_history: &[HistoryBuffer<f64>],
    theme: &Theme,
    cache: &mut GradientColorCache,
) {
    let block = Block::default()
        .title(" GPU ")
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title_style(theme.title_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 20 || inner.height < 1 {
        return;
    }

    if gpus.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No GPUs detected", theme.dim_style())),
            inner,
        );
        return;
    }

    let spark_width = usize::from(inner.width).saturating_sub(BAR_WIDTH + 25).min(40);
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(gpus.len() * 3);
    for gpu in gpus {
        lines.push(title_line(gpu, theme));
        lines.push(util_line(gpu, spark_width, util_history, theme, cache));
        lines.push(mem_line(gpu, spark_width, mem_history, theme, cache));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn title_line(gpu: &GpuReading, theme: &Theme) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("GPU {} ", gpu.index), theme.title_style()),
        Span::styled(format!("{} ", gpu.vendor), theme.dim_style()),
        Span::raw(gpu.name.clone()),
    ];
    if let Some(temp) = gpu.temp_c {
        spans.push(Span::styled(
            format!("  {temp:.0}\u{00b0}C"),
            Style::default().fg(temp_color(gpu, theme)),
        ));
    }
    Line::from(spans)
}

// Run hot when the card reports a critical trip point and we are within
// 90% of it; otherwise fall back to the generic load thresholds.
fn temp_color(gpu: &GpuReading, theme: &Theme) -> ratatui::style::Color {
    let Some(temp) = gpu.temp_c else {
        return theme.dim;
    };
    if let Some(crit) = gpu.temp_crit_c
        && crit > 0.0
    {
        return if temp >= crit * 0.9 {
            theme.crit
        } else {
            theme.dim
        };
    }
    theme.level_color(temp)
}

fn util_line(
    gpu: &GpuReading,
    spark_width: usize,
    util_history: &[HistoryBuffer<f64>],
    theme: &Theme,
    cache: &mut GradientColorCache,
) -> Line<'static> {
    let mut spans = vec![Span::raw("  Util ")];
    spans.extend(gradient_bar(
        gpu.util_pct,
        BAR_WIDTH,
        theme.gpu_gradient,
        theme,
        cache,
    ));
    spans.push(Span::styled(
        format!(" {:5.1}%  ", gpu.util_pct),
        theme.level_style(gpu.util_pct),
    ));
    if let Some(history) = util_history.get(gpu.index) {
        spans.push(Span::styled(
            sparkline(history.iter().copied(), spark_width),
            theme.dim_style(),
        ));
    }
    Line::from(spans)
}

fn mem_line(
    gpu: &GpuReading,
    spark_width: usize,
    mem_history: &[HistoryBuffer<f64>],
    theme: &Theme,
    cache: &mut GradientColorCache,
) -> Line<'static> {
    let mem_pct = gpu.mem_pct();
    let mut spans = vec![Span::raw("  Mem  ")];
    spans.extend(gradient_bar(
        mem_pct,
        BAR_WIDTH,
        theme.gpu_gradient,
        theme,
        cache,
    ));
    spans.push(Span::styled(
        format!(
            " {} / {}  ",
            format_bytes(gpu.mem_used),
            format_bytes(gpu.mem_total)
        ),
        theme.level_style(mem_pct),
    ));
    if let Some(history) = mem_history.get(gpu.index) {
        spans.push(Span::styled(
            sparkline(history.iter().copied(), spark_width),
            theme.dim_style(),
        ));
    }
    Line::from(spans)
}
