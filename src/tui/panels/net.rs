// SPDX-License-Identifier: MIT
use num_format::{Locale, ToFormattedString};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{format_rate, sparkline};
use crate::sampler::FrameSnapshot;
use crate::sampler::history::HistoryBuffer;
use crate::tui::theme::Theme;

pub fn render(
    frame: &mut ratatui::Frame,
    area: Rect,
    snapshot: &FrameSnapshot,
    recv_history: &HistoryBuffer<f64>,
    sent_history: &HistoryBuffer<f64>,
    theme: &Theme,
) {
    let block = Block::default()
        .title(" Network ")
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title_style(theme.title_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 24 || inner.height < 1 {
        return;
    }

    let net = &snapshot.net;
    let spark_width = usize::from(inner.width).saturating_sub(44).clamp(8, 40);

    let down_line = direction_line(
        "Down",
        net.recv_rate,
        net.recv_peak,
        recv_history,
        spark_width,
        theme,
    );
    let up_line = direction_line(
        "Up  ",
        net.sent_rate,
        net.sent_peak,
        sent_history,
        spark_width,
        theme,
    );
    let totals = Line::from(Span::styled(
        format!(
            "Total received {} B \u{00b7} sent {} B",
            net.total_recv.to_formatted_string(&Locale::en),
            net.total_sent.to_formatted_string(&Locale::en),
        ),
        theme.dim_style(),
    ));

    frame.render_widget(Paragraph::new(vec![down_line, up_line, totals]), inner);
}

fn direction_line(
    label: &'static str,
    rate: f64,
    peak: f64,
    history: &HistoryBuffer<f64>,
    spark_width: usize,
    theme: &Theme,
) -> Line<'static> {
    // Sparkline glyphs want 0-100; scale the raw rates by the running peak.
    let scale = if peak > 0.0 { 100.0 / peak } else { 0.0 };
    let scaled = history.iter().map(|rate| rate * scale);
    Line::from(vec![
        Span::styled(format!("{label} "), theme.title_style()),
        Span::styled(sparkline(scaled, spark_width), theme.dim_style()),
        Span::raw(format!(
            "  {:>10} (peak {})",
            format_rate(rate),
            format_rate(peak)
        )),
    ])
}
