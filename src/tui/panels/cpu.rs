// SPDX-License-Identifier: MIT
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{gradient_bar, sparkline};
use crate::sampler::FrameSnapshot;
use crate::sampler::history::HistoryBuffer;
use crate::tui::gradient::GradientColorCache;
use crate::tui::theme::Theme;

pub fn render(
    frame: &mut ratatui::Frame,
    area: Rect,
    snapshot: &FrameSnapshot,
    history: &HistoryBuffer<f64>,
    theme: &Theme,
    cache: &mut GradientColorCache,
) {
    let block = Block::default()
        .title(" CPU ")
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title_style(theme.title_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 12 || inner.height < 2 {
        return;
    }

    let bar_width = usize::from(inner.width).saturating_sub(12).clamp(10, 40);
    let pct = snapshot.cpu_pct;

    let mut load_line = vec![Span::raw("Load ")];
    load_line.extend(gradient_bar(pct, bar_width, theme.cpu_gradient, theme, cache));
    load_line.push(Span::styled(format!(" {pct:5.1}%"), theme.level_style(pct)));

    let freq = snapshot
        .freq_mhz
        .map_or_else(|| "n/a".to_owned(), |mhz| format!("{mhz:.0} MHz"));

    let lines = vec![
        Line::from(load_line),
        Line::from(Span::styled(
            format!("Cores: {}   Freq: {freq}", snapshot.cores),
            theme.dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            sparkline(history.iter().copied(), usize::from(inner.width)),
            theme.level_style(pct),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
