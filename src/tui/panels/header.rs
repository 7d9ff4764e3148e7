// SPDX-License-Identifier: MIT
use std::time::Duration;

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::sampler::FrameSnapshot;
use crate::tui::theme::Theme;

pub fn render(
    frame: &mut ratatui::Frame,
    area: Rect,
    snapshot: &FrameSnapshot,
    theme: &Theme,
    refresh: Duration,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let version = env!("CARGO_PKG_VERSION");
    let freq = snapshot
        .freq_mhz
        .map_or_else(String::new, |mhz| format!(" @ {mhz:.0} MHz"));
    let text = format!(
        "ktop v{version} | {} cores{freq} | refresh {:.1}s | theme {} | [q] quit  [t] theme",
        snapshot.cores,
        refresh.as_secs_f64(),
        theme.name,
    );

    let line = Line::from(vec![Span::styled(
        format!("{text:<width$}", width = usize::from(area.width)),
        theme.status_bar_style(),
    )]);
    frame.render_widget(Paragraph::new(line), area);
}
