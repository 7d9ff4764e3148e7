// SPDX-License-Identifier: MIT
use std::time::SystemTime;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{format_bytes, gradient_bar};
use crate::sampler::FrameSnapshot;
use crate::sampler::oom::{OomEvent, OomSource};
use crate::tui::gradient::GradientColorCache;
use crate::tui::theme::Theme;

pub fn render(
    frame: &mut ratatui::Frame,
    area: Rect,
    snapshot: &FrameSnapshot,
    theme: &Theme,
    cache: &mut GradientColorCache,
) {
    let block = Block::default()
        .title(" Memory ")
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title_style(theme.title_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 12 || inner.height < 2 {
        return;
    }

    let bar_width = usize::from(inner.width).saturating_sub(12).clamp(10, 40);
    let mem = &snapshot.memory;
    let ram_pct = mem.used_pct();
    let swap_pct = mem.swap_pct();

    let mut ram_line = vec![Span::raw("RAM  ")];
    ram_line.extend(gradient_bar(
        ram_pct,
        bar_width,
        theme.mem_gradient,
        theme,
        cache,
    ));
    ram_line.push(Span::styled(
        format!(" {ram_pct:5.1}%"),
        theme.level_style(ram_pct),
    ));

    let mut swap_line = vec![Span::raw("Swap ")];
    swap_line.extend(gradient_bar(
        swap_pct,
        bar_width,
        theme.mem_gradient,
        theme,
        cache,
    ));
    swap_line.push(Span::styled(
        format!(" {swap_pct:5.1}%"),
        theme.level_style(swap_pct),
    ));

    let lines = vec![
        Line::from(ram_line),
        Line::from(Span::styled(
            format!(
                "  Used: {}  Free: {}  Total: {}",
                format_bytes(mem.used),
                format_bytes(mem.available),
                format_bytes(mem.total),
            ),
            theme.dim_style(),
        )),
        Line::from(swap_line),
        Line::from(Span::styled(
            format!(
                "  Used: {}  Total: {}",
                format_bytes(mem.swap_used),
                format_bytes(mem.swap_total),
            ),
            theme.dim_style(),
        )),
        Line::from(""),
        oom_line(snapshot.last_oom.as_ref(), theme),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn oom_line(event: Option<&OomEvent>, theme: &Theme) -> Line<'static> {
    match event {
        Some(event) => {
            let pid = event
                .pid
                .map_or_else(String::new, |pid| format!(" (pid {pid})"));
            let source = match event.source {
                OomSource::Kernel => "kernel",
                OomSource::OomDaemon => "oomd",
            };
            let ago = format_ago(event.timestamp, unix_now());
            Line::from(Span::styled(
                format!(
                    "Last OOM kill: {}{pid} \u{00b7} {ago} \u{00b7} {source}",
                    event.process_name
                ),
                Style::default().fg(theme.crit),
            ))
        }
        None => Line::from(Span::styled(
            "No OOM kills in the last 8h".to_owned(),
            theme.dim_style(),
        )),
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Compact age of an event: seconds under a minute, then minutes, then
/// hours.
fn format_ago(event_ts: f64, now_ts: f64) -> String {
    let seconds = (now_ts - event_ts).max(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = seconds as u64;
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ago_scales_by_magnitude() {
        assert_eq!(format_ago(1000.0, 1005.0), "5s ago");
        assert_eq!(format_ago(1000.0, 1000.0 + 180.0), "3m ago");
        assert_eq!(format_ago(1000.0, 1000.0 + 2.0 * 3600.0), "2h ago");
    }

    #[test]
    fn future_timestamps_clamp_to_now() {
        assert_eq!(format_ago(2000.0, 1000.0), "0s ago");
    }
}
