// SPDX-License-Identifier: MIT
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};

use super::format_bytes;
use crate::sampler::process::ProcessSnapshot;
use crate::tui::theme::Theme;

const NAME_MAX: usize = 28;

pub fn render_cpu_table(
    frame: &mut ratatui::Frame,
    area: Rect,
    rows: &[ProcessSnapshot],
    theme: &Theme,
) {
    let header = Row::new(vec!["PID", "Name", "CPU%", "Core%", "Mem%"]).style(theme.title_style());
    let body = rows.iter().map(|process| {
        Row::new(vec![
            Cell::from(process.pid.to_string()),
            Cell::from(clip_name(&process.comm)),
            Cell::from(fmt_opt_pct(process.cpu_pct)),
            Cell::from(fmt_opt_pct(process.cpu_core_pct)),
            Cell::from(format!("{:.1}", process.mem_pct)),
        ])
    });
    let widths = [
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(6),
    ];
    let table = Table::new(body, widths).header(header).block(
        Block::default()
            .title(" Top Processes by CPU ")
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title_style(theme.title_style()),
    );
    frame.render_widget(table, area);
}

pub fn render_mem_table(
    frame: &mut ratatui::Frame,
    area: Rect,
    rows: &[ProcessSnapshot],
    theme: &Theme,
) {
    let header = Row::new(vec!["PID", "Name", "RSS", "Shared", "Mem%"]).style(theme.title_style());
    let body = rows.iter().map(|process| {
        let shared = process
            .shared_bytes
            .map_or_else(|| "--".to_owned(), format_bytes);
        Row::new(vec![
            Cell::from(process.pid.to_string()),
            Cell::from(clip_name(&process.comm)),
            Cell::from(format_bytes(process.rss_bytes)),
            Cell::from(shared),
            Cell::from(format!("{:.1}", process.mem_pct)),
        ])
    });
    let widths = [
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    let table = Table::new(body, widths).header(header).block(
        Block::default()
            .title(" Top Processes by Memory ")
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title_style(theme.title_style()),
    );
    frame.render_widget(table, area);
}

/// A pid's first sample has no baseline; it renders as pending, never as a
/// spurious spike.
fn fmt_opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_owned(), |pct| format!("{pct:.1}"))
}

fn clip_name(comm: &str) -> String {
    if comm.chars().count() <= NAME_MAX {
        comm.to_owned()
    } else {
        let clipped: String = comm.chars().take(NAME_MAX - 2).collect();
        format!("{clipped}..")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_percentages_render_as_dashes() {
        assert_eq!(fmt_opt_pct(None), "--");
        assert_eq!(fmt_opt_pct(Some(42.25)), "42.2");
    }

    #[test]
    fn long_names_are_clipped() {
        let long = "a".repeat(64);
        let clipped = clip_name(&long);
        assert_eq!(clipped.chars().count(), NAME_MAX);
        assert!(clipped.ends_with(".."));
        assert_eq!(clip_name("short"), "short");
    }
}
