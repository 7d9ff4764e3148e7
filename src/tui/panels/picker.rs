// SPDX-License-Identifier: MIT
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::theme::{THEMES, Theme};

/// Centered popup listing the available themes. The selection highlight
/// moves with the arrows; the active theme is marked.
pub fn render(frame: &mut ratatui::Frame, area: Rect, selected: usize, current: &Theme) {
    let width = 26u16.min(area.width);
    #[allow(clippy::cast_possible_truncation)]
    let height = (THEMES.len() as u16 + 2).min(area.height);
    if width < 10 || height < 3 {
        return;
    }
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let lines: Vec<Line<'static>> = THEMES
        .iter()
        .enumerate()
        .map(|(index, theme)| {
            let marker = if theme.name == current.name { "*" } else { " " };
            let text = format!(" {marker} {:<18}", theme.name);
            if index == selected {
                Line::from(Span::styled(text, current.status_bar_style()))
            } else {
                Line::from(Span::raw(text))
            }
        })
        .collect();

    let block = Block::default()
        .title(" Theme ")
        .borders(Borders::ALL)
        .border_style(current.border_style())
        .title_style(current.title_style());

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
