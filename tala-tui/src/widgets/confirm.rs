//! Centered confirmation dialog.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct ConfirmDialog<'a> {
    pub title: &'a str,
    pub message: String,
    pub style: Style,
    pub hint_style: Style,
}

impl<'a> ConfirmDialog<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let dialog = centered_rect(50, 20, area);
        f.render_widget(Clear, dialog);
        let lines = vec![
            Line::raw(self.message.clone()),
            Line::raw(""),
            Line::styled("Enter confirm  -  Esc cancel", self.hint_style),
        ];
        let paragraph = Paragraph::new(lines)
            .style(self.style)
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, dialog);
    }
}

/// A rect centered in `area` taking the given percentage of each dimension.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
