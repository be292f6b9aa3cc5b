//! Filter bar widget for the report view.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone)]
pub struct FilterEntry {
    pub label: String,
    pub value: String,
    pub active: bool,
    pub editing: bool,
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub entries: &'a [FilterEntry],
    pub active_style: Style,
    pub inactive_style: Style,
    pub editing_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let spans: Vec<Span> = self
            .entries
            .iter()
            .map(|entry| {
                let style = if entry.editing {
                    self.editing_style
                } else if entry.active {
                    self.active_style
                } else {
                    self.inactive_style
                };
                let text = if entry.value.is_empty() {
                    format!(" {} ", entry.label)
                } else {
                    format!(" {}={} ", entry.label, entry.value)
                };
                Span::styled(text, style)
            })
            .collect();

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }
}
