//! Error log view: structured validation failures captured from batch saves.

use crate::state::App;
use crate::widgets::DetailPanel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = app
        .error_log
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = format!(
                "{} {} ({} fields)",
                entry.at.format("%Y-%m-%d %H:%M"),
                entry.form.slug(),
                entry.error.errors.len()
            );
            let style = if i == app.error_log_cursor {
                Style::default()
                    .fg(app.theme.primary)
                    .bg(app.theme.bg_highlight)
            } else {
                Style::default().fg(app.theme.text)
            };
            ListItem::new(Line::styled(label, style))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(format!("Validation Failures ({})", app.error_log.len()))
            .borders(Borders::ALL),
    );
    f.render_widget(list, chunks[0]);

    let mut fields = Vec::new();
    if let Some(entry) = app.error_log.entries().get(app.error_log_cursor) {
        fields.push(("Form".to_string(), entry.form.slug().to_string()));
        fields.push(("Message".to_string(), entry.error.msg.clone()));
        for cell in &entry.error.errors {
            fields.push((
                format!("Row {} / {}", cell.row, cell.field),
                cell.message.clone(),
            ));
        }
    }
    let detail = DetailPanel {
        title: "Detail",
        fields,
        style: Style::default().fg(app.theme.secondary),
    };
    detail.render(f, chunks[1]);
}
