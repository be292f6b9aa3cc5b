//! Form catalog view: pick the active sector/form.

use crate::state::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use tala_core::FormKind;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let items: Vec<ListItem> = FormKind::all()
        .iter()
        .enumerate()
        .map(|(i, form)| {
            let marker = if *form == app.active_form { "*" } else { " " };
            let label = format!(
                "{} {:<12} {}",
                marker,
                form.sector().title(),
                form.title()
            );
            let style = if i == app.catalog_cursor {
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
            .title("Report Forms")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_focus)),
    );
    f.render_widget(list, area);
}
