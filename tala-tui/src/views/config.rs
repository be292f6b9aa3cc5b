//! Config viewer.

use crate::state::App;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let paragraph = Paragraph::new(app.config_view_content.clone())
        .style(Style::default().fg(app.theme.text_dim))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Config").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
