//! Data migrator view: bulk rows validated per column before a single batch
//! save.

use crate::state::{App, MigratorStatus};
use crate::theme::cell_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    render_rows(f, app, chunks[0]);
    render_summary(f, app, chunks[1]);
}

fn render_rows(f: &mut Frame<'_>, app: &App, area: Rect) {
    let schema = app.schema();
    let header = Row::new(
        schema
            .columns
            .iter()
            .map(|c| Cell::from(c.field.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(app.theme.secondary));

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = app
        .migrator
        .rows
        .iter()
        .skip(app.migrator.scroll)
        .take(visible)
        .map(|row| {
            Row::new(
                row.cells
                    .iter()
                    .map(|cell| {
                        let flagged = cell.parsed.is_err();
                        let text = if flagged {
                            format!("!{}", cell.raw)
                        } else {
                            cell.raw.clone()
                        };
                        Cell::from(text)
                            .style(Style::default().fg(cell_color(flagged, &app.theme)))
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let count = schema.columns.len().max(1);
    let widths = vec![Constraint::Percentage((100 / count) as u16); count];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("Migration - {}", schema.title))
            .borders(Borders::ALL),
    );
    f.render_widget(table, area);
}

fn render_summary(f: &mut Frame<'_>, app: &App, area: Rect) {
    let flagged = app.migrator.flagged_rows();
    let loaded = app.migrator.rows.len();
    let status = match &app.migrator.status {
        MigratorStatus::Idle => String::new(),
        MigratorStatus::Saving => " | saving...".to_string(),
        MigratorStatus::Saved { inserted, failed } => {
            format!(" | last save: {inserted} written, {failed} rejected")
        }
    };
    let text = format!(
        "{} rows loaded, {} flagged, {} submittable{}",
        loaded,
        flagged,
        loaded - flagged,
        status
    );
    let style = if flagged > 0 {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().fg(app.theme.text_dim)
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().title("Batch").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
