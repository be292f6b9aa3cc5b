//! Data entry grid view: paginated, inline-editable rows.

use crate::state::App;
use crate::widgets::{DetailPanel, RecordTable, TableStyle};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tala_core::page_len;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[0]);

    let schema = app.schema();
    let title = if app.grid.pager.loading {
        format!("{} (loading...)", schema.title)
    } else {
        schema.title.clone()
    };
    let table = RecordTable {
        title,
        columns: &schema.columns,
        records: &app.grid.records,
        selected: Some(app.grid.selected),
        style: TableStyle {
            header: Style::default().fg(app.theme.secondary),
            row: Style::default().fg(app.theme.text),
            selected: Style::default()
                .fg(app.theme.primary)
                .bg(app.theme.bg_highlight),
        },
    };
    table.render(f, columns[0]);

    render_detail(f, app, columns[1]);
    render_editor_bar(f, app, chunks[1]);
    render_pagination(f, app, chunks[2]);
}

/// Inline row editor: one cell at a time, committed as a whole row.
fn render_editor_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let line = if let Some(editor) = &app.grid.editor {
        let mut spans = Vec::new();
        for (i, cell) in editor.cells.iter().enumerate() {
            let style = if i == editor.active {
                Style::default()
                    .fg(app.theme.primary)
                    .bg(app.theme.bg_highlight)
            } else {
                Style::default().fg(app.theme.text_dim)
            };
            spans.push(Span::styled(
                format!(" {}: {} ", cell.header, cell.text),
                style,
            ));
        }
        Line::from(spans)
    } else {
        Line::styled(
            "e edits the selected row in place",
            Style::default().fg(app.theme.text_muted),
        )
    };
    let title = if app.grid.editor.is_some() {
        "Editing (Enter save, Esc discard)"
    } else {
        "Row Editor"
    };
    let paragraph =
        Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_pagination(f: &mut Frame<'_>, app: &App, area: Rect) {
    let pager = &app.grid.pager;
    let showing = page_len(pager.page, pager.limit, pager.total);
    let text = format!(
        "Page {}/{} | {} per page | {} rows shown | {} total",
        pager.page,
        pager.max_page(),
        pager.limit,
        showing,
        pager.total
    );
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text_dim))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(record) = app.grid.selected_record() {
        for column in &app.schema().columns {
            let value = record
                .get(&column.field)
                .map(|v| v.display())
                .unwrap_or_default();
            fields.push((column.header.clone(), value));
        }
    }
    let detail = DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
    };
    detail.render(f, area);
}
