//! Report view: filtered, read-only listing.

use crate::state::App;
use crate::widgets::{FilterBar, FilterEntry, RecordTable, TableStyle};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tala_core::page_len;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let entries: Vec<FilterEntry> = app
        .report
        .filters
        .iter()
        .enumerate()
        .map(|(i, input)| FilterEntry {
            label: input.label.clone(),
            value: input.value.clone(),
            active: i == app.report.active,
            editing: i == app.report.active && app.report.editing,
        })
        .collect();
    let bar = FilterBar {
        title: "Filters (ANDed)",
        entries: &entries,
        active_style: Style::default()
            .fg(app.theme.primary)
            .bg(app.theme.bg_highlight),
        inactive_style: Style::default().fg(app.theme.text_dim),
        editing_style: Style::default()
            .fg(app.theme.secondary)
            .bg(app.theme.bg_highlight),
    };
    bar.render(f, chunks[0]);

    let schema = app.schema();
    let title = if app.report.pager.loading {
        format!("Report - {} (loading...)", schema.title)
    } else {
        format!("Report - {}", schema.title)
    };
    let table = RecordTable {
        title,
        columns: &schema.columns,
        records: &app.report.records,
        selected: None,
        style: TableStyle {
            header: Style::default().fg(app.theme.secondary),
            row: Style::default().fg(app.theme.text),
            selected: Style::default().fg(app.theme.text),
        },
    };
    table.render(f, chunks[1]);

    let pager = &app.report.pager;
    let text = format!(
        "Page {}/{} | {} rows shown | {} matching",
        pager.page,
        pager.max_page(),
        page_len(pager.page, pager.limit, pager.total),
        pager.total
    );
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text_dim))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, chunks[2]);
}
