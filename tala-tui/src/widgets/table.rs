//! Paginated record table widget.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use tala_core::{ColumnSchema, FieldValue, Record};

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub header: Style,
    pub row: Style,
    pub selected: Style,
}

pub struct RecordTable<'a> {
    pub title: String,
    pub columns: &'a [ColumnSchema],
    pub records: &'a [Record],
    pub selected: Option<usize>,
    pub style: TableStyle,
}

impl<'a> RecordTable<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let header = Row::new(
            self.columns
                .iter()
                .map(|c| Cell::from(c.header.clone()))
                .collect::<Vec<_>>(),
        )
        .style(self.style.header);

        let rows: Vec<Row> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let style = if Some(i) == self.selected {
                    self.style.selected
                } else {
                    self.style.row
                };
                Row::new(
                    self.columns
                        .iter()
                        .map(|c| {
                            Cell::from(
                                record
                                    .get(&c.field)
                                    .map(FieldValue::display)
                                    .unwrap_or_default(),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
                .style(style)
            })
            .collect();

        let widths = column_widths(self.columns.len());
        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .title(self.title.clone())
                .borders(Borders::ALL),
        );
        f.render_widget(table, area);
    }
}

fn column_widths(count: usize) -> Vec<Constraint> {
    let share = (100 / count.max(1)) as u16;
    vec![Constraint::Percentage(share); count.max(1)]
}
