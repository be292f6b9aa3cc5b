//! Add-record drawer, rendered as an overlay on the right half.

use crate::state::{App, FieldInputKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(drawer) = &app.drawer else {
        return;
    };

    let panel = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area)[1];
    f.render_widget(Clear, panel);

    let mut lines = Vec::new();
    for (i, input) in drawer.inputs.iter().enumerate() {
        let focused = i == drawer.active;
        let label_style = if focused {
            Style::default().fg(app.theme.primary)
        } else if input.read_only {
            Style::default().fg(app.theme.text_muted)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        let value = render_value(input, focused, app);
        let mut spans = vec![Span::styled(format!("{:<28} ", input.label), label_style)];
        spans.extend(value);
        lines.push(Line::from(spans));
        if let Some(error) = drawer.error_for(&input.name) {
            lines.push(Line::styled(
                format!("{:<28} ^ {}", "", error.message),
                Style::default().fg(app.theme.error),
            ));
        }
    }
    lines.push(Line::raw(""));
    let hint = if drawer.submitting {
        "Submitting..."
    } else {
        "Enter submit • Esc close • Up/Down field • Left/Right option • Space toggle"
    };
    lines.push(Line::styled(hint, Style::default().fg(app.theme.text_muted)));

    let title = format!("Add Data - {}", app.schema().title);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_focus)),
    );
    f.render_widget(paragraph, panel);
}

fn render_value(
    input: &crate::state::FieldInput,
    focused: bool,
    app: &App,
) -> Vec<Span<'static>> {
    let value_style = Style::default().fg(app.theme.text);
    match &input.kind {
        FieldInputKind::Text { text } => {
            let cursor = if focused && !input.read_only { "_" } else { "" };
            vec![Span::styled(format!("{text}{cursor}"), value_style)]
        }
        FieldInputKind::Select { cursor } => {
            let label = cursor
                .and_then(|i| input.options.get(i))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| "<none>".to_string());
            vec![Span::styled(format!("< {label} >"), value_style)]
        }
        FieldInputKind::Multi { cursor, chosen } => {
            let mut spans = Vec::new();
            for (i, option) in input.options.iter().enumerate() {
                let mark = if chosen.get(i).copied().unwrap_or(false) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if focused && i == *cursor {
                    Style::default().fg(app.theme.primary)
                } else {
                    value_style
                };
                spans.push(Span::styled(format!("{mark} {} ", option.label), style));
            }
            spans
        }
    }
}
