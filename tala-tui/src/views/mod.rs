//! View rendering dispatch.

pub mod catalog;
pub mod config;
pub mod drawer;
pub mod error_log;
pub mod grid;
pub mod migrator;
pub mod report;

use crate::nav::View;
use crate::state::App;
use crate::theme::notification_color;
use crate::widgets::confirm::{centered_rect, ConfirmDialog};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::FormCatalog => catalog::render(f, app, layout[1]),
        View::DataEntry => grid::render(f, app, layout[1]),
        View::Migrator => migrator::render(f, app, layout[1]),
        View::Reports => report::render(f, app, layout[1]),
        View::ErrorLog => error_log::render(f, app, layout[1]),
        View::ConfigViewer => config::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if app.drawer.is_some() {
        drawer::render(f, app, layout[1]);
    }
    if let Some(confirm) = &app.confirm_delete {
        let dialog = ConfirmDialog {
            title: "Confirm Delete",
            message: format!("Delete this row? {}", confirm.summary),
            style: Style::default().fg(app.theme.text),
            hint_style: Style::default().fg(app.theme.text_dim),
        };
        dialog.render(f, f.size());
    }
    if let Some(modal) = &app.modal {
        render_modal(f, app, modal);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let schema = app.schema();
    let session = match app.session.read() {
        Ok(session) if session.is_idle() => "idle",
        Ok(_) => "active",
        Err(_) => "unknown",
    };
    let title = format!(
        "TALA | {} / {} | {} | session: {}",
        app.active_form.sector().title(),
        schema.title,
        app.active_view.title(),
        session
    );
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default().fg(app.theme.primary),
    ));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let help = match app.active_view {
        View::FormCatalog => "j/k move • Enter open • Tab switch view • q quit",
        View::DataEntry => {
            "j/k move • n new • e edit • d delete • [ ] page • = page size • r refresh • q quit"
        }
        View::Migrator => "l load rows • s submit • c clear • j/k scroll • q quit",
        View::Reports => "j/k field • Enter edit/apply • c clear • [ ] page • q quit",
        View::ErrorLog => "j/k move • c clear log • q quit",
        View::ConfigViewer => "Tab switch view • q quit",
    };
    let (text, style) = if let Some(note) = app.notifications.last() {
        let label = match note.level {
            crate::notifications::NotificationLevel::Info => "INFO",
            crate::notifications::NotificationLevel::Warning => "WARN",
            crate::notifications::NotificationLevel::Error => "ERROR",
            crate::notifications::NotificationLevel::Success => "SUCCESS",
        };
        (
            format!("{}: {}", label, note.message),
            Style::default().fg(notification_color(&note.level, &app.theme)),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn render_modal(f: &mut Frame<'_>, app: &App, modal: &crate::state::Modal) {
    let area = centered_rect(60, 40, f.size());
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(modal.message.clone())
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(modal.title.clone())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focus)),
        );
    f.render_widget(paragraph, area);
}
