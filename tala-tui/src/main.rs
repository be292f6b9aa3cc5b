//! TALA TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::Duration;
use tala_core::{FormKind, Record, RecordFilter};
use tala_tui::api_client::FormsClient;
use tala_tui::config::TuiConfig;
use tala_tui::error::TuiError;
use tala_tui::error_log::ErrorLogStore;
use tala_tui::events::{ApiOutcome, FetchTarget, TuiEvent};
use tala_tui::keys::{map_editing_key, map_key, Action};
use tala_tui::nav::View;
use tala_tui::notifications::NotificationLevel;
use tala_tui::persistence::{self, PersistedState};
use tala_tui::session::{spawn_refresh_manager, Session};
use tala_tui::state::{App, ConfirmDelete, DrawerState, MigratorStatus, Modal};
use tala_tui::views::render_view;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_logging(&config)?;

    let session = Session::shared(
        tala_api::TokenPair {
            access_token: config.auth.access_token.clone(),
            refresh_token: config.auth.refresh_token.clone(),
        },
        Duration::from_millis(config.idle_threshold_ms),
    );
    let api = FormsClient::new(&config, session.clone())?;
    let error_log = ErrorLogStore::new(config.error_log_path.clone());
    let mut app = App::new(config, api, session, error_log);
    let mut shown = app.config.clone();
    shown.auth.access_token = "<redacted>".to_string();
    shown.auth.refresh_token = "<redacted>".to_string();
    app.config_view_content = format!("{shown:#?}");

    if let Ok(Some(state)) = persistence::load(&app.config.persistence_path) {
        app.active_view = state.active_view;
        app.set_active_form(state.active_form);
        app.catalog_cursor = FormKind::all()
            .iter()
            .position(|f| *f == state.active_form)
            .unwrap_or(0);
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);

    spawn_input_reader(event_tx.clone());
    spawn_refresh_manager(
        app.api.clone(),
        app.session.clone(),
        Duration::from_millis(app.config.token_refresh_interval_ms),
        event_tx.clone(),
    );
    refresh_active_view(&mut app, &event_tx);

    let tick_rate = Duration::from_millis(app.config.tick_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                let _ = event_tx.send(TuiEvent::Tick).await;
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event, &event_tx) {
                    break;
                }
            }
        }
    }

    let persisted = PersistedState {
        active_view: app.active_view,
        active_form: app.active_form,
    };
    let _ = persistence::save(&app.config.persistence_path, &persisted);

    // Quit is logout: drop the token pair and the in-memory error log.
    if let Ok(mut session) = app.session.write() {
        session.clear();
    }
    app.error_log.clear();

    Ok(())
}

fn init_logging(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    // Stdout belongs to the terminal UI; everything goes to the log file.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                match evt {
                    CrosstermEvent::Key(key) => {
                        let _ = sender.blocking_send(TuiEvent::Input(key));
                    }
                    CrosstermEvent::Resize(width, height) => {
                        let _ = sender.blocking_send(TuiEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
        }
    });
}

// ============================================================================
// EVENT HANDLING
// ============================================================================

fn handle_event(app: &mut App, event: TuiEvent, tx: &mpsc::Sender<TuiEvent>) -> bool {
    match event {
        TuiEvent::Input(key) => {
            if let Ok(mut session) = app.session.write() {
                session.touch();
            }
            return handle_input(app, key, tx);
        }
        TuiEvent::Api(outcome) => handle_outcome(app, outcome, tx),
        TuiEvent::ApiError(message) => {
            app.notify(NotificationLevel::Warning, message);
        }
        TuiEvent::TokensRefreshed | TuiEvent::Resize { .. } | TuiEvent::Tick => {}
    }
    false
}

fn handle_input(app: &mut App, key: crossterm::event::KeyEvent, tx: &mpsc::Sender<TuiEvent>) -> bool {
    if app.modal.is_some() {
        app.modal = None;
        return false;
    }
    if app.confirm_delete.is_some() {
        match map_editing_key(key) {
            Some(Action::Confirm) => {
                if let Some(confirm) = app.confirm_delete.take() {
                    spawn_delete(app, confirm, tx);
                }
            }
            Some(Action::Cancel) => app.confirm_delete = None,
            _ => {}
        }
        return false;
    }
    if app.drawer.is_some() {
        handle_drawer_key(app, key, tx);
        return false;
    }
    if app.active_view == View::DataEntry && app.grid.editor.is_some() {
        handle_editor_key(app, key, tx);
        return false;
    }
    if app.active_view == View::Reports && app.report.editing {
        handle_filter_key(app, key, tx);
        return false;
    }
    if let Some(action) = map_key(key) {
        return handle_action(app, action, tx);
    }
    false
}

fn handle_drawer_key(app: &mut App, key: crossterm::event::KeyEvent, tx: &mpsc::Sender<TuiEvent>) {
    let Some(action) = map_editing_key(key) else {
        return;
    };
    let Some(drawer) = app.drawer.as_mut() else {
        return;
    };
    match action {
        Action::Input(c) => drawer.input(c),
        Action::Backspace => drawer.backspace(),
        Action::MoveDown => drawer.next_field(),
        Action::MoveUp => drawer.prev_field(),
        Action::MoveRight => drawer.step_option(true),
        Action::MoveLeft => drawer.step_option(false),
        Action::Confirm => {
            if drawer.submitting {
                return;
            }
            match drawer.build_record() {
                Ok(record) => {
                    drawer.submitting = true;
                    drawer.field_errors.clear();
                    spawn_create(app, record, tx);
                }
                Err(errors) => {
                    let message = errors
                        .first()
                        .map(|e| format!("{}: {}", e.field, e.message))
                        .unwrap_or_else(|| "invalid input".to_string());
                    drawer.set_field_errors(errors);
                    app.notify(NotificationLevel::Error, message);
                }
            }
        }
        Action::Cancel => app.drawer = None,
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: crossterm::event::KeyEvent, tx: &mpsc::Sender<TuiEvent>) {
    let Some(action) = map_editing_key(key) else {
        return;
    };
    let Some(editor) = app.grid.editor.as_mut() else {
        return;
    };
    match action {
        Action::Input(c) => editor.input(c),
        Action::Backspace => editor.backspace(),
        Action::MoveRight | Action::MoveDown => editor.next_cell(),
        Action::MoveLeft | Action::MoveUp => editor.prev_cell(),
        Action::Confirm => match editor.commit() {
            Ok(record) => {
                app.grid.editor = None;
                spawn_update(app, record, tx);
            }
            Err(errors) => {
                let message = errors
                    .first()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .unwrap_or_else(|| "invalid cell".to_string());
                app.notify(NotificationLevel::Error, message);
            }
        },
        Action::Cancel => app.grid.editor = None,
        _ => {}
    }
}

fn handle_filter_key(app: &mut App, key: crossterm::event::KeyEvent, tx: &mpsc::Sender<TuiEvent>) {
    let Some(action) = map_editing_key(key) else {
        return;
    };
    match action {
        Action::Input(c) => {
            let active = app.report.active;
            if let Some(input) = app.report.filters.get_mut(active) {
                input.value.push(c);
            }
        }
        Action::Backspace => {
            let active = app.report.active;
            if let Some(input) = app.report.filters.get_mut(active) {
                input.value.pop();
            }
        }
        Action::MoveDown => {
            app.report.active = (app.report.active + 1) % app.report.filters.len().max(1);
        }
        Action::MoveUp => {
            let len = app.report.filters.len().max(1);
            app.report.active = (app.report.active + len - 1) % len;
        }
        Action::Confirm => {
            app.report.editing = false;
            app.report.pager.reset();
            spawn_report_fetch(app, tx);
        }
        Action::Cancel => app.report.editing = false,
        _ => {}
    }
}

fn handle_action(app: &mut App, action: Action, tx: &mpsc::Sender<TuiEvent>) -> bool {
    match action {
        Action::Quit => return true,
        Action::NextView => switch_view(app, app.active_view.next(), tx),
        Action::PrevView => switch_view(app, app.active_view.previous(), tx),
        Action::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                switch_view(app, view, tx);
            }
        }
        Action::MoveDown => move_down(app),
        Action::MoveUp => move_up(app),
        Action::Select | Action::Confirm => confirm_in_view(app, tx),
        Action::NewItem => {
            if app.active_view == View::DataEntry {
                app.drawer = Some(DrawerState::new(app.active_form));
            }
        }
        Action::EditItem => {
            if app.active_view == View::DataEntry && !app.grid.start_edit(app.schema()) {
                app.notify(NotificationLevel::Info, "No row selected.");
            }
        }
        Action::DeleteItem => {
            if app.active_view == View::DataEntry {
                request_delete(app);
            }
        }
        Action::NextPage => {
            match app.active_view {
                View::DataEntry => {
                    if app.grid.pager.next_page() {
                        spawn_grid_fetch(app, tx);
                    }
                }
                View::Reports => {
                    if app.report.pager.next_page() {
                        spawn_report_fetch(app, tx);
                    }
                }
                _ => {}
            }
        }
        Action::PrevPage => {
            match app.active_view {
                View::DataEntry => {
                    if app.grid.pager.prev_page() {
                        spawn_grid_fetch(app, tx);
                    }
                }
                View::Reports => {
                    if app.report.pager.prev_page() {
                        spawn_report_fetch(app, tx);
                    }
                }
                _ => {}
            }
        }
        Action::CyclePageSize => {
            if app.active_view == View::DataEntry {
                app.cycle_page_size();
                spawn_grid_fetch(app, tx);
            }
        }
        Action::LoadRows => {
            if app.active_view == View::Migrator {
                load_migrator_rows(app);
            }
        }
        Action::SubmitBatch => {
            if app.active_view == View::Migrator {
                submit_batch(app, tx);
            }
        }
        Action::ClearView => clear_in_view(app, tx),
        Action::Refresh => refresh_active_view(app, tx),
        Action::OpenHelp => {
            app.modal = Some(Modal {
                title: "Keybindings".to_string(),
                message: "j/k or arrows move, Tab switches views, 1-6 jumps to a view, \
                          n adds a row, e edits in place, d deletes with confirmation, \
                          [ and ] page, = cycles page size, r refreshes, q quits."
                    .to_string(),
            });
        }
        Action::MoveLeft | Action::MoveRight | Action::Cancel => {}
        Action::Input(_) | Action::Backspace => {}
    }
    false
}

fn switch_view(app: &mut App, view: View, tx: &mpsc::Sender<TuiEvent>) {
    if app.active_view == view {
        return;
    }
    app.active_view = view;
    refresh_active_view(app, tx);
}

fn move_down(app: &mut App) {
    match app.active_view {
        View::FormCatalog => {
            app.catalog_cursor = (app.catalog_cursor + 1) % FormKind::all().len();
        }
        View::DataEntry => app.grid.select_next(),
        View::Migrator => {
            if app.migrator.scroll + 1 < app.migrator.rows.len() {
                app.migrator.scroll += 1;
            }
        }
        View::Reports => {
            app.report.active = (app.report.active + 1) % app.report.filters.len().max(1);
        }
        View::ErrorLog => {
            if app.error_log_cursor + 1 < app.error_log.len() {
                app.error_log_cursor += 1;
            }
        }
        View::ConfigViewer => {}
    }
}

fn move_up(app: &mut App) {
    match app.active_view {
        View::FormCatalog => {
            let len = FormKind::all().len();
            app.catalog_cursor = (app.catalog_cursor + len - 1) % len;
        }
        View::DataEntry => app.grid.select_previous(),
        View::Migrator => app.migrator.scroll = app.migrator.scroll.saturating_sub(1),
        View::Reports => {
            let len = app.report.filters.len().max(1);
            app.report.active = (app.report.active + len - 1) % len;
        }
        View::ErrorLog => app.error_log_cursor = app.error_log_cursor.saturating_sub(1),
        View::ConfigViewer => {}
    }
}

fn confirm_in_view(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    match app.active_view {
        View::FormCatalog => {
            if let Some(form) = FormKind::all().get(app.catalog_cursor) {
                app.set_active_form(*form);
                app.active_view = View::DataEntry;
                spawn_grid_fetch(app, tx);
            }
        }
        View::Reports => app.report.editing = true,
        _ => {}
    }
}

fn clear_in_view(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    match app.active_view {
        View::Migrator => {
            app.migrator.clear();
            app.notify(NotificationLevel::Info, "Migration rows cleared.");
        }
        View::Reports => {
            app.report.clear_filters();
            app.report.pager.reset();
            spawn_report_fetch(app, tx);
        }
        View::ErrorLog => {
            app.error_log.clear();
            app.error_log_cursor = 0;
            app.notify(NotificationLevel::Info, "Error log cleared.");
        }
        _ => {}
    }
}

fn request_delete(app: &mut App) {
    let Some(record) = app.grid.selected_record() else {
        app.notify(NotificationLevel::Info, "No row selected.");
        return;
    };
    let Some(id) = record.id.clone() else {
        app.notify(NotificationLevel::Warning, "Row has no id yet; refresh first.");
        return;
    };
    let summary = app
        .schema()
        .columns
        .first()
        .and_then(|c| record.get(&c.field))
        .map(|v| v.display())
        .unwrap_or_default();
    app.confirm_delete = Some(ConfirmDelete {
        form: app.active_form,
        id,
        summary,
    });
}

fn load_migrator_rows(app: &mut App) {
    let path = app.config.migrator_inbox_path.clone();
    let rows = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|contents| {
            serde_json::from_str::<Vec<BTreeMap<String, String>>>(&contents)
                .map_err(|e| e.to_string())
        });
    match rows {
        Ok(rows) => {
            let count = rows.len();
            app.migrator.load(app.schema(), rows);
            let flagged = app.migrator.flagged_rows();
            app.notify(
                NotificationLevel::Info,
                format!("Loaded {count} rows ({flagged} flagged)."),
            );
        }
        Err(err) => {
            app.notify(
                NotificationLevel::Error,
                format!("Could not load {}: {err}", path.display()),
            );
        }
    }
}

fn submit_batch(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    if app.migrator.status == MigratorStatus::Saving {
        return;
    }
    let records = app.migrator.valid_records(app.schema());
    if records.is_empty() {
        app.notify(NotificationLevel::Warning, "No well-formed rows to submit.");
        return;
    }
    let flagged = app.migrator.flagged_rows();
    if flagged > 0 {
        app.notify(
            NotificationLevel::Warning,
            format!("{flagged} flagged rows were left out of the batch."),
        );
    }
    app.migrator.status = MigratorStatus::Saving;
    let client = app.api.clone();
    let form = app.active_form;
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.save_many(form, records).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::BatchSaved { form, result }))
            .await;
    });
}

// ============================================================================
// GATEWAY CALLS
// ============================================================================

fn refresh_active_view(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    match app.active_view {
        View::DataEntry => spawn_grid_fetch(app, tx),
        View::Reports => spawn_report_fetch(app, tx),
        _ => {}
    }
}

fn spawn_grid_fetch(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    let generation = app.grid.pager.begin_fetch();
    let client = app.api.clone();
    let form = app.active_form;
    let page = app.grid.pager.page;
    let limit = app.grid.pager.limit;
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.list(form, page, limit, &RecordFilter::new()).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::Page {
                target: FetchTarget::Grid,
                form,
                generation,
                result,
            }))
            .await;
    });
}

fn spawn_report_fetch(app: &mut App, tx: &mpsc::Sender<TuiEvent>) {
    let generation = app.report.pager.begin_fetch();
    let client = app.api.clone();
    let form = app.active_form;
    let page = app.report.pager.page;
    let limit = app.report.pager.limit;
    let filters = app.report.filter();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.list(form, page, limit, &filters).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::Page {
                target: FetchTarget::Report,
                form,
                generation,
                result,
            }))
            .await;
    });
}

fn spawn_create(app: &mut App, record: Record, tx: &mpsc::Sender<TuiEvent>) {
    let client = app.api.clone();
    let form = app.active_form;
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.create(form, &record).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::Created { form, result }))
            .await;
    });
}

fn spawn_update(app: &mut App, record: Record, tx: &mpsc::Sender<TuiEvent>) {
    let client = app.api.clone();
    let form = app.active_form;
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.update(form, &record).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::Updated { form, result }))
            .await;
    });
}

fn spawn_delete(app: &mut App, confirm: ConfirmDelete, tx: &mpsc::Sender<TuiEvent>) {
    let client = app.api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.delete(confirm.form, &confirm.id).await;
        let _ = tx
            .send(TuiEvent::Api(ApiOutcome::Deleted {
                form: confirm.form,
                result,
            }))
            .await;
    });
}

// ============================================================================
// OUTCOME APPLICATION
// ============================================================================

fn handle_outcome(app: &mut App, outcome: ApiOutcome, tx: &mpsc::Sender<TuiEvent>) {
    match outcome {
        ApiOutcome::Page {
            target,
            form,
            generation,
            result,
        } => {
            if form != app.active_form {
                tracing::debug!(form = form.slug(), "dropping page for inactive form");
                return;
            }
            match (target, result) {
                (FetchTarget::Grid, Ok(page)) => {
                    if !app.grid.apply_page(generation, page) {
                        tracing::debug!(generation, "dropping stale grid page");
                    }
                }
                (FetchTarget::Report, Ok(page)) => {
                    if !app.report.apply_page(generation, page) {
                        tracing::debug!(generation, "dropping stale report page");
                    }
                }
                (FetchTarget::Grid, Err(err)) => {
                    app.grid.pager.fail(generation);
                    app.notify(NotificationLevel::Error, err.to_string());
                }
                (FetchTarget::Report, Err(err)) => {
                    app.report.pager.fail(generation);
                    app.notify(NotificationLevel::Error, err.to_string());
                }
            }
        }
        ApiOutcome::Created { form, result } => match result {
            Ok(_) => {
                app.drawer = None;
                app.notify(NotificationLevel::Success, "Data successfully inserted.");
                spawn_grid_fetch(app, tx);
            }
            Err(err) => {
                if let Some(errors) = err.validation_errors() {
                    let errors = errors.to_vec();
                    if let Some(api_error) = err.api_error() {
                        app.error_log.push(form, api_error.clone());
                    }
                    if let Some(drawer) = app.drawer.as_mut() {
                        drawer.set_field_errors(errors);
                    }
                } else if let Some(drawer) = app.drawer.as_mut() {
                    drawer.submitting = false;
                }
                // The drawer stays open so the user can fix and retry.
                app.notify(NotificationLevel::Error, err.to_string());
            }
        },
        ApiOutcome::Updated { result, .. } => {
            match result {
                Ok(_) => app.notify(NotificationLevel::Success, "Data successfully updated."),
                Err(err) => app.notify(NotificationLevel::Error, err.to_string()),
            }
            // Reload either way so the grid reflects server state.
            spawn_grid_fetch(app, tx);
        }
        ApiOutcome::Deleted { result, .. } => {
            match result {
                Ok(()) => app.notify(NotificationLevel::Success, "Data successfully deleted."),
                Err(err) => app.notify(NotificationLevel::Error, err.to_string()),
            }
            spawn_grid_fetch(app, tx);
        }
        ApiOutcome::BatchSaved { form, result } => app.apply_batch_outcome(form, result),
    }
}
