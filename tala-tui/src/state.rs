//! Application state and view state definitions.
//!
//! Everything here is pure state: the event loop in `main` owns the gateway
//! calls and feeds their outcomes back in, so each transition can be tested
//! without a terminal or a backend.

use crate::api_client::{ApiClientError, FormsClient};
use crate::config::TuiConfig;
use crate::error_log::ErrorLogStore;
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::session::SharedSession;
use crate::theme::TerraTheme;
use std::collections::BTreeMap;
use tala_core::{
    check_cell, form_schema, CellError, CellErrorKind, FieldValue, FormKind, FormSchema, Page,
    Record, RecordFilter, SelectOption, ValueType, WidgetKind,
};

// ============================================================================
// PAGINATION
// ============================================================================

/// Shared pagination state for the grid and the report listing.
///
/// Every (re)load bumps `generation`; a response is applied only if it still
/// carries the latest generation, so a slow response for a stale page can
/// never overwrite a newer one.
#[derive(Debug, Clone)]
pub struct Pager {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub loading: bool,
    generation: u64,
}

impl Pager {
    pub fn new(limit: u64) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
            loading: false,
            generation: 0,
        }
    }

    /// Start a fetch; returns the generation token the response must echo.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Whether a response for `generation` is still current.
    pub fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Apply a fetched page. Returns false (and changes nothing) if a newer
    /// fetch has been issued since.
    pub fn apply(&mut self, generation: u64, total: u64) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.total = total;
        self.loading = false;
        true
    }

    /// A failed fetch only clears the loading flag if it was the latest.
    pub fn fail(&mut self, generation: u64) {
        if self.accepts(generation) {
            self.loading = false;
        }
    }

    pub fn max_page(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.max_page() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Changing the page size always resets to page 1 so the next fetch can
    /// not request an out-of-range page.
    pub fn set_limit(&mut self, limit: u64) {
        if limit != self.limit {
            self.limit = limit;
            self.page = 1;
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

// ============================================================================
// DATA ENTRY GRID
// ============================================================================

#[derive(Debug, Clone)]
pub struct GridState {
    pub records: Vec<Record>,
    pub pager: Pager,
    pub selected: usize,
    pub editor: Option<RowEditor>,
}

impl GridState {
    pub fn new(limit: u64) -> Self {
        Self {
            records: Vec::new(),
            pager: Pager::new(limit),
            selected: 0,
            editor: None,
        }
    }

    pub fn apply_page(&mut self, generation: u64, page: Page) -> bool {
        if !self.pager.apply(generation, page.total) {
            return false;
        }
        self.records = page.records;
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
        // Inline edits never survive a reload; the server copy wins.
        self.editor = None;
        true
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.records.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.records.is_empty() {
            self.selected = (self.selected + 1) % self.records.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.records.is_empty() {
            self.selected = if self.selected == 0 {
                self.records.len() - 1
            } else {
                self.selected - 1
            };
        }
    }

    /// Open the inline editor over the selected row.
    pub fn start_edit(&mut self, schema: &FormSchema) -> bool {
        let Some(record) = self.selected_record() else {
            return false;
        };
        self.editor = Some(RowEditor::from_record(schema, record.clone()));
        true
    }
}

/// Inline full-row editor. Commit replaces the whole record server-side.
#[derive(Debug, Clone)]
pub struct RowEditor {
    original: Record,
    pub cells: Vec<CellInput>,
    pub active: usize,
}

#[derive(Debug, Clone)]
pub struct CellInput {
    pub field: String,
    pub header: String,
    pub value_type: ValueType,
    pub text: String,
}

impl RowEditor {
    fn from_record(schema: &FormSchema, record: Record) -> Self {
        let cells = schema
            .columns
            .iter()
            .filter(|c| c.editable)
            .map(|c| CellInput {
                field: c.field.clone(),
                header: c.header.clone(),
                value_type: c.value_type,
                text: record
                    .get(&c.field)
                    .map(FieldValue::display)
                    .unwrap_or_default(),
            })
            .collect();
        Self {
            original: record,
            cells,
            active: 0,
        }
    }

    pub fn next_cell(&mut self) {
        if !self.cells.is_empty() {
            self.active = (self.active + 1) % self.cells.len();
        }
    }

    pub fn prev_cell(&mut self) {
        if !self.cells.is_empty() {
            self.active = if self.active == 0 {
                self.cells.len() - 1
            } else {
                self.active - 1
            };
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(cell) = self.cells.get_mut(self.active) {
            cell.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(cell) = self.cells.get_mut(self.active) {
            cell.text.pop();
        }
    }

    /// Build the replacement record. Unedited and non-editable fields keep
    /// their original values, so the result is a complete row.
    pub fn commit(&self) -> Result<Record, Vec<CellError>> {
        let mut record = self.original.clone();
        let mut errors = Vec::new();
        for cell in &self.cells {
            match check_cell(cell.value_type, &cell.text) {
                Ok(FieldValue::Null) => {
                    record.values.remove(&cell.field);
                }
                Ok(value) => record.set(cell.field.clone(), value),
                Err(kind) => errors.push(CellError::new(0, &cell.field, kind)),
            }
        }
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// ADD-RECORD DRAWER
// ============================================================================

#[derive(Debug, Clone)]
pub enum FieldInputKind {
    Text { text: String },
    Select { cursor: Option<usize> },
    Multi { cursor: usize, chosen: Vec<bool> },
}

#[derive(Debug, Clone)]
pub struct FieldInput {
    pub name: String,
    pub label: String,
    pub widget: WidgetKind,
    pub required: bool,
    pub read_only: bool,
    pub options: Vec<SelectOption>,
    pub value_type: ValueType,
    pub kind: FieldInputKind,
}

impl FieldInput {
    /// Text the drawer renders for the current value.
    pub fn display(&self) -> String {
        match &self.kind {
            FieldInputKind::Text { text } => text.clone(),
            FieldInputKind::Select { cursor } => cursor
                .and_then(|i| self.options.get(i))
                .map(|o| o.label.clone())
                .unwrap_or_default(),
            FieldInputKind::Multi { chosen, .. } => self
                .options
                .iter()
                .zip(chosen)
                .filter(|(_, on)| **on)
                .map(|(o, _)| o.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// State of the add-record drawer. Stays open on failure so the user can fix
/// the flagged fields and retry.
#[derive(Debug, Clone)]
pub struct DrawerState {
    pub form: FormKind,
    pub inputs: Vec<FieldInput>,
    pub active: usize,
    pub field_errors: Vec<CellError>,
    pub submitting: bool,
}

impl DrawerState {
    pub fn new(form: FormKind) -> Self {
        let schema = form_schema(form);
        let inputs = schema
            .fields
            .iter()
            .map(|field| {
                let kind = match field.widget {
                    WidgetKind::Select => FieldInputKind::Select {
                        cursor: field.initial_value.as_ref().and_then(|init| {
                            field.options.iter().position(|o| o.value == init.display())
                        }),
                    },
                    WidgetKind::MultiSelect => FieldInputKind::Multi {
                        cursor: 0,
                        chosen: vec![false; field.options.len()],
                    },
                    _ => FieldInputKind::Text {
                        text: field
                            .initial_value
                            .as_ref()
                            .map(FieldValue::display)
                            .unwrap_or_default(),
                    },
                };
                // Typed per the grid column where one exists, so e.g. a year
                // picked from a select submits as a number.
                let value_type = schema
                    .column(&field.name)
                    .map(|c| c.value_type)
                    .unwrap_or(match field.widget {
                        WidgetKind::Number => ValueType::Number,
                        WidgetKind::Date => ValueType::Date,
                        _ => ValueType::Text,
                    });
                FieldInput {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    widget: field.widget,
                    required: field.required,
                    read_only: field.read_only,
                    options: field.options.clone(),
                    value_type,
                    kind,
                }
            })
            .collect();
        Self {
            form,
            inputs,
            active: 0,
            field_errors: Vec::new(),
            submitting: false,
        }
    }

    pub fn next_field(&mut self) {
        if !self.inputs.is_empty() {
            self.active = (self.active + 1) % self.inputs.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.inputs.is_empty() {
            self.active = if self.active == 0 {
                self.inputs.len() - 1
            } else {
                self.active - 1
            };
        }
    }

    pub fn input(&mut self, c: char) {
        let Some(input) = self.inputs.get_mut(self.active) else {
            return;
        };
        if input.read_only {
            return;
        }
        match &mut input.kind {
            FieldInputKind::Text { text } => text.push(c),
            FieldInputKind::Multi { cursor, chosen } if c == ' ' => {
                if let Some(flag) = chosen.get_mut(*cursor) {
                    *flag = !*flag;
                }
            }
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        let Some(input) = self.inputs.get_mut(self.active) else {
            return;
        };
        if input.read_only {
            return;
        }
        if let FieldInputKind::Text { text } = &mut input.kind {
            text.pop();
        }
    }

    /// Left/right cycles select options or moves the multiselect cursor.
    pub fn step_option(&mut self, forward: bool) {
        let Some(input) = self.inputs.get_mut(self.active) else {
            return;
        };
        if input.read_only || input.options.is_empty() {
            return;
        }
        let len = input.options.len();
        match &mut input.kind {
            FieldInputKind::Select { cursor } => {
                *cursor = Some(match (*cursor, forward) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => {
                        if i == 0 {
                            len - 1
                        } else {
                            i - 1
                        }
                    }
                });
            }
            FieldInputKind::Multi { cursor, .. } => {
                *cursor = if forward {
                    (*cursor + 1) % len
                } else if *cursor == 0 {
                    len - 1
                } else {
                    *cursor - 1
                };
            }
            FieldInputKind::Text { .. } => {}
        }
    }

    /// Build the record to submit: exactly the declared fields, with blank
    /// optional inputs left out entirely.
    pub fn build_record(&self) -> Result<Record, Vec<CellError>> {
        let mut record = Record::new();
        let mut errors = Vec::new();
        for input in &self.inputs {
            let value = match &input.kind {
                FieldInputKind::Text { text } => match check_cell(input.value_type, text) {
                    Ok(value) => value,
                    Err(kind) => {
                        errors.push(CellError::new(0, &input.name, kind));
                        continue;
                    }
                },
                FieldInputKind::Select { cursor } => match cursor.and_then(|i| input.options.get(i))
                {
                    Some(option) => check_cell(input.value_type, &option.value)
                        .unwrap_or_else(|_| FieldValue::Text(option.value.clone())),
                    None => FieldValue::Null,
                },
                FieldInputKind::Multi { chosen, .. } => {
                    let values: Vec<String> = input
                        .options
                        .iter()
                        .zip(chosen)
                        .filter(|(_, on)| **on)
                        .map(|(o, _)| o.value.clone())
                        .collect();
                    if values.is_empty() {
                        FieldValue::Null
                    } else {
                        FieldValue::List(values)
                    }
                }
            };
            if value.is_null() {
                if input.required {
                    errors.push(CellError::new(0, &input.name, CellErrorKind::Required));
                }
                continue;
            }
            record.set(input.name.clone(), value);
        }
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    pub fn set_field_errors(&mut self, errors: Vec<CellError>) {
        self.field_errors = errors;
        self.submitting = false;
    }

    pub fn error_for(&self, field: &str) -> Option<&CellError> {
        self.field_errors.iter().find(|e| e.field == field)
    }
}

// ============================================================================
// DATA MIGRATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct MigratorCell {
    pub raw: String,
    pub parsed: Result<FieldValue, CellErrorKind>,
}

#[derive(Debug, Clone)]
pub struct MigratorRow {
    pub cells: Vec<MigratorCell>,
}

impl MigratorRow {
    pub fn is_valid(&self) -> bool {
        self.cells.iter().all(|c| c.parsed.is_ok())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigratorStatus {
    Idle,
    Saving,
    Saved { inserted: u64, failed: u64 },
}

#[derive(Debug, Clone)]
pub struct MigratorState {
    pub rows: Vec<MigratorRow>,
    pub scroll: usize,
    pub status: MigratorStatus,
}

impl MigratorState {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            scroll: 0,
            status: MigratorStatus::Idle,
        }
    }

    /// Ingest externally parsed rows (field name -> raw text), validating
    /// every cell against its column's declared type. Invalid cells flag the
    /// row; they never abort the load.
    pub fn load(&mut self, schema: &FormSchema, raw_rows: Vec<BTreeMap<String, String>>) {
        self.rows = raw_rows
            .into_iter()
            .map(|raw| MigratorRow {
                cells: schema
                    .columns
                    .iter()
                    .map(|column| {
                        let text = raw.get(&column.field).cloned().unwrap_or_default();
                        MigratorCell {
                            parsed: check_cell(column.value_type, &text),
                            raw: text,
                        }
                    })
                    .collect(),
            })
            .collect();
        self.scroll = 0;
        self.status = MigratorStatus::Idle;
    }

    pub fn flagged_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_valid()).count()
    }

    /// The submittable batch: well-formed rows only, as records.
    pub fn valid_records(&self, schema: &FormSchema) -> Vec<Record> {
        self.rows
            .iter()
            .filter(|row| row.is_valid())
            .map(|row| {
                let mut record = Record::new();
                for (column, cell) in schema.columns.iter().zip(&row.cells) {
                    if let Ok(value) = &cell.parsed {
                        if !value.is_null() {
                            record.set(column.field.clone(), value.clone());
                        }
                    }
                }
                record
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.scroll = 0;
        self.status = MigratorStatus::Idle;
    }
}

impl Default for MigratorState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone)]
pub struct FilterInput {
    pub field: String,
    pub label: String,
    pub value: String,
}

/// Read-only filtered listing. Filters are ANDed; no mutation path exists
/// from this view.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub filters: Vec<FilterInput>,
    pub active: usize,
    pub editing: bool,
    pub records: Vec<Record>,
    pub pager: Pager,
}

impl ReportState {
    pub fn new(form: FormKind, limit: u64) -> Self {
        Self {
            filters: Self::filters_for(form),
            active: 0,
            editing: false,
            records: Vec::new(),
            pager: Pager::new(limit),
        }
    }

    fn filters_for(form: FormKind) -> Vec<FilterInput> {
        form_schema(form)
            .fields
            .iter()
            .map(|f| FilterInput {
                field: f.name.clone(),
                label: f.label.clone(),
                value: String::new(),
            })
            .collect()
    }

    pub fn rebuild_for(&mut self, form: FormKind) {
        self.filters = Self::filters_for(form);
        self.active = 0;
        self.editing = false;
        self.records.clear();
        self.pager.total = 0;
        self.pager.reset();
    }

    pub fn filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new();
        for input in &self.filters {
            filter.push(input.field.clone(), input.value.clone());
        }
        filter
    }

    pub fn clear_filters(&mut self) {
        for input in &mut self.filters {
            input.value.clear();
        }
    }

    pub fn apply_page(&mut self, generation: u64, page: Page) -> bool {
        if !self.pager.apply(generation, page.total) {
            return false;
        }
        self.records = page.records;
        true
    }
}

// ============================================================================
// OVERLAYS
// ============================================================================

/// Delete waits for an explicit confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmDelete {
    pub form: FormKind,
    pub id: String,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

// ============================================================================
// ROOT STATE
// ============================================================================

pub struct App {
    pub config: TuiConfig,
    pub theme: TerraTheme,
    pub api: FormsClient,
    pub session: SharedSession,

    pub active_view: View,
    pub active_form: FormKind,
    pub catalog_cursor: usize,

    pub grid: GridState,
    pub drawer: Option<DrawerState>,
    pub migrator: MigratorState,
    pub report: ReportState,
    pub error_log: ErrorLogStore,
    pub error_log_cursor: usize,
    pub config_view_content: String,

    pub notifications: Vec<Notification>,
    pub confirm_delete: Option<ConfirmDelete>,
    pub modal: Option<Modal>,
}

impl App {
    pub fn new(
        config: TuiConfig,
        api: FormsClient,
        session: SharedSession,
        error_log: ErrorLogStore,
    ) -> Self {
        let limit = config.page_size_options.first().copied().unwrap_or(10);
        let active_form = FormKind::Biodiversity4;
        Self {
            theme: TerraTheme::terra(),
            api,
            session,
            active_view: View::FormCatalog,
            active_form,
            catalog_cursor: 0,
            grid: GridState::new(limit),
            drawer: None,
            migrator: MigratorState::new(),
            report: ReportState::new(active_form, limit),
            error_log,
            error_log_cursor: 0,
            config_view_content: String::new(),
            notifications: Vec::new(),
            confirm_delete: None,
            modal: None,
            config,
        }
    }

    pub fn schema(&self) -> &'static FormSchema {
        form_schema(self.active_form)
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    /// Switch the active form; all per-form view state starts over.
    pub fn set_active_form(&mut self, form: FormKind) {
        if form == self.active_form {
            return;
        }
        self.active_form = form;
        let limit = self
            .config
            .page_size_options
            .first()
            .copied()
            .unwrap_or(10);
        self.grid = GridState::new(limit);
        self.drawer = None;
        self.migrator.clear();
        self.report.rebuild_for(form);
        self.confirm_delete = None;
    }

    /// Cycle to the next configured page size.
    pub fn cycle_page_size(&mut self) {
        let options = &self.config.page_size_options;
        let current = self.grid.pager.limit;
        let idx = options.iter().position(|&l| l == current).unwrap_or(0);
        let next = options[(idx + 1) % options.len()];
        self.grid.pager.set_limit(next);
    }

    /// Settle a finished batch save. A structured validation failure is
    /// captured into the error log; only a success produces a success toast.
    pub fn apply_batch_outcome(
        &mut self,
        form: FormKind,
        result: Result<tala_api::BatchSaveResponse, ApiClientError>,
    ) {
        match result {
            Ok(response) => {
                self.migrator.status = MigratorStatus::Saved {
                    inserted: response.inserted,
                    failed: response.failed,
                };
                self.notify(NotificationLevel::Success, "Data successfully saved.");
            }
            Err(err) => {
                self.migrator.status = MigratorStatus::Idle;
                if let Some(api_error) = err.api_error() {
                    if api_error.is_validation() {
                        self.error_log.push(form, api_error.clone());
                    }
                }
                self.notify(NotificationLevel::Error, err.to_string());
            }
        }
    }
}
