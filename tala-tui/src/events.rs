//! Event types for the TUI event loop.

use crate::api_client::ApiClientError;
use crossterm::event::KeyEvent;
use tala_api::BatchSaveResponse;
use tala_core::{FormKind, Page, Record};

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Api(ApiOutcome),
    TokensRefreshed,
    ApiError(String),
}

/// Which listing a fetched page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Grid,
    Report,
}

/// Completion of a spawned gateway call, delivered back to the event loop.
///
/// Page results carry the fetch generation they were issued for; the state
/// layer drops any response older than the latest request.
#[derive(Debug)]
pub enum ApiOutcome {
    Page {
        target: FetchTarget,
        form: FormKind,
        generation: u64,
        result: Result<Page, ApiClientError>,
    },
    Created {
        form: FormKind,
        result: Result<Record, ApiClientError>,
    },
    Updated {
        form: FormKind,
        result: Result<Record, ApiClientError>,
    },
    Deleted {
        form: FormKind,
        result: Result<(), ApiClientError>,
    },
    BatchSaved {
        form: FormKind,
        result: Result<BatchSaveResponse, ApiClientError>,
    },
}
