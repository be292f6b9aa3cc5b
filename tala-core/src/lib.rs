//! TALA Core - Schema and Record Types
//!
//! Pure data structures and validation for schema-driven forms. All other
//! crates depend on this. This crate contains no I/O - the REST gateway and
//! the terminal UI live in `tala-tui`.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod schema;
pub mod validate;
pub mod value;

pub use catalog::{form_schema, FormKind, Sector};
pub use error::SchemaError;
pub use filter::RecordFilter;
pub use schema::{ColumnSchema, FieldSchema, FormSchema, SelectOption, ValueType, WidgetKind};
pub use validate::{check_cell, check_record, check_unknown_fields, CellError, CellErrorKind};
pub use value::{page_len, FieldValue, Page, Record};

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
