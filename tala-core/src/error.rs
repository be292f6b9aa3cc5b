//! Error types for TALA core operations.

use crate::catalog::FormKind;
use thiserror::Error;

/// Schema invariant violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field '{field}' in {form:?}")]
    DuplicateField { form: FormKind, field: String },

    #[error("Select field '{field}' in {form:?} has no options")]
    MissingOptions { form: FormKind, field: String },

    #[error("Non-select field '{field}' in {form:?} carries options")]
    UnexpectedOptions { form: FormKind, field: String },

    #[error("Editable column '{field}' in {form:?} has no backing field")]
    UnbackedColumn { form: FormKind, field: String },
}
