//! Cell and record validation.
//!
//! Validation happens at two boundaries: the migrator checks raw tabular
//! cells against column types before anything is submitted, and the REST
//! gateway checks whole records against the form schema before create/update
//! requests leave the client.

use crate::schema::{FormSchema, ValueType, WidgetKind};
use crate::value::{FieldValue, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single cell failed validation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CellErrorKind {
    #[error("not a number")]
    NotANumber,
    #[error("not a date (expected YYYY-MM-DD)")]
    NotADate,
    #[error("not in the option list")]
    NotAnOption,
    #[error("required")]
    Required,
    #[error("not a declared field")]
    UnknownField,
    #[error("wrong type")]
    WrongType,
}

/// One flagged cell. Mirrors the backend's 422 error detail, so payloads
/// deserialize straight into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellError {
    pub row: usize,
    pub field: String,
    #[serde(rename = "msg")]
    pub message: String,
}

impl CellError {
    pub fn new(row: usize, field: impl Into<String>, kind: CellErrorKind) -> Self {
        Self {
            row,
            field: field.into(),
            message: kind.to_string(),
        }
    }
}

/// Parse one raw migrator cell against its column's declared type.
///
/// Empty input becomes `Null`; the caller decides whether that is acceptable
/// for the column.
pub fn check_cell(value_type: ValueType, raw: &str) -> Result<FieldValue, CellErrorKind> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }
    match value_type {
        ValueType::Number => raw
            .parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|_| CellErrorKind::NotANumber),
        ValueType::Date => parse_date(raw)
            .map(FieldValue::Date)
            .ok_or(CellErrorKind::NotADate),
        ValueType::Text | ValueType::Select => Ok(FieldValue::Text(raw.to_string())),
    }
}

/// Check a record against the form schema: required fields, declared types,
/// select membership. Keys outside the schema are ignored here - fetched
/// records carry backend-owned attributes the client must not reject.
pub fn check_record(schema: &FormSchema, record: &Record) -> Vec<CellError> {
    let mut errors = Vec::new();

    for field in &schema.fields {
        let value = record.get(&field.name);
        let missing = matches!(value, None | Some(FieldValue::Null));
        if missing {
            if field.required {
                errors.push(CellError::new(0, &field.name, CellErrorKind::Required));
            }
            continue;
        }
        let value = value.unwrap_or(&FieldValue::Null);
        if let Some(kind) = conformance_error(field.widget, &field.options, value) {
            errors.push(CellError::new(0, &field.name, kind));
        }
    }

    errors
}

/// Flag keys that are not declared by the schema. Applied to newly built
/// records only, so a create submits exactly the declared fields.
pub fn check_unknown_fields(schema: &FormSchema, record: &Record) -> Vec<CellError> {
    record
        .values
        .keys()
        .filter(|key| schema.field(key).is_none())
        .map(|key| CellError::new(0, key, CellErrorKind::UnknownField))
        .collect()
}

fn conformance_error(
    widget: WidgetKind,
    options: &[crate::schema::SelectOption],
    value: &FieldValue,
) -> Option<CellErrorKind> {
    match widget {
        WidgetKind::Number => match value {
            FieldValue::Number(_) => None,
            _ => Some(CellErrorKind::WrongType),
        },
        WidgetKind::Date => match value {
            FieldValue::Date(_) => None,
            FieldValue::Text(s) if parse_date(s).is_some() => None,
            _ => Some(CellErrorKind::NotADate),
        },
        WidgetKind::Select => match value {
            FieldValue::Text(s) => {
                if options.iter().any(|o| o.value == *s) {
                    None
                } else {
                    Some(CellErrorKind::NotAnOption)
                }
            }
            // Year selects come back from the backend as numbers.
            FieldValue::Number(n) => {
                let s = FieldValue::Number(*n).display();
                if options.iter().any(|o| o.value == s) {
                    None
                } else {
                    Some(CellErrorKind::NotAnOption)
                }
            }
            _ => Some(CellErrorKind::WrongType),
        },
        WidgetKind::MultiSelect => match value {
            FieldValue::List(_) => None,
            _ => Some(CellErrorKind::WrongType),
        },
        WidgetKind::Text => match value {
            FieldValue::Text(_)
            | FieldValue::Date(_)
            | FieldValue::Number(_)
            | FieldValue::Bool(_) => None,
            _ => Some(CellErrorKind::WrongType),
        },
    }
}

/// Accepts `YYYY-MM-DD` and the date prefix of an RFC 3339 timestamp, the two
/// shapes the backend is known to store.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            if raw.as_bytes().get(10) == Some(&b'T') {
                return Some(date);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{form_schema, FormKind};
    use proptest::prelude::*;

    #[test]
    fn number_cells_parse_or_flag() {
        assert_eq!(
            check_cell(ValueType::Number, "2024"),
            Ok(FieldValue::Number(2024.0))
        );
        assert_eq!(
            check_cell(ValueType::Number, "abc"),
            Err(CellErrorKind::NotANumber)
        );
        assert_eq!(check_cell(ValueType::Number, "  "), Ok(FieldValue::Null));
    }

    #[test]
    fn date_cells_accept_iso_timestamps() {
        assert!(check_cell(ValueType::Date, "2024-03-11").is_ok());
        assert!(check_cell(ValueType::Date, "2024-03-11T00:00:00.000Z").is_ok());
        assert_eq!(
            check_cell(ValueType::Date, "11/03/2024"),
            Err(CellErrorKind::NotADate)
        );
    }

    #[test]
    fn missing_required_field_is_flagged() {
        let schema = form_schema(FormKind::Biodiversity4);
        let record = Record::new().with("province", FieldValue::from("Marinduque"));
        let errors = check_record(schema, &record);
        assert!(errors
            .iter()
            .any(|e| e.field == "calendar_year" && e.message == "required"));
    }

    #[test]
    fn extraneous_keys_flagged_only_on_new_records() {
        let schema = form_schema(FormKind::Biodiversity4);
        let record = Record::new().with("no_such_field", FieldValue::from("x"));
        let errors = check_unknown_fields(schema, &record);
        assert!(errors.iter().any(|e| e.field == "no_such_field"));

        // Fetched records carry backend attributes; conformance ignores them.
        let mut fetched = Record::new()
            .with("calendar_year", FieldValue::Number(2024.0))
            .with("created_at", FieldValue::from("2024-01-01T00:00:00Z"));
        fetched.id = Some("663f".to_string());
        assert!(check_record(schema, &fetched)
            .iter()
            .all(|e| e.field != "created_at"));
    }

    proptest! {
        #[test]
        fn numeric_text_always_parses_as_number(n in -1.0e12f64..1.0e12) {
            let value = check_cell(ValueType::Number, &n.to_string()).unwrap();
            prop_assert!(matches!(value, FieldValue::Number(parsed) if parsed == n));
        }

        #[test]
        fn arbitrary_text_never_fails_text_columns(s in ".{0,64}") {
            prop_assert!(check_cell(ValueType::Text, &s).is_ok());
            // Date checking flags bad input but never panics on it.
            let _ = check_cell(ValueType::Date, &s);
        }
    }

    #[test]
    fn select_membership_enforced() {
        let schema = form_schema(FormKind::Biodiversity4);
        let mut record = Record::new()
            .with("calendar_year", FieldValue::Number(2024.0))
            .with("municipality", FieldValue::from("Boac"))
            .with("status", FieldValue::from("Good"));
        assert!(check_record(schema, &record)
            .iter()
            .all(|e| e.field != "status"));
        record.set("status", FieldValue::from("Pristine"));
        assert!(check_record(schema, &record)
            .iter()
            .any(|e| e.field == "status"));
    }
}
