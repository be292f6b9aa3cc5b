//! Records, field values, and pages.
//!
//! The backend owns every record; the client holds an in-memory working copy
//! per fetched page and discards it on refresh or navigation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One cell of a record, mapped from the backend's duck-typed JSON.
///
/// Variant order matters: serde tries untagged variants top to bottom, so
/// numbers and lists bind before date-shaped strings, and date-shaped strings
/// before plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    Date(NaiveDate),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text the UI shows for this value; empty for `Null`.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            FieldValue::Number(n) => format!("{n}"),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Null => String::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// One row of a form. The id is issued by the backend and absent until the
/// record has been created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub records: Vec<Record>,
    /// Full unpaginated result count for the current filter.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn empty(page: u64, limit: u64) -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }
}

/// Expected record count of `page` given `limit` and `total`.
pub fn page_len(page: u64, limit: u64, total: u64) -> u64 {
    if total == 0 || page == 0 || limit == 0 {
        return 0;
    }
    let offset = (page - 1) * limit;
    if offset >= total {
        0
    } else {
        limit.min(total - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_json_round_trip() {
        let json = r#"{"_id":"663f","calendar_year":2024,"province":"Marinduque","date_of_inventory":"2024-03-11","municipalities":["Boac","Gasan"],"remarks":null}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("663f"));
        assert_eq!(
            record.get("calendar_year"),
            Some(&FieldValue::Number(2024.0))
        );
        assert_eq!(
            record.get("date_of_inventory"),
            Some(&FieldValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
            ))
        );
        assert_eq!(
            record.get("municipalities"),
            Some(&FieldValue::List(vec![
                "Boac".to_string(),
                "Gasan".to_string()
            ]))
        );
        assert_eq!(record.get("remarks"), Some(&FieldValue::Null));
    }

    #[test]
    fn new_record_serializes_without_id() {
        let record = Record::new().with("province", FieldValue::from("Marinduque"));
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("_id"));
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(FieldValue::Number(2024.0).display(), "2024");
        assert_eq!(FieldValue::Number(12.5).display(), "12.5");
    }

    #[test]
    fn page_len_covers_last_page() {
        assert_eq!(page_len(1, 10, 25), 10);
        assert_eq!(page_len(3, 10, 25), 5);
        assert_eq!(page_len(4, 10, 25), 0);
        assert_eq!(page_len(1, 10, 0), 0);
    }
}
