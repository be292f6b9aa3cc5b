//! Report filters.
//!
//! Filters are equality constraints ANDed together by the backend; the
//! gateway serializes them as plain query parameters next to `page`/`limit`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    constraints: Vec<(String, String)>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint. Blank values are ignored so empty filter inputs do
    /// not constrain the listing.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.constraints.push((field.into(), value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    /// Query parameters in insertion order.
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_dropped() {
        let mut filter = RecordFilter::new();
        filter.push("province", "Marinduque");
        filter.push("municipality", "   ");
        filter.push("calendar_year", "2024");
        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter.as_pairs(),
            &[
                ("province".to_string(), "Marinduque".to_string()),
                ("calendar_year".to_string(), "2024".to_string()),
            ]
        );
    }
}
