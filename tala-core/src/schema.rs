//! Declarative field and column schemas.
//!
//! A `FormSchema` is the single source of truth for one report form: the
//! drawer form, the data grid, the migrator, and the report filters are all
//! derived from it. The per-form instances live in [`crate::catalog`].

use crate::catalog::FormKind;
use crate::error::SchemaError;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

// ============================================================================
// WIDGET AND VALUE KINDS
// ============================================================================

/// Input widget backing a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Text,
    Number,
    Date,
    Select,
    MultiSelect,
}

impl WidgetKind {
    /// Whether the widget requires an option list.
    pub fn needs_options(self) -> bool {
        matches!(self, WidgetKind::Select | WidgetKind::MultiSelect)
    }
}

/// Declared cell type of a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Number,
    Date,
    Select,
}

/// One entry of a select/multiselect option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    pub fn labeled(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// ============================================================================
// FIELD AND COLUMN SCHEMAS
// ============================================================================

/// Declarative description of one drawer-form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Backend attribute name. Unique within a form.
    pub name: String,
    /// Human-readable label shown next to the input.
    pub label: String,
    pub widget: WidgetKind,
    #[serde(default)]
    pub required: bool,
    /// Pre-filled value for new records (e.g. the fixed province).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<FieldValue>,
    /// Option list. Present iff `widget` is select or multiselect.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Rendered but not editable (pre-filled fields).
    #[serde(default)]
    pub read_only: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            widget,
            required: false,
            initial_value: None,
            options: Vec::new(),
            read_only: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_initial(mut self, value: FieldValue) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }
}

/// Declarative description of one grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column header shown in the grid.
    pub header: String,
    /// Backend attribute the column reads and writes.
    pub field: String,
    pub editable: bool,
    pub value_type: ValueType,
}

impl ColumnSchema {
    pub fn new(header: impl Into<String>, field: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            header: header.into(),
            field: field.into(),
            editable: true,
            value_type,
        }
    }

    pub fn locked(mut self) -> Self {
        self.editable = false;
        self
    }
}

// ============================================================================
// FORM SCHEMA
// ============================================================================

/// Complete schema for one report form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub form: FormKind,
    /// Title shown in the view header, e.g. "Inventory of Wetlands".
    pub title: String,
    pub fields: Vec<FieldSchema>,
    pub columns: Vec<ColumnSchema>,
}

impl FormSchema {
    /// Check the structural invariants: unique field names, option lists on
    /// select widgets only, and every editable column backed by a field.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    form: self.form,
                    field: field.name.clone(),
                });
            }
            if field.widget.needs_options() && field.options.is_empty() {
                return Err(SchemaError::MissingOptions {
                    form: self.form,
                    field: field.name.clone(),
                });
            }
            if !field.widget.needs_options() && !field.options.is_empty() {
                return Err(SchemaError::UnexpectedOptions {
                    form: self.form,
                    field: field.name.clone(),
                });
            }
        }
        for column in &self.columns {
            if column.editable && !self.fields.iter().any(|f| f.name == column.field) {
                return Err(SchemaError::UnbackedColumn {
                    form: self.form,
                    field: column.field.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column(&self, field: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_schema() -> FormSchema {
        FormSchema {
            form: FormKind::Biodiversity4,
            title: "Test".to_string(),
            fields: vec![
                FieldSchema::new("calendar_year", "Calendar Year", WidgetKind::Number).required(),
                FieldSchema::new("remarks", "Remarks", WidgetKind::Text),
            ],
            columns: vec![
                ColumnSchema::new("CY", "calendar_year", ValueType::Number),
                ColumnSchema::new("Remarks", "remarks", ValueType::Text),
            ],
        }
    }

    #[test]
    fn valid_schema_passes() {
        assert!(minimal_schema().validate().is_ok());
    }

    #[test]
    fn duplicate_field_rejected() {
        let mut schema = minimal_schema();
        schema
            .fields
            .push(FieldSchema::new("remarks", "Remarks Again", WidgetKind::Text));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::DuplicateField { .. })
        ));
    }

    #[test]
    fn select_without_options_rejected() {
        let mut schema = minimal_schema();
        schema
            .fields
            .push(FieldSchema::new("status", "Status", WidgetKind::Select));
        schema
            .columns
            .push(ColumnSchema::new("Status", "status", ValueType::Select));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::MissingOptions { .. })
        ));
    }

    #[test]
    fn editable_column_without_field_rejected() {
        let mut schema = minimal_schema();
        schema
            .columns
            .push(ColumnSchema::new("Area", "area", ValueType::Number));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::UnbackedColumn { .. })
        ));
        // Read-only columns may display backend-only attributes.
        if let Some(column) = schema.columns.last_mut() {
            column.editable = false;
        }
        assert!(schema.validate().is_ok());
    }
}
