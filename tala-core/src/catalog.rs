//! Per-form schema catalog.
//!
//! One `FormSchema` per report form, keyed by [`FormKind`]. Every screen in
//! the client is an instantiation of the generic grid/form/migrator/report
//! components with an entry from this catalog, so adding a report form means
//! adding data here, not writing a new screen.

use crate::schema::{ColumnSchema, FieldSchema, FormSchema, SelectOption, ValueType, WidgetKind};
use crate::value::FieldValue;
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Top-level grouping of report forms. Routing parameter on every REST call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Biodiversity,
    Forestry,
}

impl Sector {
    /// URL path segment.
    pub fn slug(self) -> &'static str {
        match self {
            Sector::Biodiversity => "biodiversity",
            Sector::Forestry => "forestry",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Sector::Biodiversity => "Biodiversity",
            Sector::Forestry => "Forestry",
        }
    }
}

/// One report form. Routing parameter on every REST call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Biodiversity4,
    Biodiversity8,
    Biodiversity12,
    Biodiversity20,
    Forestry5,
}

impl FormKind {
    pub fn all() -> &'static [FormKind] {
        &[
            FormKind::Biodiversity4,
            FormKind::Biodiversity8,
            FormKind::Biodiversity12,
            FormKind::Biodiversity20,
            FormKind::Forestry5,
        ]
    }

    pub fn sector(self) -> Sector {
        match self {
            FormKind::Biodiversity4
            | FormKind::Biodiversity8
            | FormKind::Biodiversity12
            | FormKind::Biodiversity20 => Sector::Biodiversity,
            FormKind::Forestry5 => Sector::Forestry,
        }
    }

    /// URL path segment.
    pub fn slug(self) -> &'static str {
        match self {
            FormKind::Biodiversity4 => "biodiversity_4",
            FormKind::Biodiversity8 => "biodiversity_8",
            FormKind::Biodiversity12 => "biodiversity_12",
            FormKind::Biodiversity20 => "biodiversity_20",
            FormKind::Forestry5 => "forestry_5",
        }
    }

    pub fn title(self) -> &'static str {
        form_schema(self).title.as_str()
    }
}

/// Schema for `kind`, from the static catalog.
pub fn form_schema(kind: FormKind) -> &'static FormSchema {
    match kind {
        FormKind::Biodiversity4 => &BIODIVERSITY_4,
        FormKind::Biodiversity8 => &BIODIVERSITY_8,
        FormKind::Biodiversity12 => &BIODIVERSITY_12,
        FormKind::Biodiversity20 => &BIODIVERSITY_20,
        FormKind::Forestry5 => &FORESTRY_5,
    }
}

// ============================================================================
// REFERENCE DATA
// ============================================================================

/// The fixed province of this deployment.
pub const PROVINCE: &str = "Marinduque";

/// Municipalities of the province, for select widgets.
pub const MUNICIPALITIES: [&str; 6] = [
    "Boac",
    "Buenavista",
    "Gasan",
    "Mogpog",
    "Santa Cruz",
    "Torrijos",
];

pub fn municipality_options() -> Vec<SelectOption> {
    MUNICIPALITIES.iter().map(|m| SelectOption::new(*m)).collect()
}

/// Calendar-year options from `start` through the current year.
pub fn year_options(start: i32) -> Vec<SelectOption> {
    let end = Utc::now().year();
    (start..=end)
        .rev()
        .map(|y| SelectOption::new(y.to_string()))
        .collect()
}

fn yes_no_options() -> Vec<SelectOption> {
    vec![SelectOption::new("Yes"), SelectOption::new("No")]
}

fn calendar_year_field() -> FieldSchema {
    FieldSchema::new("calendar_year", "Calendar Year", WidgetKind::Select)
        .required()
        .with_options(year_options(2000))
}

fn province_field() -> FieldSchema {
    FieldSchema::new("province", "Province", WidgetKind::Text)
        .read_only()
        .with_initial(FieldValue::Text(PROVINCE.to_string()))
}

fn municipality_field() -> FieldSchema {
    FieldSchema::new("municipality", "Municipality", WidgetKind::Select)
        .with_options(municipality_options())
}

// ============================================================================
// FORM SCHEMAS
// ============================================================================

static BIODIVERSITY_4: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    form: FormKind::Biodiversity4,
    title: "Inventory of Seagrass Beds".to_string(),
    fields: vec![
        calendar_year_field(),
        province_field(),
        municipality_field(),
        FieldSchema::new("date_of_inventory", "Date of Inventory", WidgetKind::Date),
        FieldSchema::new("area", "Area (in hectares)", WidgetKind::Number),
        FieldSchema::new("dominant_species", "Dominant Species", WidgetKind::Text),
        FieldSchema::new("status", "Status", WidgetKind::Select).with_options(vec![
            SelectOption::new("Excellent"),
            SelectOption::new("Good"),
            SelectOption::new("Fair"),
            SelectOption::new("Poor"),
        ]),
    ],
    columns: vec![
        ColumnSchema::new("CY", "calendar_year", ValueType::Number),
        ColumnSchema::new("Province", "province", ValueType::Text),
        ColumnSchema::new("Municipality", "municipality", ValueType::Text),
        ColumnSchema::new("Date of Inventory", "date_of_inventory", ValueType::Date),
        ColumnSchema::new("Area (in hectares)", "area", ValueType::Number),
        ColumnSchema::new("Dominant Species", "dominant_species", ValueType::Text),
        ColumnSchema::new("Status", "status", ValueType::Select),
    ],
});

static BIODIVERSITY_8: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    form: FormKind::Biodiversity8,
    title: "Inventory of Wetlands".to_string(),
    fields: vec![
        calendar_year_field(),
        province_field(),
        municipality_field(),
        FieldSchema::new("name_of_wetland", "Name of Wetland", WidgetKind::Text).required(),
        FieldSchema::new("wetland_type", "Wetland Type", WidgetKind::Select).with_options(vec![
            SelectOption::new("Inland"),
            SelectOption::new("Coastal"),
        ]),
        FieldSchema::new(
            "wet_area_dry_season_ha",
            "Wet Area, Dry Season (ha)",
            WidgetKind::Number,
        ),
        FieldSchema::new(
            "wet_area_wet_season_ha",
            "Wet Area, Wet Season (ha)",
            WidgetKind::Number,
        ),
        FieldSchema::new("assessed", "Assessed", WidgetKind::Select).with_options(yes_no_options()),
        FieldSchema::new(
            "presence_of_management_plan",
            "Presence of Management Plan",
            WidgetKind::Select,
        )
        .with_options(yes_no_options()),
        FieldSchema::new("recognition", "Recognition", WidgetKind::Text),
        FieldSchema::new("remarks", "Remarks", WidgetKind::Text),
    ],
    columns: vec![
        ColumnSchema::new("CY", "calendar_year", ValueType::Number),
        ColumnSchema::new("Province", "province", ValueType::Text),
        ColumnSchema::new("Municipality", "municipality", ValueType::Text),
        ColumnSchema::new("Name of Wetland", "name_of_wetland", ValueType::Text),
        ColumnSchema::new("Wetland Type", "wetland_type", ValueType::Select),
        ColumnSchema::new(
            "Wet Area, Dry Season (ha)",
            "wet_area_dry_season_ha",
            ValueType::Number,
        ),
        ColumnSchema::new(
            "Wet Area, Wet Season (ha)",
            "wet_area_wet_season_ha",
            ValueType::Number,
        ),
        ColumnSchema::new("Assessed", "assessed", ValueType::Select),
        ColumnSchema::new(
            "Presence of Management Plan",
            "presence_of_management_plan",
            ValueType::Select,
        ),
        ColumnSchema::new("Recognition", "recognition", ValueType::Text),
        ColumnSchema::new("Remarks", "remarks", ValueType::Text),
    ],
});

static BIODIVERSITY_12: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    form: FormKind::Biodiversity12,
    title: "Wildlife Import/Export/Re-Export Permit".to_string(),
    fields: vec![
        calendar_year_field(),
        province_field(),
        municipality_field(),
        FieldSchema::new("permit_type", "Permit Type", WidgetKind::Select).with_options(vec![
            SelectOption::new("Import"),
            SelectOption::new("Export"),
            SelectOption::new("Re-Export"),
        ]),
        FieldSchema::new(
            "number_of_permits_issued",
            "Number of Permits Issued",
            WidgetKind::Number,
        ),
        FieldSchema::new("revenue_generated", "Revenue Generated", WidgetKind::Number),
    ],
    columns: vec![
        ColumnSchema::new("CY", "calendar_year", ValueType::Number),
        ColumnSchema::new("Province", "province", ValueType::Text),
        ColumnSchema::new("Municipality", "municipality", ValueType::Text),
        ColumnSchema::new("Permit Type", "permit_type", ValueType::Select),
        ColumnSchema::new(
            "Number of Permits Issued",
            "number_of_permits_issued",
            ValueType::Number,
        ),
        ColumnSchema::new("Revenue Generated", "revenue_generated", ValueType::Number),
    ],
});

static BIODIVERSITY_20: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    form: FormKind::Biodiversity20,
    title: "Wildlife Collector's Permit".to_string(),
    fields: vec![
        calendar_year_field(),
        province_field(),
        municipality_field(),
        FieldSchema::new(
            "number_of_permits_issued",
            "Number of Permits Issued",
            WidgetKind::Number,
        ),
        FieldSchema::new("revenue_generated", "Revenue Generated", WidgetKind::Number),
    ],
    columns: vec![
        ColumnSchema::new("CY", "calendar_year", ValueType::Number),
        ColumnSchema::new("Province", "province", ValueType::Text),
        ColumnSchema::new("Municipality", "municipality", ValueType::Text),
        ColumnSchema::new(
            "Number of Permits Issued",
            "number_of_permits_issued",
            ValueType::Number,
        ),
        ColumnSchema::new("Revenue Generated", "revenue_generated", ValueType::Number),
    ],
});

static FORESTRY_5: Lazy<FormSchema> = Lazy::new(|| FormSchema {
    form: FormKind::Forestry5,
    title: "Inventory of Watersheds".to_string(),
    fields: vec![
        calendar_year_field(),
        province_field(),
        FieldSchema::new("name_of_watershed", "Name of Watershed", WidgetKind::Text).required(),
        FieldSchema::new(
            "previous_name_of_watershed",
            "Previous Name of Watershed",
            WidgetKind::Text,
        ),
        FieldSchema::new("area_ha", "Area (ha)", WidgetKind::Number),
        FieldSchema::new("classification", "Classification", WidgetKind::Select).with_options(
            vec![
                SelectOption::new("Small sized watershed"),
                SelectOption::new("Medium sized watershed"),
                SelectOption::new("Large sized watershed"),
                SelectOption::new("Extremely Large sized watershed"),
            ],
        ),
        FieldSchema::new("municipalities", "Municipalities", WidgetKind::MultiSelect)
            .with_options(municipality_options()),
    ],
    columns: vec![
        ColumnSchema::new("CY", "calendar_year", ValueType::Number),
        ColumnSchema::new("Province", "province", ValueType::Text),
        ColumnSchema::new("Name of Watershed", "name_of_watershed", ValueType::Text),
        ColumnSchema::new(
            "Previous Name of Watershed",
            "previous_name_of_watershed",
            ValueType::Text,
        ),
        ColumnSchema::new("Area (in hectares)", "area_ha", ValueType::Number),
        ColumnSchema::new(
            "Classification (small, medium, large)",
            "classification",
            ValueType::Select,
        ),
        ColumnSchema::new("Municipalities", "municipalities", ValueType::Text).locked(),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_schema_is_valid() {
        for kind in FormKind::all() {
            form_schema(*kind)
                .validate()
                .unwrap_or_else(|e| panic!("{kind:?}: {e}"));
        }
    }

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<_> = FormKind::all().iter().map(|k| k.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), FormKind::all().len());
    }

    #[test]
    fn year_options_run_newest_first() {
        let options = year_options(2000);
        assert!(options.len() >= 25);
        assert_eq!(options.last().unwrap().value, "2000");
    }
}
