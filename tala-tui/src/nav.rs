//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    FormCatalog,
    DataEntry,
    Migrator,
    Reports,
    ErrorLog,
    ConfigViewer,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::FormCatalog => "Forms",
            View::DataEntry => "Data Entry",
            View::Migrator => "Migration",
            View::Reports => "Reports",
            View::ErrorLog => "Error Log",
            View::ConfigViewer => "Config",
        }
    }

    pub fn all() -> &'static [View] {
        &[
            View::FormCatalog,
            View::DataEntry,
            View::Migrator,
            View::Reports,
            View::ErrorLog,
            View::ConfigViewer,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        all[if idx == 0 { all.len() - 1 } else { idx - 1 }]
    }
}
