//! Reusable widget components.

pub mod confirm;
pub mod detail;
pub mod filter;
pub mod table;

pub use confirm::ConfirmDialog;
pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterEntry};
pub use table::{RecordTable, TableStyle};
