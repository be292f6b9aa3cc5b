//! TALA API - Wire Contract
//!
//! Request and response bodies exchanged with the forms backend, plus the
//! uniform error shape. The backend itself is an external service; this crate
//! only pins down the JSON it speaks.

pub mod error;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use types::*;
