//! Error types for hwid-core
//!
//! Re-exports the unified error type from hwid-error.

pub use hwid_error::{HwidError, Result};
