// Core Layer
//
// Crate-wide error type and result alias

pub mod error;

// Re-export commonly used types
pub use error::{IrError, Result};
