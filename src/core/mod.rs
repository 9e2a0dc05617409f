/// Core Module for sqlview
///
/// Shared infrastructure used by the UI layer: the database sessions and
/// executor, and the error type every operation reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, ViewerError};
