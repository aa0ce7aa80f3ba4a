//! Utility functions for date, age, and string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{age_on, contains_ignore_case, format_date, format_span, truncate};
