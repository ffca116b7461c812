//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{clean_text, contains_ignore_case, format_title, truncate_string};
