//! Sparse line offset index.
//!
//! This module provides the core lookup engine for lineserve: a one-pass line
//! counter, the anchor builder that spreads a fixed anchor budget over the file,
//! and the immutable offset cache that answers line lookups.

pub mod builder;
pub mod cache;
pub mod counter;
pub mod lookup;
pub mod validation;

// Re-export main types
pub use cache::{LookupPlan, OffsetCache};
pub use counter::count_lines;
pub use lookup::LineLookup;
pub use validation::validate_file_path;

/// A cached starting point for forward scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// 0-based line number
    pub line_number: u64,
    /// Offset of the first byte of the line
    pub byte_offset: u64,
}
