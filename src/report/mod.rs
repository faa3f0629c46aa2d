//! Reporting utilities: catalog listings and dataset summaries.

pub mod format;

pub use format::*;
