//! Input/output helpers.
//!
//! - per-experiment result cache (`cache`)
//! - plot payload JSON and CSV exports (`export`)

pub mod cache;
pub mod export;

pub use cache::*;
pub use export::*;
