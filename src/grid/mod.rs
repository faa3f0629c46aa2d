//! Parameter grid generation.
//!
//! Responsibilities:
//!
//! - turn compact domain declarations into concrete value sequences
//! - walk the Cartesian product of all axes in a deterministic order
//! - evaluate derived parameters per point

pub mod domain;
pub mod product;

pub use domain::*;
pub use product::*;
