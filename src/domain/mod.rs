//! Domain types used throughout the sweep.
//!
//! This module defines:
//!
//! - scalar parameters and parameter sets (`ParamValue`, `ParamSet`)
//! - verifier results (`Interval`, `Outcome`)
//! - the plottable output (`ExperimentDataset`, `TickSpec`)
//! - runtime configuration (`RunConfig`)

pub mod types;

pub use types::*;
