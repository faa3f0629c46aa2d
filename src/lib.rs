//! `smc-sweep` library crate.
//!
//! The binary (`sweep`) is a thin wrapper around this library so that:
//!
//! - the sweep machinery is testable without spawning the real verifier
//! - the verifier, plot sink and progress display are swappable seams
//! - code stays easy to navigate as the catalog grows

pub mod app;
pub mod cli;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod grid;
pub mod io;
pub mod model;
pub mod plot;
pub mod registry;
pub mod report;
pub mod verify;
