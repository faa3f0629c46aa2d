//! External verification.
//!
//! - `Verifier`: the seam the dispatcher talks to
//! - `Verifyta`: the real client, one external process per call
//! - `parse`: the output grammar

pub mod parse;
pub mod verifyta;

pub use parse::*;
pub use verifyta::*;

use crate::dispatch::CancelToken;
use crate::domain::Interval;
use crate::error::AppError;

/// Runs one statistical check of `query` against a rendered `model`.
///
/// Implementations must be callable from many worker threads at once and must
/// not share scratch state between calls.
pub trait Verifier: Sync {
    fn verify(&self, model: &str, query: &str, cancel: &CancelToken) -> Result<Interval, AppError>;
}

/// A probability query with a time-bounded path formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub formula: String,
}

impl Query {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
        }
    }

    /// Query text for the verifier, e.g. `Pr [<=1000] ( <> tasks_lost > 0 )`.
    pub fn render(&self, time_bound: u32) -> String {
        format!("Pr [<={time_bound}] ( {} )", self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_text_embeds_time_bound() {
        let q = Query::new("<> tasks_lost > 0");
        assert_eq!(q.render(1000), "Pr [<=1000] ( <> tasks_lost > 0 )");
    }
}
