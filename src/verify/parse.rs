//! Parsing of verifier output.
//!
//! A successful statistical check prints a satisfaction marker and a line such as
//!
//! ```text
//! Pr(<> ...) in [0.0,0.0951318] (95% CI)
//! ```
//!
//! Only the first interval line is used.

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::domain::Interval;
use crate::error::AppError;

pub const SATISFIED_MARKER: &str = "Formula is satisfied";

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Pr\((<>|\[\])[^)]*\) in \[([0-9.eE+-]+),\s*([0-9.eE+-]+)\]")
        .expect("interval pattern is valid")
});

/// Extract the probability interval from verifier stdout.
///
/// Every failure logs the raw output so the offending run can be diagnosed.
pub fn parse_interval(stdout: &str) -> Result<Interval, AppError> {
    if !stdout.contains(SATISFIED_MARKER) {
        log_raw(stdout);
        return Err(AppError::output(format!(
            "Verifier output lacks '{SATISFIED_MARKER}'."
        )));
    }

    let Some(caps) = INTERVAL_RE.captures(stdout) else {
        log_raw(stdout);
        return Err(AppError::output("No probability interval in verifier output."));
    };

    let lower = parse_bound(&caps[2])?;
    let upper = parse_bound(&caps[3])?;
    if !(0.0 <= lower && lower <= upper && upper <= 1.0) {
        log_raw(stdout);
        return Err(AppError::output(format!(
            "Probability interval [{lower}, {upper}] is not within 0 <= lower <= upper <= 1."
        )));
    }
    Ok(Interval { lower, upper })
}

fn parse_bound(text: &str) -> Result<f64, AppError> {
    text.parse::<f64>()
        .map_err(|e| AppError::output(format!("Invalid probability bound '{text}': {e}")))
}

fn log_raw(stdout: &str) {
    error!("Unexpected verifier output:");
    for line in stdout.lines() {
        error!("  {line}");
    }
}
