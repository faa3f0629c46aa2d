//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - threaded through the grid generator, renderer and dispatcher
//! - persisted in the result cache
//! - exported for the external plotting collaborator

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A scalar model parameter.
///
/// Model templates distinguish integer and floating-point literals, so the
/// numeric kind is kept rather than collapsing everything to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

// Bare integer literals fall back to `i32`.
impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// Template literal form: integers as-is, floats always with a decimal point.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Mapping from parameter name to value. Keys are unique by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy of `self` with every entry of `overlay` written over it.
    pub fn merged(&self, overlay: &ParamSet) -> ParamSet {
        let mut out = self.clone();
        for (k, v) in &overlay.0 {
            out.0.insert(k.clone(), *v);
        }
        out
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = ParamSet::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// Confidence interval `[lower, upper]` for a probability estimated by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// One verifier result, attributed to the point that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Variable and derived values of the originating grid point.
    pub variables: ParamSet,
    pub interval: Interval,
}

/// The four aligned sequences handed to the plotting collaborator.
///
/// Index `i` of every vector describes the same grid point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDataset {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub color: Vec<f64>,
}

impl ExperimentDataset {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            color: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64, color: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.color.push(color);
    }

    pub fn len(&self) -> usize {
        self.color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// All four sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.color.len();
        self.x.len() == n && self.y.len() == n && self.z.len() == n
    }
}

/// Tick placement for one plot axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSpec {
    /// Use the axis' own domain values.
    Natural,
    /// Explicit tick positions.
    Values(Vec<f64>),
}

/// Runtime configuration for one invocation of the runner.
///
/// Built once from CLI args + environment and passed down by reference.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub template: PathBuf,
    pub verifier_path: PathBuf,
    /// Verifier uncertainty (`-E`).
    pub uncertainty: f64,
    /// Upper time bound substituted into each experiment's query.
    pub time_bound: u32,
    pub cache_dir: PathBuf,
    pub out_dir: PathBuf,
    pub force_rerun: bool,
    pub filter: Option<String>,
    /// Worker count; `None` means the host's available parallelism.
    pub jobs: Option<usize>,
    pub export_csv: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_literals_keep_a_decimal_point() {
        assert_eq!(ParamValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::Float(0.25).to_string(), "0.25");
        assert_eq!(ParamValue::Int(7).to_string(), "7");
    }

    #[test]
    fn overlay_wins_on_merge() {
        let fixed = ParamSet::new().with("N_BOTS", 5).with("TAU", 1000);
        let overlay = ParamSet::new().with("N_BOTS", 8);
        let merged = fixed.merged(&overlay);
        assert_eq!(merged.get("N_BOTS"), Some(ParamValue::Int(8)));
        assert_eq!(merged.get("TAU"), Some(ParamValue::Int(1000)));
        assert_eq!(merged.keys().count(), 2);
    }

    #[test]
    fn midpoint_of_interval() {
        let iv = Interval { lower: 0.1, upper: 0.2 };
        assert!((iv.midpoint() - 0.15).abs() < 1e-12);
    }
}
