//! Variable-parameter domain declarations.
//!
//! Catalog entries declare each axis compactly (an inclusive stepped range, a
//! scaled range for fractional axes, an explicit list, or a concatenation).
//! `normalize` turns a declaration into the concrete value sequence the grid
//! iterates over.

use crate::domain::ParamValue;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainSpec {
    /// Explicit values, in order.
    Values(Vec<ParamValue>),
    /// Integers `start, start+step, ..` up to and including `end`.
    IntRange { start: i64, end: i64, step: i64 },
    /// Floats `i * factor` for `i` in the integer range `start..=end` by `step`.
    Scaled {
        start: i64,
        end: i64,
        step: i64,
        factor: f64,
    },
    /// Each part in turn.
    Concat(Vec<DomainSpec>),
}

impl DomainSpec {
    /// `start..=end`, step 1.
    pub fn range(start: i64, end: i64) -> Self {
        DomainSpec::IntRange { start, end, step: 1 }
    }

    pub fn range_step(start: i64, end: i64, step: i64) -> Self {
        DomainSpec::IntRange { start, end, step }
    }

    pub fn scaled(start: i64, end: i64, step: i64, factor: f64) -> Self {
        DomainSpec::Scaled {
            start,
            end,
            step,
            factor,
        }
    }

    pub fn values<V: Into<ParamValue>>(values: impl IntoIterator<Item = V>) -> Self {
        DomainSpec::Values(values.into_iter().map(Into::into).collect())
    }

    /// `self` followed by `next`.
    pub fn then(self, next: DomainSpec) -> Self {
        match self {
            DomainSpec::Concat(mut parts) => {
                parts.push(next);
                DomainSpec::Concat(parts)
            }
            other => DomainSpec::Concat(vec![other, next]),
        }
    }

    /// Materialize the declaration into concrete values.
    ///
    /// Fails on a non-positive step or when the result would be empty.
    pub fn normalize(&self) -> Result<Vec<ParamValue>, AppError> {
        let mut out = Vec::new();
        self.extend_into(&mut out)?;
        if out.is_empty() {
            return Err(AppError::config(format!("Domain {self:?} is empty.")));
        }
        Ok(out)
    }

    fn extend_into(&self, out: &mut Vec<ParamValue>) -> Result<(), AppError> {
        match self {
            DomainSpec::Values(values) => out.extend(values.iter().copied()),
            DomainSpec::IntRange { start, end, step } => {
                for i in stepped(*start, *end, *step)? {
                    out.push(ParamValue::Int(i));
                }
            }
            DomainSpec::Scaled {
                start,
                end,
                step,
                factor,
            } => {
                if !factor.is_finite() {
                    return Err(AppError::config(format!("Invalid domain scale factor {factor}.")));
                }
                for i in stepped(*start, *end, *step)? {
                    out.push(ParamValue::Float(i as f64 * factor));
                }
            }
            DomainSpec::Concat(parts) => {
                for part in parts {
                    part.extend_into(out)?;
                }
            }
        }
        Ok(())
    }
}

fn stepped(start: i64, end: i64, step: i64) -> Result<impl Iterator<Item = i64>, AppError> {
    if step <= 0 {
        return Err(AppError::config(format!("Domain step must be > 0 (got {step}).")));
    }
    let step = usize::try_from(step)
        .map_err(|_| AppError::config(format!("Domain step {step} is out of range.")))?;
    Ok((start..=end).step_by(step))
}
