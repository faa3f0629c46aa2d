//! Cartesian product over variable-parameter domains.
//!
//! Points are produced lazily in nested-loop order: axes iterate in declaration
//! order and the last-declared axis varies fastest. Derived parameters are
//! evaluated once per point, after the variable values are bound.

use crate::domain::{ParamSet, ParamValue};
use crate::error::AppError;

/// One named axis of the sweep with its concrete values.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

/// Ordered collection of axes. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domains {
    axes: Vec<Axis>,
}

impl Domains {
    pub fn new(axes: Vec<Axis>) -> Result<Self, AppError> {
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(AppError::config(format!(
                    "Variable parameter '{}' is declared twice.",
                    axis.name
                )));
            }
        }
        Ok(Self { axes })
    }

    pub fn get(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Number of grid points (product of domain sizes).
    pub fn point_count(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }
}

/// A parameter computed from the variable values of the same point.
#[derive(Debug, Clone)]
pub struct DerivedParam {
    pub name: String,
    pub compute: fn(&ParamSet) -> Result<ParamValue, AppError>,
}

impl DerivedParam {
    pub fn new(name: impl Into<String>, compute: fn(&ParamSet) -> Result<ParamValue, AppError>) -> Self {
        Self {
            name: name.into(),
            compute,
        }
    }
}

/// One point of the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    /// Position in product order.
    pub index: usize,
    /// The bound variable values, as declared.
    pub variables: ParamSet,
    /// Values of the derived parameters for this point.
    pub derived: ParamSet,
}

impl GridPoint {
    /// Variable values with derived values folded in.
    pub fn overlay(&self) -> ParamSet {
        self.variables.merged(&self.derived)
    }
}

/// Re-iterable view of the full grid.
#[derive(Debug, Clone, Copy)]
pub struct ParamGrid<'a> {
    domains: &'a Domains,
    derived: &'a [DerivedParam],
}

impl<'a> ParamGrid<'a> {
    pub fn new(domains: &'a Domains, derived: &'a [DerivedParam]) -> Self {
        Self { domains, derived }
    }

    pub fn len(&self) -> usize {
        self.domains.point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> GridIter<'a> {
        GridIter {
            domains: self.domains,
            derived: self.derived,
            cursor: vec![0; self.domains.axes.len()],
            next_index: 0,
            total: self.len(),
        }
    }

    /// Materialize every point, stopping at the first derived-parameter failure.
    pub fn collect_points(&self) -> Result<Vec<GridPoint>, AppError> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for ParamGrid<'a> {
    type Item = Result<GridPoint, AppError>;
    type IntoIter = GridIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Odometer over the per-axis indices.
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    domains: &'a Domains,
    derived: &'a [DerivedParam],
    cursor: Vec<usize>,
    next_index: usize,
    total: usize,
}

impl GridIter<'_> {
    fn advance(&mut self) {
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.domains.axes[pos].values.len() {
                return;
            }
            self.cursor[pos] = 0;
        }
    }
}

impl Iterator for GridIter<'_> {
    type Item = Result<GridPoint, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.total {
            return None;
        }

        let variables: ParamSet = self
            .domains
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &i)| (axis.name.clone(), axis.values[i]))
            .collect();

        let mut derived = ParamSet::new();
        for param in self.derived {
            match (param.compute)(&variables) {
                Ok(value) => derived.insert(param.name.clone(), value),
                Err(e) => {
                    self.next_index = self.total;
                    return Some(Err(e));
                }
            }
        }

        let point = GridPoint {
            index: self.next_index,
            variables,
            derived,
        };
        self.next_index += 1;
        self.advance();
        Some(Ok(point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next_index;
        (left, Some(left))
    }
}
