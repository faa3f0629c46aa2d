//! Experiment catalog.
//!
//! An `ExperimentDef` is a static description: fixed parameters, declared axis
//! domains, derived parameters, the projection onto three plot axes, and how
//! the plot should be labelled. `resolve` turns it into concrete domains and
//! ticks right before a run.

pub mod catalog;

use crate::dispatch::Sweep;
use crate::domain::{ParamSet, TickSpec};
use crate::error::AppError;
use crate::grid::{Axis, DerivedParam, DomainSpec, Domains};
use crate::verify::Query;

#[derive(Debug, Clone)]
pub struct ExperimentDef {
    /// Unique name; also the cache key.
    pub name: String,
    pub query: Query,
    pub fixed: ParamSet,
    /// Axes in declaration order (the last one varies fastest).
    pub variables: Vec<(String, DomainSpec)>,
    pub derived: Vec<DerivedParam>,
    /// Parameter names shown on x, y and z.
    pub axes: [String; 3],
    pub labels: [String; 3],
    pub ticks: [TickSpec; 3],
}

/// An experiment with its domains and ticks materialized.
#[derive(Debug, Clone)]
pub struct ResolvedExperiment<'a> {
    pub def: &'a ExperimentDef,
    pub domains: Domains,
    pub ticks: [Vec<f64>; 3],
}

impl ExperimentDef {
    pub fn resolve(&self) -> Result<ResolvedExperiment<'_>, AppError> {
        let mut axes = Vec::with_capacity(self.variables.len());
        for (name, spec) in &self.variables {
            let values = spec
                .normalize()
                .map_err(|e| AppError::config(format!("Experiment '{}', axis {name}: {e}", self.name)))?;
            axes.push(Axis {
                name: name.clone(),
                values,
            });
        }
        let domains = Domains::new(axes)?;

        let mut ticks: [Vec<f64>; 3] = Default::default();
        for (slot, (spec, axis)) in ticks.iter_mut().zip(self.ticks.iter().zip(&self.axes)) {
            *slot = match spec {
                TickSpec::Values(values) => values.clone(),
                TickSpec::Natural => domains
                    .get(axis)
                    .map(|a| a.values.iter().map(|v| v.as_f64()).collect())
                    .ok_or_else(|| {
                        AppError::config(format!(
                            "Experiment '{}': natural ticks for '{axis}' need a declared domain.",
                            self.name
                        ))
                    })?,
            };
        }

        Ok(ResolvedExperiment {
            def: self,
            domains,
            ticks,
        })
    }
}

impl ResolvedExperiment<'_> {
    pub fn point_count(&self) -> usize {
        self.domains.point_count()
    }

    pub fn sweep<'s>(&'s self, query: &'s str) -> Sweep<'s> {
        Sweep {
            query,
            fixed: &self.def.fixed,
            domains: &self.domains,
            derived: &self.def.derived,
            axes: [
                self.def.axes[0].as_str(),
                self.def.axes[1].as_str(),
                self.def.axes[2].as_str(),
            ],
        }
    }

    pub fn labels(&self) -> [&str; 3] {
        [
            self.def.labels[0].as_str(),
            self.def.labels[1].as_str(),
            self.def.labels[2].as_str(),
        ]
    }
}

/// Immutable set of experiments, built once at startup.
#[derive(Debug, Clone)]
pub struct Registry {
    experiments: Vec<ExperimentDef>,
}

impl Registry {
    pub fn new(experiments: Vec<ExperimentDef>) -> Result<Self, AppError> {
        for (i, def) in experiments.iter().enumerate() {
            if experiments[..i].iter().any(|d| d.name == def.name) {
                return Err(AppError::config(format!("Duplicate experiment name '{}'.", def.name)));
            }
        }
        Ok(Self { experiments })
    }

    pub fn builtin() -> Result<Self, AppError> {
        Self::new(catalog::builtin())
    }

    /// Experiments whose name contains `filter` (all of them when `None`), in catalog order.
    pub fn select(&self, filter: Option<&str>) -> Vec<&ExperimentDef> {
        self.experiments
            .iter()
            .filter(|def| filter.is_none_or(|f| def.name.contains(f)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_substring_match() {
        let registry = Registry::builtin().unwrap();
        let names: Vec<&str> = registry.select(Some("nbots")).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["mean_nbots_qsize"]);
        assert_eq!(registry.select(Some("qsize")).len(), 2);
        assert_eq!(registry.select(None).len(), 2);
        assert!(registry.select(Some("nothing")).is_empty());
    }

    #[test]
    fn natural_ticks_resolve_to_domain_values() {
        let registry = Registry::builtin().unwrap();
        let selected = registry.select(Some("mean_var"));
        let resolved = selected[0].resolve().unwrap();
        assert_eq!(resolved.ticks[0], (10..=20).map(|v| v as f64).collect::<Vec<_>>());
        assert_eq!(resolved.ticks[1], vec![0.0, 0.5, 1.0]);
        assert_eq!(resolved.ticks[2], vec![1.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
    }

    #[test]
    fn natural_ticks_on_derived_axis_fail() {
        let mut def = catalog::builtin().remove(0);
        def.axes[1] = "TASK_GEN_VAR".to_string();
        def.ticks[1] = TickSpec::Natural;
        assert!(def.resolve().is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut defs = catalog::builtin();
        defs.push(defs[0].clone());
        assert!(Registry::new(defs).is_err());
    }
}
