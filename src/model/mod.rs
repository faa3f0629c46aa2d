//! Model instantiation: template fill plus feasibility checks.

pub mod feasibility;
pub mod template;

pub use feasibility::*;
pub use template::*;

use tracing::warn;

use crate::domain::ParamSet;
use crate::error::AppError;

/// Fills one template for many parameter sets, enforcing the invariants first.
pub struct Renderer {
    template: Template,
    invariants: Vec<Box<dyn Invariant>>,
}

impl Renderer {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            invariants: Vec::new(),
        }
    }

    pub fn with_invariant(mut self, invariant: impl Invariant + 'static) -> Self {
        self.invariants.push(Box::new(invariant));
        self
    }

    /// Merge `overlay` over `fixed` and check invariants and template keys.
    ///
    /// Nothing is rendered; this is cheap enough to run over a whole grid
    /// before the first verifier call.
    pub fn resolve(&self, fixed: &ParamSet, overlay: &ParamSet) -> Result<ParamSet, AppError> {
        let merged = fixed.merged(overlay);
        for invariant in &self.invariants {
            invariant.check(&merged)?;
        }
        self.template.check_keys(&merged)?;
        Ok(merged)
    }

    pub fn render(&self, fixed: &ParamSet, overlay: &ParamSet) -> Result<String, AppError> {
        let merged = self.resolve(fixed, overlay)?;
        self.template.render(&merged)
    }

    /// Log parameters the template does not use. They are harmless but usually a typo.
    pub fn warn_unused(&self, params: &ParamSet) {
        let unused = self.template.unused_keys(params);
        if !unused.is_empty() {
            warn!(
                "Template '{}' ignores parameter(s): {}",
                self.template.origin().display(),
                unused.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn renderer() -> Renderer {
        let template = Template::parse("bots={N_BOTS} q={QUEUE_CAPACITY} rows={N_POD_ROWS}x{N_PODS_PER_ROW}").unwrap();
        Renderer::new(template).with_invariant(StorageCapacity::default())
    }

    fn fixed() -> ParamSet {
        ParamSet::new()
            .with("N_BOTS", 5)
            .with("QUEUE_CAPACITY", 10)
            .with("N_POD_ROWS", 10)
            .with("N_PODS_PER_ROW", 5)
    }

    #[test]
    fn identical_overlays_render_identically() {
        let r = renderer();
        let a = r.render(&fixed(), &ParamSet::new().with("QUEUE_CAPACITY", 20)).unwrap();
        let b = r.render(&fixed(), &ParamSet::new().with("QUEUE_CAPACITY", 20)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "bots=5 q=20 rows=10x5");
    }

    #[test]
    fn infeasible_overlay_fails_before_rendering() {
        let r = renderer();
        let err = r
            .render(&fixed(), &ParamSet::new().with("N_BOTS", 20).with("QUEUE_CAPACITY", 30))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("Infeasible"));
    }
}
