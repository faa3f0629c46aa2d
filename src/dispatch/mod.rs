//! Parallel dispatch of a sweep.
//!
//! The driver (the calling thread) materializes the grid, validates every point,
//! then hands points to a fixed-size rayon pool. Workers send results back over
//! a channel as they finish; the driver consumes them in completion order and
//! stops at the first failure. Finished outcomes are slotted back by grid index,
//! so the dataset is laid out in product order regardless of completion order.
//!
//! Invariants:
//! - no verifier call happens unless every point passed the renderer's checks
//! - a failed or interrupted sweep produces no dataset at all
//! - each dataset index describes one point (x/y/z/color stay aligned)

pub mod cancel;
pub mod progress;

pub use cancel::*;
pub use progress::*;

use std::sync::mpsc;

use tracing::{debug, info};

use crate::domain::{ExperimentDataset, Outcome, ParamSet};
use crate::error::AppError;
use crate::grid::{DerivedParam, Domains, GridPoint, ParamGrid};
use crate::model::Renderer;
use crate::verify::Verifier;

/// Everything that defines one sweep.
#[derive(Debug, Clone, Copy)]
pub struct Sweep<'a> {
    pub query: &'a str,
    pub fixed: &'a ParamSet,
    pub domains: &'a Domains,
    pub derived: &'a [DerivedParam],
    /// Parameter names projected onto x, y and z.
    pub axes: [&'a str; 3],
}

pub struct Dispatcher<'a, V: Verifier + ?Sized> {
    renderer: &'a Renderer,
    verifier: &'a V,
    workers: usize,
    cancel: CancelToken,
}

/// Worker count: the explicit override, or the host's available parallelism.
pub fn resolve_workers(jobs: Option<usize>) -> usize {
    jobs.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
        .max(1)
}

impl<'a, V: Verifier + ?Sized> Dispatcher<'a, V> {
    pub fn new(renderer: &'a Renderer, verifier: &'a V, workers: usize, cancel: CancelToken) -> Self {
        Self {
            renderer,
            verifier,
            workers: workers.max(1),
            cancel,
        }
    }

    pub fn run(&self, sweep: &Sweep<'_>, progress: &mut dyn Progress) -> Result<ExperimentDataset, AppError> {
        let points = ParamGrid::new(sweep.domains, sweep.derived).collect_points()?;
        self.validate(sweep, &points)?;

        let total = points.len();
        info!("Query: {}", sweep.query);
        info!("Spawning {} workers to run {total} simulations.", self.workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("sweep-worker-{i}"))
            .build()
            .map_err(|e| AppError::io(format!("Failed to build worker pool: {e}")))?;

        // Aborting this sweep must not look like a user interrupt to the caller.
        let abort = self.cancel.child();
        let (tx, rx) = mpsc::channel::<(usize, Result<Outcome, AppError>)>();

        progress.start(total);
        let collected = pool.in_place_scope(|scope| {
            for point in &points {
                let tx = tx.clone();
                let abort = &abort;
                scope.spawn(move |_| {
                    if abort.is_cancelled() {
                        return;
                    }
                    let _ = tx.send((point.index, self.run_point(sweep, point, abort)));
                });
            }
            drop(tx);

            let mut slots: Vec<Option<Outcome>> = vec![None; total];
            let mut completed = 0;
            for (index, result) in rx.iter() {
                match result {
                    Ok(outcome) => {
                        debug!(
                            "{} -> [{}, {}]",
                            outcome.variables, outcome.interval.lower, outcome.interval.upper
                        );
                        slots[index] = Some(outcome);
                        completed += 1;
                        progress.advance(completed, total);
                    }
                    Err(e) => {
                        abort.cancel();
                        return Err(e);
                    }
                }
            }
            Ok(slots)
        });
        // Ctrl-C also reaches in-flight verifiers; their failures must not mask the
        // interrupt, and an interrupted run prints nothing more.
        if self.cancel.is_cancelled() {
            return Err(AppError::interrupted());
        }
        progress.finish();
        let slots = collected?;

        let outcomes: Vec<Outcome> = slots.into_iter().flatten().collect();
        if outcomes.len() != total {
            return Err(AppError::tool(format!(
                "Sweep ended with {} of {total} results.",
                outcomes.len()
            )));
        }

        project(&outcomes, sweep.axes)
    }

    fn run_point(&self, sweep: &Sweep<'_>, point: &GridPoint, cancel: &CancelToken) -> Result<Outcome, AppError> {
        let variables = point.overlay();
        let model = self.renderer.render(sweep.fixed, &variables)?;
        let interval = self.verifier.verify(&model, sweep.query, cancel)?;
        Ok(Outcome { variables, interval })
    }

    fn validate(&self, sweep: &Sweep<'_>, points: &[GridPoint]) -> Result<(), AppError> {
        let Some(first) = points.first() else {
            return Ok(());
        };
        let overlay = first.overlay();
        for axis in sweep.axes {
            if !overlay.contains(axis) {
                return Err(AppError::config(format!(
                    "Projection axis '{axis}' is neither a variable nor a derived parameter."
                )));
            }
        }
        self.renderer.warn_unused(&sweep.fixed.merged(&overlay));

        for point in points {
            self.renderer.resolve(sweep.fixed, &point.overlay())?;
        }
        Ok(())
    }
}

/// Build the plottable dataset: three axis values plus the interval midpoint.
pub fn project(outcomes: &[Outcome], axes: [&str; 3]) -> Result<ExperimentDataset, AppError> {
    let mut data = ExperimentDataset::with_capacity(outcomes.len());
    for outcome in outcomes {
        let [x, y, z] = axes.map(|axis| outcome.variables.get(axis).map(|v| v.as_f64()));
        let (Some(x), Some(y), Some(z)) = (x, y, z) else {
            return Err(AppError::config(format!(
                "Result {} lacks one of the projection axes {axes:?}.",
                outcome.variables
            )));
        };
        data.push(x, y, z, outcome.interval.midpoint());
    }
    Ok(data)
}
