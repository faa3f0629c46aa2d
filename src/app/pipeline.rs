//! The per-experiment workflow shared by every front-end:
//! resolve -> cache lookup -> dispatch -> cache store -> plot.
//!
//! The CLI only decides which experiments to run and how progress is shown.

use tracing::{info, warn};

use crate::dispatch::{CancelToken, Dispatcher, Progress, resolve_workers};
use crate::domain::{ExperimentDataset, RunConfig};
use crate::error::AppError;
use crate::io::ResultCache;
use crate::model::Renderer;
use crate::plot::{PlotRequest, PlotSink};
use crate::registry::{ExperimentDef, Registry};
use crate::verify::Verifier;

pub struct Runner<'a, V: Verifier + ?Sized> {
    config: &'a RunConfig,
    renderer: &'a Renderer,
    verifier: &'a V,
    cache: ResultCache,
    cancel: CancelToken,
}

impl<'a, V: Verifier + ?Sized> Runner<'a, V> {
    pub fn new(config: &'a RunConfig, renderer: &'a Renderer, verifier: &'a V, cancel: CancelToken) -> Self {
        Self {
            config,
            renderer,
            verifier,
            cache: ResultCache::new(config.cache_dir.clone()),
            cancel,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Produce the dataset for one experiment and hand it to `plot`.
    ///
    /// A cached dataset is used unless `force_rerun` is set. A fresh dataset is
    /// only stored after the whole sweep succeeded.
    pub fn run_experiment(
        &self,
        def: &ExperimentDef,
        plot: &mut dyn PlotSink,
        progress: &mut dyn Progress,
    ) -> Result<ExperimentDataset, AppError> {
        let resolved = def.resolve()?;

        let cached = if self.config.force_rerun {
            None
        } else {
            self.cache.load(&def.name)
        };

        let dataset = match cached {
            Some(dataset) => {
                info!("Using cached result for '{}' ({} points)", def.name, dataset.len());
                dataset
            }
            None => {
                info!("Running '{}' over {} points", def.name, resolved.point_count());
                let query = def.query.render(self.config.time_bound);
                let dispatcher = Dispatcher::new(
                    self.renderer,
                    self.verifier,
                    resolve_workers(self.config.jobs),
                    self.cancel.clone(),
                );
                let dataset = dispatcher.run(&resolved.sweep(&query), progress)?;
                let path = self.cache.store(&def.name, &dataset)?;
                info!("Stored result for '{}' in {}", def.name, path.display());
                dataset
            }
        };

        plot.plot(&PlotRequest {
            experiment: &def.name,
            dataset: &dataset,
            labels: resolved.labels(),
            ticks: resolved.ticks.clone(),
        })?;

        Ok(dataset)
    }

    /// Run every experiment matching `filter`, one after another.
    ///
    /// The first failure ends the run; experiments already finished keep their cache entries.
    pub fn run_selected(
        &self,
        registry: &Registry,
        filter: Option<&str>,
        plot: &mut dyn PlotSink,
        progress: &mut dyn FnMut(&ExperimentDef) -> Box<dyn Progress>,
    ) -> Result<usize, AppError> {
        let selected = registry.select(filter);
        if selected.is_empty() {
            warn!("No experiment matches filter {:?}", filter.unwrap_or(""));
            return Ok(0);
        }

        for def in &selected {
            if self.cancel.is_cancelled() {
                return Err(AppError::interrupted());
            }
            let mut bar = progress(def);
            self.run_experiment(def, plot, bar.as_mut())?;
        }
        Ok(selected.len())
    }
}
