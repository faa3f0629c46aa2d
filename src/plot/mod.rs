//! Hand-off to the plotting collaborator.
//!
//! The sweep itself never renders anything. A `PlotSink` receives the finished
//! dataset with its axis labels and resolved ticks; the bundled `PayloadWriter`
//! stores that as JSON (and optionally CSV) for an external renderer and prints
//! a short text summary.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::domain::ExperimentDataset;
use crate::error::AppError;
use crate::io::export::{PlotPayload, write_dataset_csv, write_plot_json};

/// Everything the plotting side needs for one experiment.
#[derive(Debug, Clone)]
pub struct PlotRequest<'a> {
    pub experiment: &'a str,
    pub dataset: &'a ExperimentDataset,
    pub labels: [&'a str; 3],
    /// Tick positions per axis, already resolved to concrete values.
    pub ticks: [Vec<f64>; 3],
}

pub trait PlotSink {
    fn plot(&mut self, request: &PlotRequest<'_>) -> Result<(), AppError>;
}

/// Writes `plot3d_<experiment>.json` (plus `.csv` when enabled) into `out_dir`.
#[derive(Debug, Clone)]
pub struct PayloadWriter {
    out_dir: PathBuf,
    csv: bool,
}

impl PayloadWriter {
    pub fn new(out_dir: impl Into<PathBuf>, csv: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            csv,
        }
    }

    fn stem(experiment: &str) -> String {
        format!("plot3d_{experiment}")
    }
}

impl PlotSink for PayloadWriter {
    fn plot(&mut self, request: &PlotRequest<'_>) -> Result<(), AppError> {
        fs::create_dir_all(&self.out_dir).map_err(|e| {
            AppError::io(format!("Failed to create output dir '{}': {e}", self.out_dir.display()))
        })?;

        let stem = Self::stem(request.experiment);
        let json_path = self.out_dir.join(format!("{stem}.json"));
        let payload = PlotPayload {
            experiment: request.experiment,
            labels: request.labels,
            ticks: &request.ticks,
            dataset: request.dataset,
        };
        write_plot_json(&json_path, &payload)?;
        info!("Wrote plot payload {}", json_path.display());

        if self.csv {
            let csv_path = self.out_dir.join(format!("{stem}.csv"));
            write_dataset_csv(&csv_path, request.labels, request.dataset)?;
            info!("Wrote {}", csv_path.display());
        }

        println!("{}", crate::report::format_dataset_summary(request));
        Ok(())
    }
}
