//! Persistent result cache, one JSON file per experiment.
//!
//! The file wraps the dataset with a little metadata:
//! - which tool wrote it
//! - the experiment name it belongs to
//! - when it was written
//!
//! Reads never fail: anything unreadable, unparsable, misaligned or written for
//! another experiment is a cache miss. Writes go to a temp file in the cache
//! directory and are renamed into place, so a crash never leaves half a file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::ExperimentDataset;
use crate::error::AppError;

const TOOL: &str = "smc-sweep";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    tool: String,
    experiment: String,
    created_at: DateTime<Utc>,
    dataset: ExperimentDataset,
}

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, experiment: &str) -> PathBuf {
        self.dir.join(format!("{experiment}.json"))
    }

    pub fn contains(&self, experiment: &str) -> bool {
        self.load(experiment).is_some()
    }

    /// Cached dataset for `experiment`, or `None` on a miss.
    pub fn load(&self, experiment: &str) -> Option<ExperimentDataset> {
        let path = self.path_for(experiment);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                debug!("Cache miss for '{experiment}' ({}): {e}", path.display());
                return None;
            }
        };
        let cached: CacheFile = match serde_json::from_reader(BufReader::new(file)) {
            Ok(c) => c,
            Err(e) => {
                info!("Ignoring unreadable cache file {}: {e}", path.display());
                return None;
            }
        };
        if cached.experiment != experiment {
            info!(
                "Ignoring cache file {}: written for '{}'",
                path.display(),
                cached.experiment
            );
            return None;
        }
        if !cached.dataset.is_aligned() {
            info!("Ignoring cache file {}: sequences differ in length", path.display());
            return None;
        }
        debug!(
            "Loaded {} cached points for '{experiment}' (written {})",
            cached.dataset.len(),
            cached.created_at.to_rfc3339()
        );
        Some(cached.dataset)
    }

    /// Write `dataset` for `experiment`, replacing any earlier entry.
    pub fn store(&self, experiment: &str, dataset: &ExperimentDataset) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::io(format!("Failed to create cache dir '{}': {e}", self.dir.display()))
        })?;

        let path = self.path_for(experiment);
        let cached = CacheFile {
            tool: TOOL.to_string(),
            experiment: experiment.to_string(),
            created_at: Utc::now(),
            dataset: dataset.clone(),
        };

        let tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| AppError::io(format!("Failed to create temp cache file: {e}")))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &cached)
                .map_err(|e| AppError::io(format!("Failed to write cache JSON: {e}")))?;
            writer
                .flush()
                .map_err(|e| AppError::io(format!("Failed to write cache JSON: {e}")))?;
        }
        tmp.persist(&path)
            .map_err(|e| AppError::io(format!("Failed to write cache file '{}': {e}", path.display())))?;

        debug!("Cached {} points for '{experiment}' in {}", dataset.len(), path.display());
        Ok(path)
    }
}
