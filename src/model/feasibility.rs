//! Structural constraints every resolved parameter set must satisfy.

use crate::domain::ParamSet;
use crate::error::AppError;

pub trait Invariant: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, params: &ParamSet) -> Result<(), AppError>;
}

/// Agents plus queued tasks must fit strictly inside the storage grid:
/// `agents + buffer < rows * per_row`.
#[derive(Debug, Clone)]
pub struct StorageCapacity {
    pub agents: String,
    pub buffer: String,
    pub rows: String,
    pub per_row: String,
}

impl Default for StorageCapacity {
    fn default() -> Self {
        Self {
            agents: "N_BOTS".to_string(),
            buffer: "QUEUE_CAPACITY".to_string(),
            rows: "N_POD_ROWS".to_string(),
            per_row: "N_PODS_PER_ROW".to_string(),
        }
    }
}

impl StorageCapacity {
    fn read(&self, params: &ParamSet, key: &str) -> Result<f64, AppError> {
        params
            .get(key)
            .map(|v| v.as_f64())
            .ok_or_else(|| AppError::config(format!("Invariant '{}' needs parameter {key}.", self.name())))
    }
}

impl Invariant for StorageCapacity {
    fn name(&self) -> &str {
        "storage-capacity"
    }

    fn check(&self, params: &ParamSet) -> Result<(), AppError> {
        let agents = self.read(params, &self.agents)?;
        let buffer = self.read(params, &self.buffer)?;
        let slots = self.read(params, &self.rows)? * self.read(params, &self.per_row)?;
        if agents + buffer < slots {
            return Ok(());
        }
        Err(AppError::config(format!(
            "Infeasible parameters: {} + {} = {} must be < {} * {} = {} ({params}).",
            self.agents,
            self.buffer,
            agents + buffer,
            self.rows,
            self.per_row,
            slots
        )))
    }
}
