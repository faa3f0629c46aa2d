//! Built-in experiments for the warehouse robot model.
//!
//! All experiments estimate the probability that a task is lost within the
//! time bound, while sweeping task arrival and warehouse sizing parameters.

use crate::domain::{ParamSet, ParamValue, TickSpec};
use crate::error::AppError;
use crate::grid::{DerivedParam, DomainSpec};
use crate::verify::Query;

use super::ExperimentDef;

const TASKS_LOST: &str = "<> tasks_lost > 0";

/// Values every experiment starts from before its own axes are applied.
pub fn default_params() -> ParamSet {
    ParamSet::new()
        .with("N_BOTS", 5)
        .with("N_POD_ROWS", 10)
        .with("N_PODS_PER_ROW", 5)
        .with("TASK_GEN_MEAN", 1)
        .with("TASK_GEN_VAR", 0)
        .with("QUEUE_CAPACITY", 10)
        .with("HUMAN_MEAN", 2)
        .with("HUMAN_VAR", 1)
        .with("BOT_IDLE_EXP_RATE", 10)
        .with("BOT_STEP_TIME", 1)
        .with("TAU", 1000)
}

/// `TASK_GEN_VAR = trunc(TASK_GEN_MEAN * TASK_GEN_VAR_PERCENT)`.
pub fn task_gen_var(vars: &ParamSet) -> Result<ParamValue, AppError> {
    let mean = vars
        .get("TASK_GEN_MEAN")
        .ok_or_else(|| AppError::config("TASK_GEN_VAR needs TASK_GEN_MEAN on the grid."))?;
    let pct = vars
        .get("TASK_GEN_VAR_PERCENT")
        .ok_or_else(|| AppError::config("TASK_GEN_VAR needs TASK_GEN_VAR_PERCENT on the grid."))?;
    Ok(ParamValue::Int((mean.as_f64() * pct.as_f64()).trunc() as i64))
}

pub fn builtin() -> Vec<ExperimentDef> {
    vec![mean_var_qsize(), mean_nbots_qsize()]
}

fn mean_var_qsize() -> ExperimentDef {
    ExperimentDef {
        name: "mean_var_qsize".to_string(),
        query: Query::new(TASKS_LOST),
        fixed: default_params(),
        variables: vec![
            ("TASK_GEN_MEAN".to_string(), DomainSpec::range(10, 20)),
            (
                "TASK_GEN_VAR_PERCENT".to_string(),
                DomainSpec::scaled(0, 100, 10, 0.01),
            ),
            (
                "QUEUE_CAPACITY".to_string(),
                DomainSpec::values([1i64]).then(DomainSpec::range_step(5, 30, 5)),
            ),
        ],
        derived: vec![DerivedParam::new("TASK_GEN_VAR", task_gen_var)],
        axes: [
            "TASK_GEN_MEAN".to_string(),
            "TASK_GEN_VAR_PERCENT".to_string(),
            "QUEUE_CAPACITY".to_string(),
        ],
        labels: [
            "task gen mean time".to_string(),
            "task gen variance%".to_string(),
            "queue capacity".to_string(),
        ],
        ticks: [
            TickSpec::Natural,
            TickSpec::Values(vec![0.0, 0.5, 1.0]),
            TickSpec::Natural,
        ],
    }
}

fn mean_nbots_qsize() -> ExperimentDef {
    ExperimentDef {
        name: "mean_nbots_qsize".to_string(),
        query: Query::new(TASKS_LOST),
        fixed: default_params(),
        variables: vec![
            ("TASK_GEN_MEAN".to_string(), DomainSpec::range(10, 20)),
            ("N_BOTS".to_string(), DomainSpec::range(1, 10)),
            (
                "QUEUE_CAPACITY".to_string(),
                DomainSpec::values([1i64]).then(DomainSpec::range_step(5, 25, 5)),
            ),
        ],
        derived: Vec::new(),
        axes: [
            "TASK_GEN_MEAN".to_string(),
            "QUEUE_CAPACITY".to_string(),
            "N_BOTS".to_string(),
        ],
        labels: [
            "task gen mean time".to_string(),
            "queue capacity".to_string(),
            "n bots".to_string(),
        ],
        ticks: [
            TickSpec::Natural,
            TickSpec::Values(vec![1.0, 5.0, 15.0, 25.0]),
            TickSpec::Natural,
        ],
    }
}
