//! Dataset exports for downstream tools.
//!
//! - plot payload JSON: everything an external 3-D renderer needs
//! - CSV: one `x,y,z,color` row per point, easy to consume in spreadsheets

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::ExperimentDataset;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct PlotPayload<'a> {
    pub experiment: &'a str,
    pub labels: [&'a str; 3],
    pub ticks: &'a [Vec<f64>; 3],
    pub dataset: &'a ExperimentDataset,
}

pub fn write_plot_json(path: &Path, payload: &PlotPayload<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create plot JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, payload)
        .map_err(|e| AppError::io(format!("Failed to write plot JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write plot JSON: {e}")))?;
    Ok(())
}

pub fn write_dataset_csv(path: &Path, labels: [&str; 3], dataset: &ExperimentDataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "{},{},{},color", csv_field(labels[0]), csv_field(labels[1]), csv_field(labels[2]))
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for i in 0..dataset.len() {
        writeln!(
            w,
            "{},{},{},{}",
            dataset.x[i], dataset.y[i], dataset.z[i], dataset.color[i]
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    w.flush()
        .map_err(|e| AppError::io(format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = ExperimentDataset {
            x: vec![10.0, 11.0],
            y: vec![1.0, 5.0],
            z: vec![3.0, 3.0],
            color: vec![0.15, 0.25],
        };
        write_dataset_csv(&path, ["mean", "queue, capacity", "bots"], &data).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "mean,\"queue, capacity\",bots,color");
        assert_eq!(lines[1], "10,1,3,0.15");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn plot_json_carries_labels_and_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        let data = ExperimentDataset::default();
        let ticks = [vec![1.0], vec![0.0, 0.5, 1.0], vec![]];
        let payload = PlotPayload {
            experiment: "e",
            labels: ["a", "b", "c"],
            ticks: &ticks,
            dataset: &data,
        };
        write_plot_json(&path, &payload).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["labels"][1], "b");
        assert_eq!(v["ticks"][1][1], 0.5);
        assert_eq!(v["experiment"], "e");
    }
}
