//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the sweep code stays free of presentation concerns
//! - output changes are localized

use crate::io::ResultCache;
use crate::plot::PlotRequest;
use crate::registry::ExperimentDef;

/// Per-z-slice color statistics for a finished experiment.
pub fn format_dataset_summary(request: &PlotRequest<'_>) -> String {
    let data = request.dataset;
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", request.experiment));
    out.push_str(&format!(
        "Axes: x={} | y={} | z={}\n",
        request.labels[0], request.labels[1], request.labels[2]
    ));
    out.push_str(&format!("Points: {}\n", data.len()));
    if data.is_empty() {
        return out;
    }

    let (lo, hi) = min_max(&data.color);
    out.push_str(&format!("P(tasks lost): min={lo:.4} max={hi:.4}\n\n"));

    let mut slices: Vec<f64> = data.z.clone();
    slices.sort_by(f64::total_cmp);
    slices.dedup();

    out.push_str(&format!(
        "{:>12} {:>6} {:>10} {:>10} {:>10}\n",
        truncate(request.labels[2], 12),
        "n",
        "min",
        "mean",
        "max"
    ));
    out.push_str(&format!("{:-<12} {:-<6} {:-<10} {:-<10} {:-<10}\n", "", "", "", "", ""));
    for z in slices {
        let colors: Vec<f64> = data
            .z
            .iter()
            .zip(&data.color)
            .filter(|&(&zi, _)| zi == z)
            .map(|(_, &c)| c)
            .collect();
        let (lo, hi) = min_max(&colors);
        let mean = colors.iter().sum::<f64>() / colors.len() as f64;
        out.push_str(&format!(
            "{:>12} {:>6} {:>10.4} {:>10.4} {:>10.4}\n",
            fmt_num(z),
            colors.len(),
            lo,
            mean,
            hi
        ));
    }

    out
}

/// One line per experiment: name, axes, grid size and whether a cached result exists.
pub fn format_catalog(experiments: &[&ExperimentDef], cache: &ResultCache) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:>7} {:<8} axes\n",
        "experiment", "points", "cached"
    ));
    out.push_str(&format!("{:-<20} {:->7} {:-<8} {:-<4}\n", "", "", "", ""));
    for def in experiments {
        let points = def
            .resolve()
            .map(|r| r.point_count().to_string())
            .unwrap_or_else(|e| format!("error: {e}"));
        let cached = if cache.contains(&def.name) { "yes" } else { "no" };
        out.push_str(&format!(
            "{:<20} {:>7} {:<8} {}\n",
            truncate(&def.name, 20),
            points,
            cached,
            def.axes.join(" x ")
        ));
    }
    out
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

/// Cut `s` to `max` characters, marking the cut with a trailing `.`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExperimentDataset;
    use crate::registry::Registry;

    #[test]
    fn summary_groups_by_z() {
        let data = ExperimentDataset {
            x: vec![10.0, 11.0, 10.0],
            y: vec![1.0, 1.0, 5.0],
            z: vec![2.0, 2.0, 3.0],
            color: vec![0.1, 0.3, 0.5],
        };
        let request = PlotRequest {
            experiment: "demo",
            dataset: &data,
            labels: ["mean", "queue", "bots"],
            ticks: Default::default(),
        };
        let text = format_dataset_summary(&request);
        assert!(text.contains("Points: 3"));
        let slice_two = text.lines().find(|l| l.trim_start().starts_with("2 ")).unwrap();
        assert!(slice_two.contains("0.2000"), "{slice_two}");
        assert!(text.lines().any(|l| l.trim_start().starts_with("3 ")));
    }

    #[test]
    fn catalog_lists_every_experiment() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let text = format_catalog(&registry.select(None), &ResultCache::new(dir.path()));
        assert!(text.contains("mean_var_qsize"));
        assert!(text.contains("847"));
        assert!(text.contains("mean_nbots_qsize"));
        assert!(text.contains("660"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
