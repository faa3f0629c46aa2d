//! Command-line parsing for the sweep runner.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! sweep machinery. `app` turns `Cli` into a `RunConfig`.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sweep",
    version,
    about = "Parameter sweeps of a UPPAAL model through verifyta, with cached results"
)]
pub struct Cli {
    /// Model template with `{NAME}` placeholders.
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Ignore cached results and rerun every selected experiment.
    #[arg(short = 'f', long = "force", alias = "gen")]
    pub force: bool,

    /// Only run experiments whose name contains this substring.
    #[arg(short = 'k', long)]
    pub filter: Option<String>,

    /// Statistical uncertainty passed to the verifier as `-E`.
    #[arg(short = 'E', long, default_value_t = 0.1)]
    pub uncertainty: f64,

    /// Upper time bound of each probability query.
    #[arg(short = 'T', long, default_value_t = 1000)]
    pub time_bound: u32,

    /// Path to the verifyta executable (default: $VERIFYTA_PATH, then `verifyta` on PATH).
    #[arg(long, value_name = "PATH")]
    pub verifyta: Option<PathBuf>,

    /// Directory holding one cached result file per experiment.
    #[arg(long, default_value = ".")]
    pub cache_dir: PathBuf,

    /// Directory receiving plot payloads and CSV exports.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Worker count (default: available parallelism).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Also write each dataset as `plot3d_<name>.csv`.
    #[arg(long)]
    pub export_csv: bool,

    /// List the catalog and cache state, then exit without running anything.
    #[arg(long)]
    pub list: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["sweep", "model.xml"]).unwrap();
        assert_eq!(cli.template, PathBuf::from("model.xml"));
        assert!(!cli.force);
        assert_eq!(cli.uncertainty, 0.1);
        assert_eq!(cli.time_bound, 1000);
        assert_eq!(cli.cache_dir, PathBuf::from("."));
        assert!(cli.jobs.is_none());
    }

    #[test]
    fn template_is_required() {
        assert!(Cli::try_parse_from(["sweep"]).is_err());
        assert!(Cli::try_parse_from(["sweep", "--force"]).is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["sweep", "-f", "-k", "nbots", "-E", "0.05", "-T", "500", "-j", "4", "m.xml"])
            .unwrap();
        assert!(cli.force);
        assert_eq!(cli.filter.as_deref(), Some("nbots"));
        assert_eq!(cli.uncertainty, 0.05);
        assert_eq!(cli.time_bound, 500);
        assert_eq!(cli.jobs, Some(4));
    }

    #[test]
    fn gen_is_an_alias_for_force() {
        let cli = Cli::try_parse_from(["sweep", "--gen", "m.xml"]).unwrap();
        assert!(cli.force);
    }
}
