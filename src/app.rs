//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and the environment into a `RunConfig`
//! - sets up logging and the Ctrl-C watcher
//! - runs the selected experiments through `pipeline::Runner`

use std::path::PathBuf;
use std::thread;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::dispatch::{CancelToken, Progress, StderrProgress};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::ResultCache;
use crate::model::{Renderer, StorageCapacity, Template};
use crate::plot::PayloadWriter;
use crate::registry::{ExperimentDef, Registry};
use crate::verify::Verifyta;

pub mod pipeline;

const VERIFYTA_ENV: &str = "VERIFYTA_PATH";
const DEFAULT_VERIFYTA: &str = "verifyta";

/// Entry point for the `sweep` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = config_from_args(&cli, std::env::var_os(VERIFYTA_ENV).map(PathBuf::from));
    let registry = Registry::builtin()?;

    if cli.list {
        let selected = registry.select(config.filter.as_deref());
        print!(
            "{}",
            crate::report::format_catalog(&selected, &ResultCache::new(config.cache_dir.clone()))
        );
        return Ok(());
    }

    let cancel = CancelToken::new();
    watch_ctrl_c(cancel.clone());

    let template = Template::load(&config.template)?;
    let renderer = Renderer::new(template).with_invariant(StorageCapacity::default());
    let verifier = Verifyta::from_config(&config)?;
    debug!("Verifier: {} (-E {})", verifier.exe().display(), config.uncertainty);

    let runner = pipeline::Runner::new(&config, &renderer, &verifier, cancel);
    let mut plot = PayloadWriter::new(config.out_dir.clone(), config.export_csv);
    let ran = runner.run_selected(
        &registry,
        config.filter.as_deref(),
        &mut plot,
        &mut |def: &ExperimentDef| Box::new(StderrProgress::new(def.name.clone())) as Box<dyn Progress>,
    )?;
    info!("Finished {ran} experiment(s).");
    Ok(())
}

/// Build the run configuration. The `--verifyta` flag beats `VERIFYTA_PATH`,
/// which beats a bare `verifyta` looked up on `PATH`.
pub fn config_from_args(cli: &Cli, verifyta_env: Option<PathBuf>) -> RunConfig {
    let verifier_path = cli
        .verifyta
        .clone()
        .or(verifyta_env)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_VERIFYTA));

    RunConfig {
        template: cli.template.clone(),
        verifier_path,
        uncertainty: cli.uncertainty,
        time_bound: cli.time_bound,
        cache_dir: cli.cache_dir.clone(),
        out_dir: cli.out_dir.clone(),
        force_rerun: cli.force,
        filter: cli.filter.clone(),
        jobs: cli.jobs,
        export_csv: cli.export_csv,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smc_sweep=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Cancel `token` on the first Ctrl-C.
///
/// The signal is awaited on a small current-thread runtime of its own; the
/// sweep itself stays synchronous.
fn watch_ctrl_c(token: CancelToken) {
    let spawned = thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Interrupt handling disabled: {e}");
                    return;
                }
            };
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        debug!("Ctrl-C received, cancelling sweep");
                        token.cancel();
                    }
                    Err(e) => error!("Interrupt handling disabled: {e}"),
                }
            });
        });
    if let Err(e) = spawned {
        error!("Interrupt handling disabled: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifyta_flag_beats_environment() {
        let cli = Cli::try_parse_from(["sweep", "--verifyta", "/opt/uppaal/bin/verifyta", "m.xml"]).unwrap();
        let config = config_from_args(&cli, Some(PathBuf::from("/env/verifyta")));
        assert_eq!(config.verifier_path, PathBuf::from("/opt/uppaal/bin/verifyta"));
    }

    #[test]
    fn environment_beats_default() {
        let cli = Cli::try_parse_from(["sweep", "m.xml"]).unwrap();
        let config = config_from_args(&cli, Some(PathBuf::from("/env/verifyta")));
        assert_eq!(config.verifier_path, PathBuf::from("/env/verifyta"));

        let config = config_from_args(&cli, None);
        assert_eq!(config.verifier_path, PathBuf::from("verifyta"));
    }

    #[test]
    fn flags_land_in_config() {
        let cli = Cli::try_parse_from([
            "sweep",
            "--force",
            "--filter",
            "nbots",
            "--cache-dir",
            "results",
            "--export-csv",
            "m.xml",
        ])
        .unwrap();
        let config = config_from_args(&cli, None);
        assert!(config.force_rerun);
        assert!(config.export_csv);
        assert_eq!(config.filter.as_deref(), Some("nbots"));
        assert_eq!(config.cache_dir, PathBuf::from("results"));
        assert_eq!(config.template, PathBuf::from("m.xml"));
    }
}
