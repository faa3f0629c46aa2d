use std::process::ExitCode;

use smc_sweep::error::ErrorKind;

fn main() -> ExitCode {
    match smc_sweep::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Interrupted runs exit quietly.
        Err(err) if err.kind() == ErrorKind::Interrupted => ExitCode::from(err.exit_code()),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
