use std::process::ExitCode;

use splitscreen_engine::run_app;
use tracing::{error, info};

use super::bootstrap::build_app;

pub(crate) fn run() -> ExitCode {
    let app = match build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_app(app.config, app.session) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    info!("exit_clean");
    ExitCode::SUCCESS
}
