use std::process::ExitCode;

use engine::world::Body;
use engine::{run_app, run_headless};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut session,
        paths,
        headless_ticks,
    } = app;

    if let Some(ticks) = headless_ticks {
        let summary = run_headless(&config, &mut session, ticks, |_| Vec::new());
        info!(
            ticks_run = summary.ticks_run,
            player_alive = session.world().player().base().is_alive(),
            "headless_complete"
        );
        return ExitCode::SUCCESS;
    }

    if let Err(err) = run_app(config, session, paths.assets_dir) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
