use crate::cli::RunArgs;
use crate::config::PartialSweepConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use relaxsweep::engine::error::SweepError;
use relaxsweep::engine::progress::ProgressReporter;
use relaxsweep::engine::simulator::CommandSimulator;
use relaxsweep::workflows;
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialSweepConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let app = partial_config.merge_with_cli(&args)?;

    let simulator = CommandSimulator::new(app.engine_command).map_err(SweepError::from)?;
    info!("Simulation engine: {}", simulator.program());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting sweep...");
    let result = match workflows::sweep::run(&app.sweep, &simulator, &reporter) {
        Err(SweepError::SelectionOutOfRange { index, len }) => {
            return Err(CliError::Argument(format!(
                "--b-index {} is out of range; axis B has {} value(s)",
                index, len
            )));
        }
        other => other?,
    };

    let summary = result.summary;
    println!(
        "Sweep of {} point(s) in {}: {} computed, {} already stored.",
        summary.total,
        result.manifest.dir().display(),
        summary.computed,
        summary.skipped
    );
    if summary.partial > 0 {
        warn!(
            "{} point(s) stored with {} failed condition(s).",
            summary.partial, summary.failed_conditions
        );
        println!(
            "Warning: {} point(s) kept zero rows for {} failed condition(s); see the log.",
            summary.partial, summary.failed_conditions
        );
    }
    Ok(())
}
