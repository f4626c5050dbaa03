use crate::engine::config::SweepConfig;
use crate::engine::error::SweepError;
use crate::engine::manifest::{Manifest, resolve_manifest};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::runner::{SweepRunner, SweepSummary};
use crate::engine::simulator::Simulator;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct SweepResult {
    pub manifest: Manifest,
    pub summary: SweepSummary,
}

#[instrument(skip_all, name = "sweep_workflow")]
pub fn run<S>(
    config: &SweepConfig,
    simulator: &S,
    reporter: &ProgressReporter,
) -> Result<SweepResult, SweepError>
where
    S: Simulator + ?Sized,
{
    // === Phase 1: Resolve the manifest for the requested grid ===
    reporter.report(Progress::PhaseStart {
        name: "Resolving manifest",
    });
    let grid = config.grid()?;
    let manifest = resolve_manifest(&config.output.root, &config.output.run_prefix, &grid)?;
    // Validate the shard before any work starts.
    manifest.select(config.selection)?;
    reporter.report(Progress::Message(format!(
        "Using manifest {} ({}x{} grid, {} condition(s), {} samples)",
        manifest.dir().display(),
        grid.shape().0,
        grid.shape().1,
        config.conditions.len(),
        config.samples
    )));
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Sweep the grid ===
    reporter.report(Progress::PhaseStart {
        name: "Sweeping grid",
    });
    let runner = SweepRunner::new(config, reporter);
    let summary = runner.run(&manifest, config.selection, simulator)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Sweep finished: {} computed ({} partial), {} skipped, {} total.",
        summary.computed, summary.partial, summary.skipped, summary.total
    );
    Ok(SweepResult { manifest, summary })
}
