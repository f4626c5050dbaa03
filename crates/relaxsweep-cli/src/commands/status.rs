use crate::cli::StatusArgs;
use crate::config::PartialSweepConfig;
use crate::error::Result;
use relaxsweep::workflows;
use tracing::info;

pub fn run(args: StatusArgs) -> Result<()> {
    let output = PartialSweepConfig::resolve_output(args.config.as_deref(), &args.output)?;
    info!(
        "Scanning {:?} for '{}' run directories.",
        output.root, output.run_prefix
    );

    let statuses = workflows::collect::status(&output.root, &output.run_prefix)?;
    if statuses.is_empty() {
        println!(
            "No '{}' run directories under {}.",
            output.run_prefix,
            output.root.display()
        );
        return Ok(());
    }

    for status in &statuses {
        let (rows, columns) = status.shape;
        let marker = if status.is_finished() { "✓" } else { " " };
        println!(
            "{} {:<32} {:>4} x {:<4} {:>7}/{:<7} ({:.1}%)",
            marker,
            status.dir.display(),
            rows,
            columns,
            status.completed,
            status.total(),
            100.0 * status.completed as f64 / status.total() as f64
        );
    }
    Ok(())
}
