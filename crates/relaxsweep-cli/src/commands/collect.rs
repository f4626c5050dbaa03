use crate::cli::CollectArgs;
use crate::config::PartialSweepConfig;
use crate::error::{CliError, Result};
use relaxsweep::workflows::collect::{self, CollectedPoint};
use std::io::Write;
use tracing::info;

pub fn run(args: CollectArgs) -> Result<()> {
    let output = PartialSweepConfig::resolve_output(args.config.as_deref(), &args.output)?;
    let collected = collect::run(&output.root, &output.run_prefix)?;

    let file = std::fs::File::create(&args.out)?;
    let rows = write_csv(file, &collected).map_err(|source| CliError::Export {
        path: args.out.clone(),
        source,
    })?;

    info!("Exported {} row(s) to {:?}.", rows, args.out);
    println!(
        "Exported {} point(s) ({} row(s)) to {}",
        collected.len(),
        rows,
        args.out.display()
    );
    Ok(())
}

/// Writes one row per (point, condition): `run,i,j,a,b,condition,s0..sN`. Returns the row count.
fn write_csv<W: Write>(writer: W, collected: &[CollectedPoint]) -> csv::Result<usize> {
    let samples = collected
        .iter()
        .map(|c| c.record.shape().1)
        .max()
        .unwrap_or(0);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    let mut header: Vec<String> = ["run", "i", "j", "a", "b", "condition"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend((0..samples).map(|k| format!("s{k}")));
    writer.write_record(&header)?;

    let mut rows = 0;
    for entry in collected {
        for (condition, values) in entry.record.rows().enumerate() {
            let mut fields = vec![
                entry.run.to_string(),
                entry.point.i.to_string(),
                entry.point.j.to_string(),
                entry.point.a.to_string(),
                entry.point.b.to_string(),
                condition.to_string(),
            ];
            fields.extend(values.iter().map(f64::to_string));
            writer.write_record(&fields)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}
