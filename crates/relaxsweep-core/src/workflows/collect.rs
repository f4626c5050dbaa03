use crate::core::models::point::SweepPoint;
use crate::core::models::record::ResultRecord;
use crate::engine::error::SweepError;
use crate::engine::manifest::{Manifest, list_run_dirs};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One persisted grid point, with its coordinates recovered from the manifest's axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedPoint {
    pub run: usize,
    pub point: SweepPoint,
    pub record: ResultRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestStatus {
    pub run: usize,
    pub dir: PathBuf,
    pub shape: (usize, usize),
    pub completed: usize,
}

impl ManifestStatus {
    pub fn total(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    pub fn is_finished(&self) -> bool {
        self.completed == self.total()
    }
}

/// Opens every readable manifest under `root`. Collection is read-only, so a corrupt run
/// directory is reported and skipped rather than aborting the scan.
fn open_manifests(root: &Path, run_prefix: &str) -> Result<Vec<Manifest>, SweepError> {
    let mut manifests = Vec::new();
    for (run, dir) in list_run_dirs(root, run_prefix)? {
        match Manifest::open(&dir, run) {
            Ok(Some(manifest)) => manifests.push(manifest),
            Ok(None) => {}
            Err(SweepError::ManifestCorrupt { dir, reason }) => {
                warn!("Skipping corrupt manifest {:?}: {}", dir, reason);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(manifests)
}

/// Loads every persisted record of every run directory, ordered by run and then row-major by
/// grid index.
#[instrument(skip_all, name = "collect_workflow", fields(root = %root.display()))]
pub fn run(root: &Path, run_prefix: &str) -> Result<Vec<CollectedPoint>, SweepError> {
    let mut collected = Vec::new();
    for manifest in open_manifests(root, run_prefix)? {
        let points = manifest.completed()?;
        info!(
            "Loading {} record(s) from {:?}.",
            points.len(),
            manifest.dir()
        );
        for point in points {
            let record = manifest.load(&point)?;
            collected.push(CollectedPoint {
                run: manifest.run(),
                point,
                record,
            });
        }
    }
    Ok(collected)
}

pub fn status(root: &Path, run_prefix: &str) -> Result<Vec<ManifestStatus>, SweepError> {
    open_manifests(root, run_prefix)?
        .into_iter()
        .map(|manifest| -> Result<ManifestStatus, SweepError> {
            Ok(ManifestStatus {
                run: manifest.run(),
                dir: manifest.dir().to_path_buf(),
                shape: manifest.grid().shape(),
                completed: manifest.completed()?.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::naming;
    use crate::core::models::grid::Grid;
    use crate::engine::manifest::resolve_manifest;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn collects_records_across_runs_with_coordinates() {
        let root = tempdir().unwrap();
        let g0 = Grid::new(vec![1e-6, 1e-5], vec![0.0, 1.0]).unwrap();
        let g1 = Grid::new(vec![1e-4], vec![10.0]).unwrap();
        let m0 = resolve_manifest(root.path(), "run", &g0).unwrap();
        let m1 = resolve_manifest(root.path(), "run", &g1).unwrap();

        let record = |v: f64| ResultRecord::from_rows(vec![vec![v, v]]).unwrap();
        m0.store(&g0.point(1, 0).unwrap(), &record(2.0)).unwrap();
        m0.store(&g0.point(0, 1).unwrap(), &record(1.0)).unwrap();
        m1.store(&g1.point(0, 0).unwrap(), &record(3.0)).unwrap();

        let collected = run(root.path(), "run").unwrap();

        let summary: Vec<_> = collected
            .iter()
            .map(|c| (c.run, c.point.indices(), c.point.a, c.point.b, c.record.row(0).unwrap()[0]))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, (0, 1), 1e-6, 1.0, 1.0),
                (0, (1, 0), 1e-5, 0.0, 2.0),
                (1, (0, 0), 1e-4, 10.0, 3.0),
            ]
        );
    }

    #[test]
    fn corrupt_manifests_are_skipped_when_collecting() {
        let root = tempdir().unwrap();
        let g = Grid::new(vec![1.0], vec![2.0]).unwrap();
        let m = resolve_manifest(root.path(), "run", &g).unwrap();
        m.store(
            &g.point(0, 0).unwrap(),
            &ResultRecord::zeroed(1, 1).unwrap(),
        )
        .unwrap();
        let broken = root.path().join("run1");
        fs::create_dir(&broken).unwrap();
        fs::write(broken.join(naming::AXIS_A_FILE), "values = [1.0]").unwrap();

        assert_eq!(run(root.path(), "run").unwrap().len(), 1);
        assert_eq!(status(root.path(), "run").unwrap().len(), 1);
    }

    #[test]
    fn status_reports_completion_per_manifest() {
        let root = tempdir().unwrap();
        let g = Grid::new(vec![1.0, 2.0], vec![3.0, 4.0, 5.0]).unwrap();
        let m = resolve_manifest(root.path(), "run", &g).unwrap();
        for point in g.points().take(6) {
            m.store(&point, &ResultRecord::zeroed(1, 1).unwrap()).unwrap();
        }
        let g2 = Grid::new(vec![1.0], vec![3.0]).unwrap();
        resolve_manifest(root.path(), "run", &g2).unwrap();

        let statuses = status(root.path(), "run").unwrap();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].shape, (2, 3));
        assert_eq!(statuses[0].completed, 6);
        assert!(statuses[0].is_finished());
        assert_eq!(statuses[1].completed, 0);
        assert!(!statuses[1].is_finished());
    }

    #[test]
    fn missing_root_has_nothing_to_collect() {
        let root = tempdir().unwrap();
        let absent = root.path().join("never-created");
        assert!(run(&absent, "run").unwrap().is_empty());
        assert!(status(&absent, "run").unwrap().is_empty());
    }
}
