use super::config::PointSelection;
use super::error::SweepError;
use crate::core::io::{StorageError, axis, naming, record};
use crate::core::models::grid::{AxisId, Grid, Points};
use crate::core::models::point::SweepPoint;
use crate::core::models::record::ResultRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Handle to one run directory: its number, location and persisted grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    run: usize,
    dir: PathBuf,
    grid: Grid,
}

enum DirState {
    Vacant,
    Persisted(Grid),
}

impl Manifest {
    pub fn run(&self) -> usize {
        self.run
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Every grid point in the fixed row-major sweep order.
    pub fn points(&self) -> Points<'_> {
        self.grid.points()
    }

    pub fn select(&self, selection: PointSelection) -> Result<Points<'_>, SweepError> {
        match selection {
            PointSelection::All => Ok(self.grid.points()),
            PointSelection::AxisBIndex(j) => {
                self.grid
                    .column(j)
                    .ok_or_else(|| SweepError::SelectionOutOfRange {
                        index: j,
                        len: self.grid.axis_b().len(),
                    })
            }
        }
    }

    pub fn record_path(&self, point: &SweepPoint) -> PathBuf {
        self.dir.join(naming::record_file_name(point.i, point.j))
    }

    pub fn is_complete(&self, point: &SweepPoint) -> bool {
        self.record_path(point).is_file()
    }

    pub fn store(&self, point: &SweepPoint, record: &ResultRecord) -> Result<(), StorageError> {
        record::write_record(&self.record_path(point), record)
    }

    pub fn load(&self, point: &SweepPoint) -> Result<ResultRecord, StorageError> {
        record::read_record(&self.record_path(point))
    }

    /// Reconstructs the completion index from the directory listing alone. Record names outside
    /// the grid and unrelated files are ignored.
    pub fn completed(&self) -> Result<Vec<SweepPoint>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let mut points = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            let Some((i, j)) = entry
                .file_name()
                .to_str()
                .and_then(naming::parse_record_file_name)
            else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            if let Some(point) = self.grid.point(i, j) {
                points.push(point);
            }
        }
        points.sort_by_key(SweepPoint::indices);
        Ok(points)
    }

    /// Opens an existing run directory. Returns `None` for a directory that holds neither axis
    /// files nor records.
    pub fn open(dir: &Path, run: usize) -> Result<Option<Self>, SweepError> {
        Ok(match inspect(dir)? {
            DirState::Vacant => None,
            DirState::Persisted(grid) => Some(Self {
                run,
                dir: dir.to_path_buf(),
                grid,
            }),
        })
    }

    fn create(run: usize, dir: PathBuf, grid: &Grid) -> Result<Self, SweepError> {
        for id in [AxisId::A, AxisId::B] {
            axis::write_axis(&dir.join(naming::axis_file_name(id)), grid.axis(id))?;
        }
        Ok(Self {
            run,
            dir,
            grid: grid.clone(),
        })
    }
}

fn inspect(dir: &Path) -> Result<DirState, SweepError> {
    let path_a = dir.join(naming::AXIS_A_FILE);
    let path_b = dir.join(naming::AXIS_B_FILE);

    match (path_a.is_file(), path_b.is_file()) {
        (true, true) => {
            let grid = Grid::new(axis::read_axis(&path_a)?, axis::read_axis(&path_b)?)
                .map_err(|e| SweepError::ManifestCorrupt {
                    dir: dir.to_path_buf(),
                    reason: format!("persisted grid is invalid: {e}"),
                })?;
            Ok(DirState::Persisted(grid))
        }
        (true, false) | (false, true) => {
            let missing = if path_a.is_file() {
                naming::AXIS_B_FILE
            } else {
                naming::AXIS_A_FILE
            };
            Err(SweepError::ManifestCorrupt {
                dir: dir.to_path_buf(),
                reason: format!("'{missing}' is missing"),
            })
        }
        (false, false) => {
            if contains_records(dir)? {
                Err(SweepError::ManifestCorrupt {
                    dir: dir.to_path_buf(),
                    reason: "result records are present but both axis files are missing"
                        .to_string(),
                })
            } else {
                Ok(DirState::Vacant)
            }
        }
    }
}

fn contains_records(dir: &Path) -> Result<bool, StorageError> {
    let entries = fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        if entry
            .file_name()
            .to_str()
            .and_then(naming::parse_record_file_name)
            .is_some()
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Finds the run directory whose persisted grid equals `grid`, or creates the next one.
///
/// Run directories `<prefix>0`, `<prefix>1`, ... are searched in order while they exist. A
/// directory whose grid differs is skipped; an empty directory is adopted; a directory with
/// only one axis file (or records without axes) is reported as [`SweepError::ManifestCorrupt`].
#[instrument(skip_all, name = "resolve_manifest", fields(root = %root.display(), prefix = run_prefix))]
pub fn resolve_manifest(root: &Path, run_prefix: &str, grid: &Grid) -> Result<Manifest, SweepError> {
    fs::create_dir_all(root).map_err(|e| StorageError::io(root, e))?;

    let mut run = 0;
    loop {
        let dir = root.join(naming::run_dir_name(run_prefix, run));

        if !dir.exists() {
            // The axes are staged next to the run directories and renamed into place, so a
            // concurrent shard never observes a manifest with only one axis file.
            let staged = stage_axes(root, grid)?;
            match fs::rename(staged.path(), &dir) {
                Ok(()) => {
                    info!(
                        "No existing manifest matches the requested {}x{} grid; created {:?}.",
                        grid.shape().0,
                        grid.shape().1,
                        dir
                    );
                    return Ok(Manifest {
                        run,
                        dir,
                        grid: grid.clone(),
                    });
                }
                Err(e) if is_taken(&e) => {
                    debug!("{:?} was created concurrently; inspecting it again.", dir);
                    continue;
                }
                Err(e) => return Err(StorageError::io(&dir, e).into()),
            }
        }

        match inspect(&dir)? {
            DirState::Persisted(existing) if existing == *grid => {
                info!("Resuming sweep in existing manifest {:?}.", dir);
                return Ok(Manifest {
                    run,
                    dir,
                    grid: existing,
                });
            }
            DirState::Persisted(_) => {
                debug!("Manifest {:?} holds a different grid; trying the next run.", dir);
            }
            DirState::Vacant => {
                info!("Adopting empty run directory {:?}.", dir);
                return Manifest::create(run, dir, grid);
            }
        }
        run += 1;
    }
}

fn stage_axes(root: &Path, grid: &Grid) -> Result<tempfile::TempDir, StorageError> {
    let staged = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(root)
        .map_err(|e| StorageError::io(root, e))?;
    for id in [AxisId::A, AxisId::B] {
        axis::write_axis(&staged.path().join(naming::axis_file_name(id)), grid.axis(id))?;
    }
    Ok(staged)
}

fn is_taken(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::AlreadyExists | ErrorKind::DirectoryNotEmpty
    )
}

/// Lists the run directories under `root` in numeric order. A missing root yields no runs.
pub fn list_run_dirs(root: &Path, run_prefix: &str) -> Result<Vec<(usize, PathBuf)>, StorageError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut runs = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| StorageError::io(root, e))? {
        let entry = entry.map_err(|e| StorageError::io(root, e))?;
        let Some(run) = entry
            .file_name()
            .to_str()
            .and_then(|name| naming::parse_run_dir_name(name, run_prefix))
        else {
            continue;
        };
        if entry.path().is_dir() {
            runs.push((run, entry.path()));
        }
    }
    runs.sort_by_key(|(run, _)| *run);
    Ok(runs)
}
