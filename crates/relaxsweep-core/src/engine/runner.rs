use super::config::{Condition, EngineSettings, PointSelection, SweepConfig};
use super::error::SweepError;
use super::manifest::Manifest;
use super::progress::{Progress, ProgressEstimate, ProgressReporter};
use super::simulator::{SimulationError, SimulationRequest, Simulator};
use crate::core::models::point::SweepPoint;
use crate::core::models::record::ResultRecord;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Terminal state of one grid point after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// The record already existed; nothing was simulated.
    Skipped,
    /// Every condition succeeded.
    Done,
    /// The record was persisted, but at least one condition kept its default row.
    DonePartial,
}

#[derive(Debug)]
pub struct ConditionFailure {
    pub condition: Condition,
    pub error: SimulationError,
}

#[derive(Debug)]
pub enum PointOutcome {
    Skipped,
    Computed {
        record: ResultRecord,
        failures: Vec<ConditionFailure>,
    },
}

impl PointOutcome {
    pub fn status(&self) -> PointStatus {
        match self {
            PointOutcome::Skipped => PointStatus::Skipped,
            PointOutcome::Computed { failures, .. } if failures.is_empty() => PointStatus::Done,
            PointOutcome::Computed { .. } => PointStatus::DonePartial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepSummary {
    pub total: usize,
    pub skipped: usize,
    pub computed: usize,
    pub partial: usize,
    pub failed_conditions: usize,
}

/// Drives the per-point work of a sweep against one manifest.
pub struct SweepRunner<'a> {
    conditions: &'a [Condition],
    samples: usize,
    settings: &'a EngineSettings,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> SweepRunner<'a> {
    pub fn new(config: &'a SweepConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self {
            conditions: &config.conditions,
            samples: config.samples,
            settings: &config.engine,
            reporter,
        }
    }

    pub fn is_complete(&self, manifest: &Manifest, point: &SweepPoint) -> bool {
        manifest.is_complete(point)
    }

    /// Simulates every condition of `point` and persists the assembled record.
    ///
    /// A condition that fails keeps its zero row and is logged with the record's file name; the
    /// record is stored regardless so the point is never recomputed. Only storage failures are
    /// returned as errors.
    pub fn compute_and_store<S>(
        &self,
        manifest: &Manifest,
        point: &SweepPoint,
        simulator: &S,
    ) -> Result<PointOutcome, SweepError>
    where
        S: Simulator + ?Sized,
    {
        if self.is_complete(manifest, point) {
            debug!("Point {} already persisted; skipping.", point);
            return Ok(PointOutcome::Skipped);
        }

        let mut record = ResultRecord::zeroed(self.conditions.len(), self.samples)
            .map_err(|e| SweepError::Internal(format!("cannot allocate record: {e}")))?;
        let mut failures = Vec::new();

        for condition in self.conditions {
            let request = SimulationRequest {
                point,
                condition,
                samples: self.samples,
                settings: self.settings,
            };
            let outcome = simulator
                .simulate(&request)
                .and_then(|samples| check_samples(samples, self.samples));

            match outcome {
                Ok(samples) => record
                    .set_row(condition.index, &samples)
                    .map_err(|e| SweepError::Internal(e.to_string()))?,
                Err(error) => {
                    warn!(
                        "Simulation failed for {} (condition {} = {}) at point {}: {}",
                        manifest.record_path(point).display(),
                        condition.index,
                        condition.value,
                        point,
                        error
                    );
                    failures.push(ConditionFailure {
                        condition: *condition,
                        error,
                    });
                }
            }
        }

        manifest.store(point, &record)?;
        Ok(PointOutcome::Computed { record, failures })
    }

    /// Emits the projected duration after a newly computed point. Purely observational.
    pub fn report_progress(
        &self,
        completed: usize,
        total: usize,
        elapsed: Duration,
    ) -> Option<ProgressEstimate> {
        let estimate = ProgressEstimate::new(completed as u64, total as u64, elapsed)?;
        info!("{estimate}");
        self.reporter.report(Progress::Estimate(estimate));
        Some(estimate)
    }

    /// Visits the selected points of `manifest` in row-major order, computing the ones that
    /// are not yet persisted.
    pub fn run<S>(
        &self,
        manifest: &Manifest,
        selection: PointSelection,
        simulator: &S,
    ) -> Result<SweepSummary, SweepError>
    where
        S: Simulator + ?Sized,
    {
        let points = manifest.select(selection)?;
        let total = points.len();
        let pending = points
            .clone()
            .filter(|p| !self.is_complete(manifest, p))
            .count();
        info!(
            "{} of {} selected point(s) still need computing.",
            pending, total
        );

        self.reporter.report(Progress::TaskStart {
            total_steps: total as u64,
        });

        let started = Instant::now();
        let mut summary = SweepSummary {
            total,
            ..SweepSummary::default()
        };

        for point in points {
            let outcome = self.compute_and_store(manifest, &point, simulator)?;
            match &outcome {
                PointOutcome::Skipped => summary.skipped += 1,
                PointOutcome::Computed { failures, .. } => {
                    summary.computed += 1;
                    if !failures.is_empty() {
                        summary.partial += 1;
                        summary.failed_conditions += failures.len();
                    }
                    self.report_progress(summary.computed, total, started.elapsed());
                }
            }
            self.reporter.report(Progress::TaskIncrement);
        }

        self.reporter.report(Progress::TaskFinish);
        Ok(summary)
    }
}

fn check_samples(samples: Vec<f64>, expected: usize) -> Result<Vec<f64>, SimulationError> {
    if samples.len() != expected {
        return Err(SimulationError::ShapeMismatch {
            expected,
            found: samples.len(),
        });
    }
    if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
        return Err(SimulationError::NonFinite {
            index,
            value: samples[index],
        });
    }
    Ok(samples)
}
