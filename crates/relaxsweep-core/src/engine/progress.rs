use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Estimate(ProgressEstimate),
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// Wall-time projection of a sweep, derived from the points computed so far in this run.
///
/// The mean cost of a computed point is scaled to every selected point, so a resumed run
/// projects the duration of the whole sweep rather than only of what is left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEstimate {
    pub completed: u64,
    pub total: u64,
    pub elapsed: Duration,
    pub mean_cost: Duration,
    pub projected_total: Duration,
}

impl ProgressEstimate {
    pub fn new(completed: u64, total: u64, elapsed: Duration) -> Option<Self> {
        if completed == 0 {
            return None;
        }
        let mean_cost = elapsed.div_f64(completed as f64);
        Some(Self {
            completed,
            total,
            elapsed,
            mean_cost,
            projected_total: mean_cost.mul_f64(total.max(completed) as f64),
        })
    }

    pub fn remaining(&self) -> Duration {
        self.projected_total.saturating_sub(self.elapsed)
    }
}

impl fmt::Display for ProgressEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = TimeUnit::for_duration(self.projected_total);
        write!(
            f,
            "{:.2} {unit} elapsed out of ~{:.2} {unit}",
            unit.scale(self.elapsed),
            unit.scale(self.projected_total),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    fn for_duration(d: Duration) -> Self {
        match d.as_secs() {
            0..120 => TimeUnit::Seconds,
            120..7200 => TimeUnit::Minutes,
            _ => TimeUnit::Hours,
        }
    }

    fn scale(self, d: Duration) -> f64 {
        match self {
            TimeUnit::Seconds => d.as_secs_f64(),
            TimeUnit::Minutes => d.as_secs_f64() / 60.0,
            TimeUnit::Hours => d.as_secs_f64() / 3600.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(format!("{p:?}"));
        }));

        reporter.report(Progress::PhaseStart { name: "Sweep" });
        reporter.report(Progress::TaskStart { total_steps: 3 });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("Sweep"));
        assert!(seen[1].contains("total_steps: 3"));
    }

    #[test]
    fn estimate_requires_at_least_one_completed_point() {
        assert!(ProgressEstimate::new(0, 10, Duration::from_secs(5)).is_none());
    }

    #[test]
    fn estimate_projects_mean_cost_over_all_points() {
        let estimate = ProgressEstimate::new(4, 10, Duration::from_secs(120)).unwrap();
        assert_eq!(estimate.mean_cost, Duration::from_secs(30));
        assert_eq!(estimate.projected_total, Duration::from_secs(300));
        assert_eq!(estimate.remaining(), Duration::from_secs(180));
    }

    #[test]
    fn estimate_formats_in_a_unit_matching_the_projection() {
        let short = ProgressEstimate::new(1, 2, Duration::from_secs(30)).unwrap();
        assert_eq!(short.to_string(), "30.00 seconds elapsed out of ~60.00 seconds");

        let long = ProgressEstimate::new(1, 81, Duration::from_secs(1800)).unwrap();
        assert_eq!(long.to_string(), "0.50 hours elapsed out of ~40.50 hours");
    }
}
