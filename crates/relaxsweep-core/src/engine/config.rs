use crate::core::models::grid::{Grid, GridError, logspace};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Settings forwarded verbatim to the external engine with every simulation call.
///
/// These replace engine-wide mutable defaults: the runner never touches global state, it
/// passes this value along.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineSettings {
    pub verbose: bool,
    pub parallel: bool,
    pub threads: Option<usize>,
}

/// One fixed experimental setting simulated independently at every grid point, e.g. a
/// spin-lock field strength ν₁ in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub index: usize,
    pub value: f64,
}

/// How the values of one sweep axis are generated.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSpec {
    /// `count` values log-spaced between `10^start` and `10^stop`, optionally preceded by an
    /// exact zero.
    Log {
        start: f64,
        stop: f64,
        count: usize,
        include_zero: bool,
    },
    Values(Vec<f64>),
}

impl AxisSpec {
    pub fn generate(&self) -> Result<Vec<f64>, GridError> {
        match self {
            AxisSpec::Log {
                start,
                stop,
                count,
                include_zero,
            } => {
                let spaced = logspace(*start, *stop, *count)?;
                if *include_zero {
                    Ok(std::iter::once(0.0).chain(spaced).collect())
                } else {
                    Ok(spaced)
                }
            }
            AxisSpec::Values(values) => Ok(values.clone()),
        }
    }
}

/// Which part of the grid this process is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointSelection {
    #[default]
    All,
    /// A single axis-B column, so that a sweep can be sharded across independent processes.
    AxisBIndex(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub root: PathBuf,
    pub run_prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub output: OutputConfig,
    pub axis_a: AxisSpec,
    pub axis_b: AxisSpec,
    pub conditions: Vec<Condition>,
    pub samples: usize,
    pub engine: EngineSettings,
    pub selection: PointSelection,
}

impl SweepConfig {
    pub fn grid(&self) -> Result<Grid, GridError> {
        Grid::new(self.axis_a.generate()?, self.axis_b.generate()?)
    }
}

#[derive(Default)]
pub struct SweepConfigBuilder {
    root: Option<PathBuf>,
    run_prefix: Option<String>,
    axis_a: Option<AxisSpec>,
    axis_b: Option<AxisSpec>,
    condition_values: Option<Vec<f64>>,
    samples: Option<usize>,
    engine: EngineSettings,
    selection: PointSelection,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }
    pub fn run_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.run_prefix = Some(prefix.into());
        self
    }
    pub fn axis_a(mut self, spec: AxisSpec) -> Self {
        self.axis_a = Some(spec);
        self
    }
    pub fn axis_b(mut self, spec: AxisSpec) -> Self {
        self.axis_b = Some(spec);
        self
    }
    pub fn conditions(mut self, values: Vec<f64>) -> Self {
        self.condition_values = Some(values);
        self
    }
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }
    pub fn engine(mut self, settings: EngineSettings) -> Self {
        self.engine = settings;
        self
    }
    pub fn selection(mut self, selection: PointSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        let run_prefix = self
            .run_prefix
            .ok_or(ConfigError::MissingParameter("run_prefix"))?;
        if run_prefix.is_empty() || run_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidParameter {
                parameter: "run_prefix",
                reason: format!("'{run_prefix}' is not a plain directory name prefix"),
            });
        }

        let condition_values = self
            .condition_values
            .ok_or(ConfigError::MissingParameter("conditions"))?;
        if condition_values.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "conditions",
                reason: "at least one condition is required".to_string(),
            });
        }

        let samples = self.samples.ok_or(ConfigError::MissingParameter("samples"))?;
        if samples == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "samples",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(SweepConfig {
            output: OutputConfig {
                root: self.root.ok_or(ConfigError::MissingParameter("root"))?,
                run_prefix,
            },
            axis_a: self.axis_a.ok_or(ConfigError::MissingParameter("axis_a"))?,
            axis_b: self.axis_b.ok_or(ConfigError::MissingParameter("axis_b"))?,
            conditions: condition_values
                .into_iter()
                .enumerate()
                .map(|(index, value)| Condition { index, value })
                .collect(),
            samples,
            engine: self.engine,
            selection: self.selection,
        })
    }
}
