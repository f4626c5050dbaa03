use super::config::{Condition, ConfigError, EngineSettings};
use crate::core::models::point::SweepPoint;
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Engine returned {found} samples, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Sample {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },

    #[error("Failed to launch engine '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Engine exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("Engine output is not numeric: {0}")]
    Output(String),
}

/// Everything the external engine needs to simulate one condition at one grid point.
#[derive(Debug, Clone, Copy)]
pub struct SimulationRequest<'a> {
    pub point: &'a SweepPoint,
    pub condition: &'a Condition,
    pub samples: usize,
    pub settings: &'a EngineSettings,
}

/// The contract with the external spin-dynamics engine.
///
/// Implementations may take seconds to minutes per call and may fail for numerical reasons
/// (e.g. a singular propagator at a particular field strength). The runner calls
/// [`Simulator::simulate`] once per condition and isolates each failure.
pub trait Simulator {
    fn simulate(&self, request: &SimulationRequest<'_>) -> Result<Vec<f64>, SimulationError>;
}

impl<F> Simulator for F
where
    F: Fn(&SimulationRequest<'_>) -> Result<Vec<f64>, SimulationError>,
{
    fn simulate(&self, request: &SimulationRequest<'_>) -> Result<Vec<f64>, SimulationError> {
        self(request)
    }
}

/// Runs an external program once per condition and reads the decay curve from its standard
/// output as whitespace- or comma-separated floats.
///
/// Arguments may contain the placeholders `{a}`, `{b}`, `{i}`, `{j}`, `{condition}`,
/// `{condition-index}`, `{samples}` and `{threads}`. Engine settings are also exported as
/// `RELAXSWEEP_VERBOSE`, `RELAXSWEEP_PARALLEL` and `RELAXSWEEP_THREADS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSimulator {
    program: String,
    args: Vec<String>,
}

impl CommandSimulator {
    pub fn new(command: Vec<String>) -> Result<Self, ConfigError> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::MissingParameter("engine.command"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, request: &SimulationRequest<'_>) -> Vec<String> {
        let threads = request
            .settings
            .threads
            .map(|t| t.to_string())
            .unwrap_or_default();
        let substitutions = [
            ("{a}", request.point.a.to_string()),
            ("{b}", request.point.b.to_string()),
            ("{i}", request.point.i.to_string()),
            ("{j}", request.point.j.to_string()),
            ("{condition-index}", request.condition.index.to_string()),
            ("{condition}", request.condition.value.to_string()),
            ("{samples}", request.samples.to_string()),
            ("{threads}", threads),
        ];
        self.args
            .iter()
            .map(|arg| {
                substitutions
                    .iter()
                    .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
            })
            .collect()
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&self, request: &SimulationRequest<'_>) -> Result<Vec<f64>, SimulationError> {
        let args = self.render_args(request);
        trace!("Invoking engine: {} {:?}", self.program, args);

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .env("RELAXSWEEP_VERBOSE", flag(request.settings.verbose))
            .env("RELAXSWEEP_PARALLEL", flag(request.settings.parallel));
        if let Some(threads) = request.settings.threads {
            command.env("RELAXSWEEP_THREADS", threads.to_string());
        }

        let output = command.output().map_err(|e| SimulationError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(SimulationError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_engine_output(&String::from_utf8_lossy(&output.stdout))
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Parses a decay curve printed as floats separated by whitespace and/or commas.
pub fn parse_engine_output(stdout: &str) -> Result<Vec<f64>, SimulationError> {
    stdout
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| SimulationError::Output(format!("unexpected token '{token}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_parts() -> (SweepPoint, Condition, EngineSettings) {
        (
            SweepPoint {
                i: 2,
                j: 5,
                a: 1e-5,
                b: 10.0,
            },
            Condition {
                index: 1,
                value: 7000.0,
            },
            EngineSettings {
                verbose: false,
                parallel: true,
                threads: Some(4),
            },
        )
    }

    #[test]
    fn closures_are_simulators() {
        let (point, condition, settings) = request_parts();
        let request = SimulationRequest {
            point: &point,
            condition: &condition,
            samples: 2,
            settings: &settings,
        };
        let sim = |r: &SimulationRequest<'_>| {
            Ok::<_, SimulationError>(vec![r.point.a, r.condition.value])
        };
        assert_eq!(sim.simulate(&request).unwrap(), vec![1e-5, 7000.0]);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert_eq!(
            CommandSimulator::new(vec![]),
            Err(ConfigError::MissingParameter("engine.command"))
        );
        assert_eq!(
            CommandSimulator::new(vec!["  ".to_string()]),
            Err(ConfigError::MissingParameter("engine.command"))
        );
    }

    #[test]
    fn placeholders_are_substituted() {
        let (point, condition, settings) = request_parts();
        let request = SimulationRequest {
            point: &point,
            condition: &condition,
            samples: 500,
            settings: &settings,
        };
        let sim = CommandSimulator::new(
            [
                "engine", "--tc={a}", "{b}", "{i},{j}", "{condition}", "{condition-index}",
                "{samples}", "-j{threads}",
            ]
            .map(String::from)
            .to_vec(),
        )
        .unwrap();

        assert_eq!(
            sim.render_args(&request),
            vec!["--tc=0.00001", "10", "2,5", "7000", "1", "500", "-j4"]
        );
    }

    #[test]
    fn engine_output_accepts_whitespace_and_commas() {
        assert_eq!(
            parse_engine_output("1.0 0.5,\n0.25\t1e-3\n").unwrap(),
            vec![1.0, 0.5, 0.25, 1e-3]
        );
        assert!(parse_engine_output("").unwrap().is_empty());
        assert!(matches!(
            parse_engine_output("1.0 error"),
            Err(SimulationError::Output(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_simulator_reads_stdout() {
        let (point, condition, settings) = request_parts();
        let request = SimulationRequest {
            point: &point,
            condition: &condition,
            samples: 3,
            settings: &settings,
        };
        let sim = CommandSimulator::new(
            ["sh", "-c", "echo {i} {j} $RELAXSWEEP_PARALLEL"]
                .map(String::from)
                .to_vec(),
        )
        .unwrap();
        assert_eq!(sim.simulate(&request).unwrap(), vec![2.0, 5.0, 1.0]);
    }

    #[cfg(unix)]
    #[test]
    fn command_simulator_reports_failing_exit_status() {
        let (point, condition, settings) = request_parts();
        let request = SimulationRequest {
            point: &point,
            condition: &condition,
            samples: 1,
            settings: &settings,
        };
        let sim = CommandSimulator::new(
            ["sh", "-c", "echo singular propagator >&2; exit 3"]
                .map(String::from)
                .to_vec(),
        )
        .unwrap();
        match sim.simulate(&request) {
            Err(SimulationError::Exit { stderr, .. }) => {
                assert_eq!(stderr, "singular propagator")
            }
            other => panic!("expected exit failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let (point, condition, settings) = request_parts();
        let request = SimulationRequest {
            point: &point,
            condition: &condition,
            samples: 1,
            settings: &settings,
        };
        let sim = CommandSimulator::new(vec!["relaxsweep-no-such-engine-binary".to_string()])
            .unwrap();
        assert!(matches!(
            sim.simulate(&request),
            Err(SimulationError::Spawn { .. })
        ));
    }
}
