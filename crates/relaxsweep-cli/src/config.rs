mod defaults;
mod models;

pub use models::AppConfig;

use crate::cli::{OutputArgs, RunArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use defaults::DefaultsConfig;
use relaxsweep::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    root: Option<PathBuf>,
    run_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAxisConfig {
    start: Option<f64>,
    stop: Option<f64>,
    count: Option<usize>,
    include_zero: Option<bool>,
    values: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialConditionsConfig {
    values: Option<Vec<f64>>,
    samples: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialEngineConfig {
    command: Option<Vec<String>>,
    verbose: Option<bool>,
    parallel: Option<bool>,
    threads: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSweepConfig {
    output: Option<PartialOutputConfig>,
    #[serde(rename = "axis-a")]
    axis_a: Option<PartialAxisConfig>,
    #[serde(rename = "axis-b")]
    axis_b: Option<PartialAxisConfig>,
    conditions: Option<PartialConditionsConfig>,
    engine: Option<PartialEngineConfig>,
}

impl PartialAxisConfig {
    fn into_spec(self, table: &str) -> Result<core_config::AxisSpec> {
        let include_zero = self.include_zero.unwrap_or(false);
        match (self.values, self.start, self.stop, self.count) {
            (Some(values), None, None, None) => {
                let values = if include_zero {
                    std::iter::once(0.0).chain(values).collect()
                } else {
                    values
                };
                Ok(core_config::AxisSpec::Values(values))
            }
            (Some(_), _, _, _) => Err(CliError::Config(format!(
                "`[{}]` takes either `values` or `start`/`stop`/`count`, not both.",
                table
            ))),
            (None, Some(start), Some(stop), Some(count)) => Ok(core_config::AxisSpec::Log {
                start,
                stop,
                count,
                include_zero,
            }),
            (None, ..) => Err(CliError::Config(format!(
                "`[{}]` requires `start`, `stop` and `count` (or an explicit `values` list).",
                table
            ))),
        }
    }
}

impl PartialSweepConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the output location for commands that only read run directories.
    pub fn resolve_output(
        config_path: Option<&Path>,
        args: &OutputArgs,
    ) -> Result<core_config::OutputConfig> {
        let partial = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let defaults = DefaultsConfig::default();
        let output = partial.output.unwrap_or_default();
        Ok(core_config::OutputConfig {
            root: args.root.clone().or(output.root).unwrap_or(defaults.root),
            run_prefix: args
                .run_prefix
                .clone()
                .or(output.run_prefix)
                .unwrap_or(defaults.run_prefix),
        })
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let output = self.output.take().unwrap_or_default();
        let conditions = self.conditions.take().unwrap_or_default();
        let engine = self.engine.take().unwrap_or_default();

        let axis_a = self
            .axis_a
            .take()
            .ok_or_else(|| CliError::Config("`[axis-a]` section is required.".to_string()))?
            .into_spec("axis-a")?;
        let axis_b = self
            .axis_b
            .take()
            .ok_or_else(|| CliError::Config("`[axis-b]` section is required.".to_string()))?
            .into_spec("axis-b")?;

        let engine_command = args
            .engine_command
            .clone()
            .or(engine.command)
            .filter(|command| !command.is_empty())
            .ok_or_else(|| {
                CliError::Config(
                    "`engine.command` is required either in the config file or via --engine-command."
                        .to_string(),
                )
            })?;

        let settings = core_config::EngineSettings {
            verbose: args.engine_verbose
                || engine.verbose.unwrap_or(defaults.engine_verbose),
            parallel: args.engine_parallel
                || engine.parallel.unwrap_or(defaults.engine_parallel),
            threads: args.threads.or(engine.threads),
        };

        let selection = match args.b_index {
            Some(index) => core_config::PointSelection::AxisBIndex(index),
            None => core_config::PointSelection::All,
        };

        let sweep = core_config::SweepConfigBuilder::new()
            .root(
                args.output
                    .root
                    .clone()
                    .or(output.root)
                    .unwrap_or(defaults.root),
            )
            .run_prefix(
                args.output
                    .run_prefix
                    .clone()
                    .or(output.run_prefix)
                    .unwrap_or(defaults.run_prefix),
            )
            .axis_a(axis_a)
            .axis_b(axis_b)
            .conditions(conditions.values.unwrap_or(defaults.conditions))
            .samples(args.samples.or(conditions.samples).unwrap_or(defaults.samples))
            .engine(settings)
            .selection(selection)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            sweep,
            engine_command,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) =
                parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
            let invalid = |e: parser::ParseError| CliError::Config(e.to_string());

            match key {
                "output.root" => {
                    self.output.get_or_insert_with(Default::default).root =
                        Some(PathBuf::from(value));
                }
                "output.run-prefix" => {
                    self.output.get_or_insert_with(Default::default).run_prefix =
                        Some(value.to_string());
                }
                "conditions.samples" => {
                    self.conditions.get_or_insert_with(Default::default).samples =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                "engine.verbose" => {
                    self.engine.get_or_insert_with(Default::default).verbose =
                        Some(parser::parse_value(key, value, "boolean").map_err(invalid)?);
                }
                "engine.parallel" => {
                    self.engine.get_or_insert_with(Default::default).parallel =
                        Some(parser::parse_value(key, value, "boolean").map_err(invalid)?);
                }
                "engine.threads" => {
                    self.engine.get_or_insert_with(Default::default).threads =
                        Some(parser::parse_value(key, value, "integer").map_err(invalid)?);
                }
                _ => {
                    let Some((table, field)) = key.split_once('.') else {
                        return Err(Self::unsupported_key(key));
                    };
                    let axis = match table {
                        "axis-a" => self.axis_a.get_or_insert_with(Default::default),
                        "axis-b" => self.axis_b.get_or_insert_with(Default::default),
                        _ => return Err(Self::unsupported_key(key)),
                    };
                    match field {
                        "start" => {
                            axis.start =
                                Some(parser::parse_value(key, value, "float").map_err(invalid)?)
                        }
                        "stop" => {
                            axis.stop =
                                Some(parser::parse_value(key, value, "float").map_err(invalid)?)
                        }
                        "count" => {
                            axis.count =
                                Some(parser::parse_value(key, value, "integer").map_err(invalid)?)
                        }
                        "include-zero" => {
                            axis.include_zero = Some(
                                parser::parse_value(key, value, "boolean").map_err(invalid)?,
                            )
                        }
                        _ => return Err(Self::unsupported_key(key)),
                    }
                }
            }
        }
        Ok(())
    }

    fn unsupported_key(key: &str) -> CliError {
        CliError::Config(format!(
            "Unsupported configuration key for --set: '{}'",
            key
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const FULL_CONFIG: &str = r#"
        [output]
        root = "sims"
        run-prefix = "T1p_5spin_run"

        [axis-a]
        start = -6
        stop = -2
        count = 81

        [axis-b]
        start = 0
        stop = 2
        count = 11
        include-zero = true

        [conditions]
        values = [2000.0, 7000.0, 12000.0, 14000.0, 22000.0]
        samples = 500

        [engine]
        command = ["python3", "simulate.py", "{a}", "{b}", "{condition}"]
        parallel = true
    "#;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("sweep.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn run_args(config_path: &Path, extra: &[&str]) -> RunArgs {
        let mut argv = vec!["relaxsweep", "run", "-c", config_path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    fn merge(content: &str, extra: &[&str]) -> Result<AppConfig> {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, content);
        let args = run_args(&path, extra);
        PartialSweepConfig::from_file(&path)?.merge_with_cli(&args)
    }

    #[test]
    fn full_file_is_translated_into_a_sweep_config() {
        let app = merge(FULL_CONFIG, &[]).unwrap();
        let sweep = &app.sweep;

        assert_eq!(sweep.output.root, PathBuf::from("sims"));
        assert_eq!(sweep.output.run_prefix, "T1p_5spin_run");
        assert_eq!(sweep.grid().unwrap().shape(), (81, 12));
        assert_eq!(sweep.conditions.len(), 5);
        assert_eq!(sweep.samples, 500);
        assert!(sweep.engine.parallel);
        assert!(!sweep.engine.verbose);
        assert_eq!(sweep.selection, core_config::PointSelection::All);
        assert_eq!(app.engine_command[0], "python3");
    }

    #[test]
    fn defaults_fill_optional_sections() {
        let app = merge(
            r#"
            [axis-a]
            values = [1e-6, 1e-5, 1e-4]
            [axis-b]
            values = [1.0, 10.0, 100.0]
            include-zero = true
            [engine]
            command = ["engine"]
            "#,
            &[],
        )
        .unwrap();
        let defaults = DefaultsConfig::default();

        assert_eq!(app.sweep.output.root, defaults.root);
        assert_eq!(app.sweep.output.run_prefix, defaults.run_prefix);
        assert_eq!(app.sweep.samples, 500);
        assert_eq!(app.sweep.conditions.len(), 5);
        assert_eq!(
            app.sweep.axis_b,
            core_config::AxisSpec::Values(vec![0.0, 1.0, 10.0, 100.0])
        );
        assert_eq!(app.sweep.engine, core_config::EngineSettings::default());
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let app = merge(
            FULL_CONFIG,
            &[
                "--root",
                "elsewhere",
                "-b",
                "4",
                "--samples",
                "100",
                "--engine-verbose",
                "-j",
                "8",
                "--engine-command",
                "./engine",
                "--fast",
            ],
        )
        .unwrap();

        assert_eq!(app.sweep.output.root, PathBuf::from("elsewhere"));
        assert_eq!(
            app.sweep.selection,
            core_config::PointSelection::AxisBIndex(4)
        );
        assert_eq!(app.sweep.samples, 100);
        assert!(app.sweep.engine.verbose);
        assert_eq!(app.sweep.engine.threads, Some(8));
        assert_eq!(app.engine_command, vec!["./engine", "--fast"]);
    }

    #[test]
    fn set_values_override_file_values() {
        let app = merge(
            FULL_CONFIG,
            &[
                "-S",
                "conditions.samples=250",
                "-S",
                "axis-a.count=31",
                "-S",
                "axis-a.stop=-3",
                "-S",
                "engine.parallel=false",
            ],
        )
        .unwrap();

        assert_eq!(app.sweep.samples, 250);
        assert_eq!(
            app.sweep.axis_a,
            core_config::AxisSpec::Log {
                start: -6.0,
                stop: -3.0,
                count: 31,
                include_zero: false,
            }
        );
        assert!(!app.sweep.engine.parallel);
    }

    #[test]
    fn unsupported_or_malformed_set_values_are_rejected() {
        for set in ["axis-c.start=1", "engine.threads=many", "conditions.samples"] {
            let result = merge(FULL_CONFIG, &["-S", set]);
            assert!(matches!(result, Err(CliError::Config(_))), "{set}");
        }
    }

    #[test]
    fn missing_axis_or_engine_is_a_config_error() {
        let result = merge("[axis-a]\nvalues = [1.0]\n[engine]\ncommand = [\"e\"]\n", &[]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("axis-b")));

        let result = merge("[axis-a]\nvalues = [1.0]\n[axis-b]\nvalues = [1.0]\n", &[]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("engine.command")));
    }

    #[test]
    fn axis_mixing_values_and_range_is_rejected() {
        let result = merge(
            "[axis-a]\nvalues = [1.0]\nstart = 0\n[axis-b]\nvalues = [1.0]\n[engine]\ncommand = [\"e\"]\n",
            &[],
        );
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("axis-a")));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let result = merge("[output]\nroot = \"x\"\nspeed = 3\n", &[]);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn output_resolution_prefers_arguments_over_file() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, FULL_CONFIG);

        let from_file = PartialSweepConfig::resolve_output(Some(&path), &OutputArgs::default())
            .unwrap();
        assert_eq!(from_file.root, PathBuf::from("sims"));
        assert_eq!(from_file.run_prefix, "T1p_5spin_run");

        let overridden = PartialSweepConfig::resolve_output(
            Some(&path),
            &OutputArgs {
                root: Some(PathBuf::from("other")),
                run_prefix: None,
            },
        )
        .unwrap();
        assert_eq!(overridden.root, PathBuf::from("other"));
        assert_eq!(overridden.run_prefix, "T1p_5spin_run");

        let bare = PartialSweepConfig::resolve_output(None, &OutputArgs::default()).unwrap();
        assert_eq!(bare.run_prefix, "run");
    }
}
