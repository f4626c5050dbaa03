use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "relaxsweep - Resumable parameter sweeps of NMR spin-relaxation simulations over a correlation-time x relaxation-rate grid.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run (or resume) a sweep, simulating every grid point that is not yet persisted.
    Run(RunArgs),
    /// Show the completion state of every run directory.
    Status(StatusArgs),
    /// Export every persisted record as CSV for fitting against experimental decays.
    Collect(CollectArgs),
}

/// Where run directories live. Values given here override the config file's `[output]` table.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory holding the numbered run directories.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Name prefix of the numbered run directories (e.g. 'T1p_5spin_run').
    #[arg(long, value_name = "PREFIX")]
    pub run_prefix: Option<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the sweep configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Only sweep the axis-B value at this index, so independent processes can share a sweep.
    #[arg(short = 'b', long, value_name = "INDEX")]
    pub b_index: Option<usize>,

    /// Override the number of time samples per simulated decay.
    #[arg(long, value_name = "INT")]
    pub samples: Option<usize>,

    /// Override the engine command (program followed by its arguments).
    #[arg(long, value_name = "ARG", num_args(1..), allow_hyphen_values = true)]
    pub engine_command: Option<Vec<String>>,

    /// Ask the simulation engine for verbose output.
    #[arg(long)]
    pub engine_verbose: bool,

    /// Allow the simulation engine to parallelize internally.
    #[arg(long)]
    pub engine_parallel: bool,

    /// Number of threads the simulation engine may use.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S conditions.samples=250
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Read the output location from this sweep configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Read the output location from this sweep configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Path of the CSV file to write.
    #[arg(short = 'o', long = "out", required = true, value_name = "PATH")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_arguments_parse() {
        let cli = Cli::parse_from([
            "relaxsweep",
            "-vv",
            "run",
            "-c",
            "sweep.toml",
            "-b",
            "3",
            "--engine-parallel",
            "-S",
            "conditions.samples=250",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("sweep.toml"));
                assert_eq!(args.b_index, Some(3));
                assert!(args.engine_parallel);
                assert!(!args.engine_verbose);
                assert_eq!(args.set_values, vec!["conditions.samples=250"]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["relaxsweep", "-q", "-v", "status"]).is_err());
    }

    #[test]
    fn collect_requires_an_output_path() {
        assert!(Cli::try_parse_from(["relaxsweep", "collect", "--root", "sweeps"]).is_err());
        let cli = Cli::parse_from([
            "relaxsweep",
            "collect",
            "--root",
            "sweeps",
            "--run-prefix",
            "T1p_5spin_run",
            "-o",
            "sims.csv",
        ]);
        match cli.command {
            Commands::Collect(args) => {
                assert_eq!(args.output.root, Some(PathBuf::from("sweeps")));
                assert_eq!(args.output.run_prefix.as_deref(), Some("T1p_5spin_run"));
                assert_eq!(args.out, PathBuf::from("sims.csv"));
            }
            other => panic!("expected collect, got {other:?}"),
        }
    }
}
