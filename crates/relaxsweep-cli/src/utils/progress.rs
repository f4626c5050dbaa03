use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use relaxsweep::engine::progress::{Progress, ProgressCallback, ProgressEstimate};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

type LineSink = Box<dyn Write + Send>;

/// Renders sweep progress events as an `indicatif` spinner/bar on stderr.
///
/// Every computed point also produces one estimate line. When the bar is not drawn (stderr is
/// not a terminal, e.g. under `nohup`), those lines go straight to the plain line sink.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    lines: Arc<Mutex<LineSink>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_output(ProgressDrawTarget::stderr(), Box::new(std::io::stderr()))
    }

    fn with_output(target: ProgressDrawTarget, lines: LineSink) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            lines: Arc::new(Mutex::new(lines)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        let lines = self.lines.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_steps } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style());
                    pb.set_message("");
                }
                Progress::TaskIncrement => pb.inc(1),
                Progress::TaskFinish => {
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::Estimate(estimate) => Self::print_estimate(&pb, &lines, &estimate),
                Progress::Message(msg) => {
                    if pb.is_finished() {
                        pb.set_message(msg);
                    } else {
                        pb.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    fn print_estimate(pb: &ProgressBar, lines: &Mutex<LineSink>, estimate: &ProgressEstimate) {
        if !pb.is_hidden() {
            pb.println(estimate.to_string());
            return;
        }
        let Ok(mut sink) = lines.lock() else {
            warn!("Progress line sink mutex was poisoned. Dropping estimate line.");
            return;
        };
        if let Err(e) = writeln!(sink, "{estimate}") {
            warn!("Failed to write progress line: {}", e);
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} (elapsed {elapsed_s}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "elapsed_s",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
