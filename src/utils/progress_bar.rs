//! Progress bar indicator for commandline user interface.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

/// Convinent struct with methods that are useful to indicate extraction progress.
#[derive(Debug, Clone, Copy)]
pub struct CliProgress<T: Sized> {
    /// A start/initializing function which will be called once before the operation.
    pub start: fn(u64, String) -> Result<T>,
    /// A update function that will be called after each processed chunk.
    pub update: fn(&T, u64),
    /// A function that will be called once after the operation succeeded.
    pub stop: fn(&T, String),
}

impl CliProgress<ProgressBar> {
    /// Create a new progress bar for CLI to indicate operation progress.
    pub fn new() -> Self {
        fn start(total: u64, msg: String) -> Result<ProgressBar> {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{msg}\n{spinner:.green}] [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})"
                )?
                .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    write!(w, "{:.1}s", state.eta().as_secs_f64()).expect("unable to display progress bar")
                })
                .progress_chars("#>-")
            );
            pb.set_message(msg);
            Ok(pb)
        }
        fn update(pb: &ProgressBar, pos: u64) {
            pb.set_position(pos);
        }
        fn stop(pb: &ProgressBar, msg: String) {
            pb.finish_with_message(msg);
        }

        CliProgress {
            start,
            update,
            stop,
        }
    }
}

impl Default for CliProgress<ProgressBar> {
    fn default() -> Self {
        Self::new()
    }
}
