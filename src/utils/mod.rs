//! Utility functions/types to use across the whole crate.

mod extraction;
mod file_system;
mod log;
mod process;
mod progress_bar;

pub use extraction::Extractable;
pub use file_system::*;
pub use process::*;
// `self` is required to disambiguate from the `log` crate.
pub use self::log::{log_file_path, Logger};
