pub mod constants;
pub mod filename;
pub mod format;
pub mod progress;

pub use constants::*;
pub use filename::{archive_relative_path, grid_file_name, mkprism_file_name, obs_file_name};
pub use format::format_size;
pub use progress::ProgressReporter;
