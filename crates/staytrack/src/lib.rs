//! Command-line front end for the staytrack rule engine
//!
//! Reads a YAML travel profile (trips plus tracked goals), evaluates every
//! goal with `staytrack_core` and prints the results as text or JSON.

pub mod commands;
pub mod evaluate;
pub mod logging;
pub mod profile;
pub mod report;

pub use commands::OutputFormat;
pub use logging::init_logging;
pub use profile::{Profile, default_data_dir, default_profile_path};
