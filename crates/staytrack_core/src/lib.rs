//! Residency and visa-eligibility rule engine
//!
//! Given a traveller's trip history and a goal configuration, this crate
//! computes a [`GoalCalculation`]: status, progress, projected eligibility
//! date, metrics and warnings. Supported goals:
//! - Continuous residence towards settlement (2, 3, 5 or 10-year tracks,
//!   with the rolling 12-month absence test)
//! - Naturalisation (standard and spouse routes)
//! - Tax-year presence thresholds
//! - Threshold windows such as the Schengen 90/180 rule
//! - Plain day counters
//!
//! Everything here is a pure function of its inputs. There is no I/O, no
//! logging and no shared state.
//!
//! ```ignore
//! use jiff::civil::date;
//! use staytrack_core::{ContinuousResidenceConfig, GoalConfig, TrackYears, TripRecord, calculate};
//!
//! let trips = vec![TripRecord::between("t1", date(2024, 1, 5), date(2024, 1, 15))];
//! let goal = GoalConfig::ContinuousResidence(ContinuousResidenceConfig::new(
//!     TrackYears::Five,
//!     date(2022, 3, 1),
//! ));
//! let result = calculate(&trips, &goal, date(2022, 3, 1), date(2025, 6, 1));
//! println!("{}: {}%", result.status.label(), result.progress_percent);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod assembly;
pub mod calculators;
pub mod dates;
pub mod error;
pub mod intervals;
pub mod ledger;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use calculators::{
    GoalCalculator, GoalRequest, calculate, calculate_many, catalog, display_info, narrow_config,
    validate_config,
};
pub use error::ConfigError;
pub use intervals::{DateWindow, has_overlapping_trips, overlapping_pairs, with_calculations};
pub use model::*;
