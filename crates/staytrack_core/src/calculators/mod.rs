//! Goal calculators and the dispatch façade.
//!
//! Each goal kind has one stateless calculator. [`calculate`] selects it with
//! an exhaustive match on [`GoalConfig`], so a new kind does not compile until
//! it is wired in here.

pub mod citizenship;
pub mod continuous_residence;
pub mod days_counter;
pub mod tax_year;
pub mod threshold_window;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::model::{DisplayInfo, GoalCalculation, GoalConfig, GoalKind, TripRecord};

pub use citizenship::CitizenshipCalculator;
pub use continuous_residence::ContinuousResidenceCalculator;
pub use days_counter::DaysCounterCalculator;
pub use tax_year::TaxYearCalculator;
pub use threshold_window::ThresholdWindowCalculator;

/// One rule set evaluated against a trip history.
///
/// Implementations hold no state; a single instance serves any number of
/// concurrent calls.
pub trait GoalCalculator: Send + Sync {
    type Config;
    const KIND: GoalKind;

    /// Evaluate the goal. Never fails: bad or partial input shows up as
    /// warnings and status.
    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        start_date: Date,
        as_of: Date,
    ) -> GoalCalculation;

    fn display_info(&self) -> DisplayInfo;

    /// This calculator's variant, if `config` is one.
    fn extract(config: GoalConfig) -> Option<Self::Config>;

    /// Narrow untyped input to this calculator's configuration.
    fn narrow(&self, raw: &Value) -> Result<Self::Config, ConfigError> {
        let config = GoalConfig::from_value(raw)?;
        let found = config.kind();
        Self::extract(config).ok_or(ConfigError::KindMismatch {
            expected: Self::KIND,
            found,
        })
    }

    fn validate_config(&self, raw: &Value) -> bool {
        self.narrow(raw).is_ok()
    }
}

/// Evaluate one goal.
pub fn calculate(
    trips: &[TripRecord],
    config: &GoalConfig,
    start_date: Date,
    as_of: Date,
) -> GoalCalculation {
    match config {
        GoalConfig::ContinuousResidence(c) => {
            ContinuousResidenceCalculator.calculate(trips, c, start_date, as_of)
        }
        GoalConfig::Citizenship(c) => CitizenshipCalculator.calculate(trips, c, start_date, as_of),
        GoalConfig::TaxYear(c) => TaxYearCalculator.calculate(trips, c, start_date, as_of),
        GoalConfig::ThresholdWindow(c) => {
            ThresholdWindowCalculator.calculate(trips, c, start_date, as_of)
        }
        GoalConfig::DaysCounter(c) => DaysCounterCalculator.calculate(trips, c, start_date, as_of),
    }
}

/// Narrow untyped input to any known goal configuration.
pub fn narrow_config(raw: &Value) -> Result<GoalConfig, ConfigError> {
    GoalConfig::from_value(raw)
}

/// Structural type guard for stored goal configurations. Never panics.
pub fn validate_config(raw: &Value) -> bool {
    narrow_config(raw).is_ok()
}

pub fn display_info(kind: GoalKind) -> DisplayInfo {
    match kind {
        GoalKind::ContinuousResidence => ContinuousResidenceCalculator.display_info(),
        GoalKind::Citizenship => CitizenshipCalculator.display_info(),
        GoalKind::TaxYear => TaxYearCalculator.display_info(),
        GoalKind::ThresholdWindow => ThresholdWindowCalculator.display_info(),
        GoalKind::DaysCounter => DaysCounterCalculator.display_info(),
    }
}

/// Display metadata for every goal kind, in declaration order.
pub fn catalog() -> Vec<(GoalKind, DisplayInfo)> {
    GoalKind::ALL
        .into_iter()
        .map(|kind| (kind, display_info(kind)))
        .collect()
}

/// A goal to evaluate in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub config: GoalConfig,
    pub start_date: Date,
    pub as_of: Date,
}

impl GoalRequest {
    pub fn new(config: GoalConfig, start_date: Date, as_of: Date) -> Self {
        Self {
            config,
            start_date,
            as_of,
        }
    }
}

/// Evaluate several goals against the same trips. Results keep input order.
pub fn calculate_many(trips: &[TripRecord], requests: &[GoalRequest]) -> Vec<GoalCalculation> {
    #[cfg(feature = "parallel")]
    let results = requests
        .par_iter()
        .map(|r| calculate(trips, &r.config, r.start_date, r.as_of))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = requests
        .iter()
        .map(|r| calculate(trips, &r.config, r.start_date, r.as_of))
        .collect();

    results
}
