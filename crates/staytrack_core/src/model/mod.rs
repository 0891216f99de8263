mod goals;
mod ids;
mod results;
mod trips;

pub use goals::{
    CitizenshipConfig, CitizenshipRoute, ContinuousResidenceConfig, CountDirection,
    DaysCounterConfig, GoalConfig, GoalKind, TaxYearConfig, ThresholdWindowConfig, TrackYears,
};
pub use ids::TripId;
pub use results::{
    DisplayInfo, GoalCalculation, GoalCategory, GoalStatus, Metric, MetricStatus, MetricUnit,
    Requirement, RequirementStatus, Warning, WarningDetails, WarningSeverity, WindowTotal,
};
pub use trips::{TripRecord, TripSpan, TripWithCalculations};
