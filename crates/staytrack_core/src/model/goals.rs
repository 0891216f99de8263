//! Goal configuration: one closed, tagged variant per jurisdiction rule set.
//!
//! Stored goals arrive as untyped JSON from the goal-management layer.
//! [`GoalConfig::from_value`] narrows that input to exactly one variant or
//! explains why it cannot; the calculators only ever see the typed form.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::dates::parse_iso_date;
use crate::error::ConfigError;

/// Discriminant of [`GoalConfig`], matching its serialized `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    ContinuousResidence,
    Citizenship,
    TaxYear,
    ThresholdWindow,
    DaysCounter,
}

impl GoalKind {
    pub const ALL: [GoalKind; 5] = [
        GoalKind::ContinuousResidence,
        GoalKind::Citizenship,
        GoalKind::TaxYear,
        GoalKind::ThresholdWindow,
        GoalKind::DaysCounter,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            GoalKind::ContinuousResidence => "continuous_residence",
            GoalKind::Citizenship => "citizenship",
            GoalKind::TaxYear => "tax_year",
            GoalKind::ThresholdWindow => "threshold_window",
            GoalKind::DaysCounter => "days_counter",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Optional ISO date fields of this kind's configuration (wire names).
    pub fn date_fields(self) -> &'static [&'static str] {
        match self {
            GoalKind::ContinuousResidence => &["visaStartDate", "vignetteEntryDate"],
            GoalKind::Citizenship => &["residenceStartDate", "settledStatusDate"],
            GoalKind::TaxYear | GoalKind::ThresholdWindow | GoalKind::DaysCounter => &[],
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which way a counter accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountDirection {
    /// Full days spent away (trip days) are counted
    DaysAway,
    /// Days physically present are counted
    DaysPresent,
}

/// Length of a continuous-residence route in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TrackYears {
    Two,
    Three,
    Five,
    Ten,
}

impl TrackYears {
    pub fn years(self) -> i32 {
        match self {
            TrackYears::Two => 2,
            TrackYears::Three => 3,
            TrackYears::Five => 5,
            TrackYears::Ten => 10,
        }
    }

    /// Qualifying period length: `years × 365` elapsed days.
    pub fn qualifying_days(self) -> i32 {
        self.years() * 365
    }

    /// Maximum absence allowed in any rolling 12 months on this route.
    pub fn absence_limit(self) -> i64 {
        match self {
            TrackYears::Ten => 184,
            _ => 180,
        }
    }
}

impl TryFrom<u8> for TrackYears {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(TrackYears::Two),
            3 => Ok(TrackYears::Three),
            5 => Ok(TrackYears::Five),
            10 => Ok(TrackYears::Ten),
            other => Err(format!(
                "unsupported track length {other} (expected 2, 3, 5 or 10)"
            )),
        }
    }
}

impl From<TrackYears> for u8 {
    fn from(value: TrackYears) -> Self {
        value.years() as u8
    }
}

/// Settlement (indefinite leave) via a continuous-residence route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuousResidenceConfig {
    pub track_years: TrackYears,
    #[serde(default, deserialize_with = "optional_date")]
    pub visa_start_date: Option<Date>,
    /// First entry on the visa, when it differs from the grant date
    #[serde(default, deserialize_with = "optional_date")]
    pub vignette_entry_date: Option<Date>,
}

impl ContinuousResidenceConfig {
    pub fn new(track_years: TrackYears, visa_start_date: Date) -> Self {
        Self {
            track_years,
            visa_start_date: Some(visa_start_date),
            vignette_entry_date: None,
        }
    }

    pub fn with_vignette_entry(mut self, entry: Date) -> Self {
        self.vignette_entry_date = Some(entry);
        self
    }

    /// Date the qualifying period is counted from.
    pub fn qualifying_start(&self) -> Option<Date> {
        self.vignette_entry_date.or(self.visa_start_date)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.visa_start_date.is_none() {
            return Err(ConfigError::MissingField {
                kind: GoalKind::ContinuousResidence,
                field: "visaStartDate",
            });
        }
        Ok(())
    }
}

/// Naturalisation route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenshipRoute {
    /// Five years' residence, settled status held for a year
    Standard,
    /// Three years' residence as the spouse or civil partner of a citizen
    Spouse,
}

impl CitizenshipRoute {
    pub fn qualifying_days(self) -> i32 {
        match self {
            CitizenshipRoute::Standard => 5 * 365,
            CitizenshipRoute::Spouse => 3 * 365,
        }
    }

    /// Maximum total absence across the whole qualifying period.
    pub fn total_absence_limit(self) -> i64 {
        match self {
            CitizenshipRoute::Standard => 450,
            CitizenshipRoute::Spouse => 270,
        }
    }

    /// How long settled status must be held before applying.
    pub fn settled_wait_days(self) -> i32 {
        match self {
            CitizenshipRoute::Standard => 365,
            CitizenshipRoute::Spouse => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenshipConfig {
    pub route: CitizenshipRoute,
    /// Start of residence; the goal's start date is used when absent
    #[serde(default, deserialize_with = "optional_date")]
    pub residence_start_date: Option<Date>,
    /// Date settled status (indefinite leave) was granted
    #[serde(default, deserialize_with = "optional_date")]
    pub settled_status_date: Option<Date>,
    #[serde(default)]
    pub life_in_uk_test_passed: bool,
    #[serde(default)]
    pub english_requirement_met: bool,
}

impl CitizenshipConfig {
    pub fn new(route: CitizenshipRoute) -> Self {
        Self {
            route,
            residence_start_date: None,
            settled_status_date: None,
            life_in_uk_test_passed: false,
            english_requirement_met: false,
        }
    }
}

fn default_tax_threshold() -> u16 {
    183
}

fn default_year_start_month() -> i8 {
    4
}

fn default_year_start_day() -> i8 {
    6
}

/// Presence within a single tax year, e.g. the 183-day residence test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYearConfig {
    /// Calendar year in which the tax year begins
    pub tax_year: i16,
    #[serde(default = "default_tax_threshold")]
    pub threshold_days: u16,
    #[serde(default = "default_year_start_month")]
    pub year_start_month: i8,
    #[serde(default = "default_year_start_day")]
    pub year_start_day: i8,
}

impl TaxYearConfig {
    pub fn new(tax_year: i16) -> Self {
        Self {
            tax_year,
            threshold_days: default_tax_threshold(),
            year_start_month: default_year_start_month(),
            year_start_day: default_year_start_day(),
        }
    }

    /// First day of the tax year beginning in `year`.
    pub fn year_start(&self, year: i16) -> Option<Date> {
        Date::new(year, self.year_start_month, self.year_start_day).ok()
    }

    fn check(&self) -> Result<(), ConfigError> {
        if !(1..=366).contains(&self.threshold_days) {
            return Err(ConfigError::InvalidValue {
                kind: GoalKind::TaxYear,
                field: "thresholdDays",
                reason: format!("{} is outside 1..=366", self.threshold_days),
            });
        }
        let next_year = self.tax_year.checked_add(1);
        if self.year_start(self.tax_year).is_none()
            || next_year.and_then(|y| self.year_start(y)).is_none()
        {
            return Err(ConfigError::InvalidValue {
                kind: GoalKind::TaxYear,
                field: "yearStartDay",
                reason: format!(
                    "{:02}-{:02} is not a valid start date for tax year {}",
                    self.year_start_month, self.year_start_day, self.tax_year
                ),
            });
        }
        Ok(())
    }
}

/// At most `threshold_days` counted days in any trailing `window_days`
/// (Schengen-style 90/180).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdWindowConfig {
    pub threshold_days: u16,
    pub window_days: u16,
    pub count_direction: CountDirection,
}

impl ThresholdWindowConfig {
    pub fn new(threshold_days: u16, window_days: u16, count_direction: CountDirection) -> Self {
        Self {
            threshold_days,
            window_days,
            count_direction,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::InvalidValue {
                kind: GoalKind::ThresholdWindow,
                field: "windowDays",
                reason: "window must span at least one day".to_string(),
            });
        }
        if self.threshold_days == 0 || self.threshold_days > self.window_days {
            return Err(ConfigError::InvalidValue {
                kind: GoalKind::ThresholdWindow,
                field: "thresholdDays",
                reason: format!(
                    "{} must be between 1 and the window length {}",
                    self.threshold_days, self.window_days
                ),
            });
        }
        Ok(())
    }
}

/// Plain accounting of days away or present, with no compliance limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysCounterConfig {
    pub count_direction: CountDirection,
    /// Display label for the place being counted against
    #[serde(default)]
    pub reference_location: String,
}

impl DaysCounterConfig {
    pub fn new(count_direction: CountDirection, reference_location: impl Into<String>) -> Self {
        Self {
            count_direction,
            reference_location: reference_location.into(),
        }
    }
}

/// Configuration of one tracked goal. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalConfig {
    ContinuousResidence(ContinuousResidenceConfig),
    Citizenship(CitizenshipConfig),
    TaxYear(TaxYearConfig),
    ThresholdWindow(ThresholdWindowConfig),
    DaysCounter(DaysCounterConfig),
}

impl GoalConfig {
    pub fn kind(&self) -> GoalKind {
        match self {
            GoalConfig::ContinuousResidence(_) => GoalKind::ContinuousResidence,
            GoalConfig::Citizenship(_) => GoalKind::Citizenship,
            GoalConfig::TaxYear(_) => GoalKind::TaxYear,
            GoalConfig::ThresholdWindow(_) => GoalKind::ThresholdWindow,
            GoalConfig::DaysCounter(_) => GoalKind::DaysCounter,
        }
    }

    /// Narrow untyped input to a well-formed variant.
    ///
    /// Checks the `type` discriminant, field shapes, enumerated values and
    /// per-variant required fields. Never panics.
    pub fn from_value(raw: &serde_json::Value) -> Result<Self, ConfigError> {
        let object = raw.as_object().ok_or(ConfigError::NotAnObject)?;
        let tag = object
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ConfigError::MissingType)?;
        let kind =
            GoalKind::from_tag(tag).ok_or_else(|| ConfigError::UnknownType(tag.to_string()))?;

        for &field in kind.date_fields() {
            let valid = match object.get(field) {
                None | Some(serde_json::Value::Null) => true,
                Some(serde_json::Value::String(s)) => {
                    s.trim().is_empty() || parse_iso_date(s).is_some()
                }
                Some(_) => false,
            };
            if !valid {
                return Err(ConfigError::InvalidValue {
                    kind,
                    field,
                    reason: "expected an ISO date (YYYY-MM-DD)".to_string(),
                });
            }
        }

        let config: GoalConfig =
            serde_json::from_value(raw.clone()).map_err(|e| ConfigError::Malformed {
                kind,
                reason: e.to_string(),
            })?;
        config.check()?;
        Ok(config)
    }

    /// Per-variant checks serde cannot express.
    pub fn check(&self) -> Result<(), ConfigError> {
        match self {
            GoalConfig::ContinuousResidence(c) => c.check(),
            GoalConfig::Citizenship(_) => Ok(()),
            GoalConfig::TaxYear(c) => c.check(),
            GoalConfig::ThresholdWindow(c) => c.check(),
            GoalConfig::DaysCounter(_) => Ok(()),
        }
    }
}

/// Stored goals sometimes carry `""` for an unset date; blanks are absent,
/// anything else must parse.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_iso_date(text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date `{text}`"))),
    }
}
