//! Travel profile storage (native only)
//!
//! Directory structure:
//! ~/.staytrack/
//!   profile.yaml     # trips and tracked goals
//!   staytrack.log    # written by the logging layer

use std::fs;
use std::path::{Path, PathBuf};

use jiff::civil::{Date, date};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use staytrack_core::TripRecord;

/// One tracked goal as stored on disk.
///
/// `config` stays untyped here; the engine narrows it when the profile is
/// evaluated so one bad goal does not make the whole file unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntry {
    pub name: String,
    /// Start of the counting period; defaults to the first recorded departure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    pub config: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub trips: Vec<TripRecord>,
    #[serde(default)]
    pub goals: Vec<GoalEntry>,
}

impl Profile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    /// Earliest departure among complete trips.
    pub fn first_departure(&self) -> Option<Date> {
        self.trips
            .iter()
            .filter_map(TripRecord::span)
            .map(|span| span.out_date)
            .min()
    }

    /// A small profile showing every goal type.
    pub fn sample() -> Self {
        Self {
            trips: vec![
                TripRecord::between("t1", date(2023, 4, 2), date(2023, 4, 16))
                    .with_routes("LHR-LIS", "LIS-LHR"),
                TripRecord::between("t2", date(2023, 12, 20), date(2024, 1, 4))
                    .with_routes("LGW-JFK", "JFK-LGW"),
                TripRecord::between("t3", date(2024, 7, 1), date(2024, 8, 10)),
            ],
            goals: vec![
                GoalEntry {
                    name: "Settlement".to_string(),
                    start_date: None,
                    config: json!({
                        "type": "continuous_residence",
                        "trackYears": 5,
                        "visaStartDate": "2022-03-01",
                    }),
                },
                GoalEntry {
                    name: "Citizenship".to_string(),
                    start_date: Some(date(2022, 3, 1)),
                    config: json!({
                        "type": "citizenship",
                        "route": "standard",
                        "lifeInUkTestPassed": false,
                        "englishRequirementMet": true,
                    }),
                },
                GoalEntry {
                    name: "Tax residence 2024/25".to_string(),
                    start_date: None,
                    config: json!({"type": "tax_year", "taxYear": 2024}),
                },
                GoalEntry {
                    name: "Schengen".to_string(),
                    start_date: Some(date(2024, 1, 1)),
                    config: json!({
                        "type": "threshold_window",
                        "thresholdDays": 90,
                        "windowDays": 180,
                        "countDirection": "days_away",
                    }),
                },
                GoalEntry {
                    name: "Days abroad".to_string(),
                    start_date: Some(date(2023, 1, 1)),
                    config: json!({
                        "type": "days_counter",
                        "countDirection": "days_away",
                        "referenceLocation": "UK",
                    }),
                },
            ],
        }
    }
}

/// Error types for profile storage
#[derive(Debug)]
pub enum ProfileError {
    Io(String),
    Parse(String),
    Serialize(String),
    /// Refused to overwrite an existing profile
    AlreadyExists(PathBuf),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Io(msg) => write!(f, "IO error: {msg}"),
            ProfileError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ProfileError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            ProfileError::AlreadyExists(path) => {
                write!(f, "{} already exists (use --force to replace it)", path.display())
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// Default data directory (~/.staytrack/).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".staytrack")
}

pub fn default_profile_path(data_dir: &Path) -> PathBuf {
    data_dir.join("profile.yaml")
}

pub fn load_profile(path: &Path) -> Result<Profile, ProfileError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ProfileError::Io(format!("Failed to read {}: {e}", path.display())))?;
    Profile::from_yaml(&content)
        .map_err(|e| ProfileError::Parse(format!("Failed to parse {}: {e}", path.display())))
}

/// Write the profile with write-then-rename so an interrupted save never
/// leaves a truncated file behind.
pub fn save_profile(path: &Path, profile: &Profile) -> Result<(), ProfileError> {
    let yaml = profile
        .to_yaml()
        .map_err(|e| ProfileError::Serialize(format!("Failed to serialize profile: {e}")))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ProfileError::Io(format!("Failed to create {}: {e}", parent.display())))?;
    }
    atomic_write(path, &yaml)
        .map_err(|e| ProfileError::Io(format!("Failed to write {}: {e}", path.display())))
}

fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}

/// Write the sample profile unless one already exists.
pub fn init_profile(path: &Path, force: bool) -> Result<Profile, ProfileError> {
    if path.exists() && !force {
        return Err(ProfileError::AlreadyExists(path.to_path_buf()));
    }
    let profile = Profile::sample();
    save_profile(path, &profile)?;
    Ok(profile)
}
