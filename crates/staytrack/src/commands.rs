//! Subcommand implementations. Output goes to the supplied writer.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use jiff::civil::Date;
use serde::Serialize;
use staytrack_core::{catalog, with_calculations};

use crate::evaluate::{check_profile, evaluate_profile};
use crate::profile::{init_profile, load_profile};
use crate::report::{render_reports, render_trips};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn today() -> Date {
    jiff::Zoned::now().date()
}

pub fn status(
    out: &mut impl Write,
    profile_path: &Path,
    as_of: Date,
    filter: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let profile = load_profile(profile_path)
        .wrap_err_with(|| format!("Could not load profile {}", profile_path.display()))?;
    let reports = evaluate_profile(&profile, as_of, filter);
    if reports.is_empty() {
        tracing::warn!(filter = ?filter, "no goals matched");
    }

    match format {
        OutputFormat::Json => write_json(out, &reports),
        OutputFormat::Text => {
            writeln!(out, "As of {as_of}\n")?;
            write!(out, "{}", render_reports(&reports))?;
            Ok(())
        }
    }
}

/// Returns whether the profile is free of issues.
pub fn check(out: &mut impl Write, profile_path: &Path, format: OutputFormat) -> Result<bool> {
    let profile = load_profile(profile_path)
        .wrap_err_with(|| format!("Could not load profile {}", profile_path.display()))?;
    let issues = check_profile(&profile);

    match format {
        OutputFormat::Json => write_json(out, &issues)?,
        OutputFormat::Text if issues.is_empty() => {
            writeln!(
                out,
                "{}: {} trips and {} goals, no issues",
                profile_path.display(),
                profile.trips.len(),
                profile.goals.len()
            )?;
        }
        OutputFormat::Text => {
            for issue in &issues {
                writeln!(out, "- {issue}")?;
            }
        }
    }
    Ok(issues.is_empty())
}

pub fn goals(out: &mut impl Write, format: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct Entry {
        #[serde(rename = "type")]
        kind: staytrack_core::GoalKind,
        #[serde(flatten)]
        info: staytrack_core::DisplayInfo,
    }

    let entries: Vec<Entry> = catalog()
        .into_iter()
        .map(|(kind, info)| Entry { kind, info })
        .collect();

    match format {
        OutputFormat::Json => write_json(out, &entries),
        OutputFormat::Text => {
            for e in &entries {
                writeln!(out, "{:<22} {}", e.kind.tag(), e.info.name)?;
                writeln!(out, "{:<22} {}", "", e.info.description)?;
            }
            Ok(())
        }
    }
}

pub fn trips(out: &mut impl Write, profile_path: &Path, format: OutputFormat) -> Result<()> {
    let profile = load_profile(profile_path)
        .wrap_err_with(|| format!("Could not load profile {}", profile_path.display()))?;
    let trips = with_calculations(&profile.trips);

    match format {
        OutputFormat::Json => write_json(out, &trips),
        OutputFormat::Text => {
            write!(out, "{}", render_trips(&trips))?;
            Ok(())
        }
    }
}

pub fn init(out: &mut impl Write, profile_path: &Path, force: bool) -> Result<()> {
    let profile = init_profile(profile_path, force).wrap_err("Could not create profile")?;
    tracing::info!(path = %profile_path.display(), "sample profile written");
    writeln!(
        out,
        "Wrote {} with {} trips and {} goals",
        profile_path.display(),
        profile.trips.len(),
        profile.goals.len()
    )?;
    Ok(())
}
