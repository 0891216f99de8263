//! Plain-text rendering of goal reports and trip tables.

use std::fmt::Write;

use staytrack_core::{
    GoalCalculation, MetricStatus, MetricUnit, RequirementStatus, TripWithCalculations,
    WarningSeverity,
};

use crate::evaluate::GoalReport;

fn metric_marker(status: MetricStatus) -> &'static str {
    match status {
        MetricStatus::Ok => "",
        MetricStatus::Warning => "  [warning]",
        MetricStatus::Exceeded => "  [exceeded]",
    }
}

fn severity_marker(severity: WarningSeverity) -> &'static str {
    match severity {
        WarningSeverity::Info => "i",
        WarningSeverity::Warning => "!",
        WarningSeverity::Error => "x",
    }
}

fn requirement_marker(status: RequirementStatus) -> &'static str {
    match status {
        RequirementStatus::Met => "[x]",
        RequirementStatus::NotMet => "[ ]",
        RequirementStatus::Pending => "[?]",
    }
}

fn render_calculation(out: &mut String, calc: &GoalCalculation) -> std::fmt::Result {
    writeln!(
        out,
        "  Status:    {} ({}%)",
        calc.status.label(),
        calc.progress_percent
    )?;
    match (calc.eligibility_date, calc.days_until_eligible) {
        (Some(date), Some(0)) => writeln!(out, "  Eligible:  {date}")?,
        (Some(date), Some(days)) => writeln!(out, "  Eligible:  {date} (in {days} days)")?,
        (Some(date), None) => writeln!(out, "  Eligible:  {date}")?,
        (None, _) => {}
    }

    if !calc.metrics.is_empty() {
        let width = calc.metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
        writeln!(out, "  Metrics:")?;
        for m in &calc.metrics {
            let unit = match m.unit {
                MetricUnit::Days => "",
                MetricUnit::Percent => "%",
            };
            let value = match m.limit {
                Some(limit) => format!("{}{unit} / {limit}{unit}", m.value),
                None => format!("{}{unit}", m.value),
            };
            writeln!(
                out,
                "    {:<width$}  {value}{}",
                m.label,
                metric_marker(m.status)
            )?;
        }
    }

    if let Some(reqs) = &calc.requirements {
        writeln!(out, "  Requirements:")?;
        for r in reqs {
            writeln!(
                out,
                "    {} {}: {}",
                requirement_marker(r.status),
                r.label,
                r.detail
            )?;
        }
    }

    if !calc.warnings.is_empty() {
        writeln!(out, "  Warnings:")?;
        for w in &calc.warnings {
            writeln!(
                out,
                "    {} {}: {}",
                severity_marker(w.severity),
                w.title,
                w.message
            )?;
        }
    }
    Ok(())
}

fn render_goal(out: &mut String, report: &GoalReport) -> std::fmt::Result {
    match report.kind {
        Some(kind) => writeln!(out, "{} [{kind}]", report.name)?,
        None => writeln!(out, "{}", report.name)?,
    }
    if let Some(error) = &report.error {
        writeln!(out, "  Invalid configuration: {error}")?;
    }
    if let Some(calc) = &report.result {
        render_calculation(out, calc)?;
    }
    Ok(())
}

pub fn render_reports(reports: &[GoalReport]) -> String {
    let mut out = String::new();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail
        let _ = render_goal(&mut out, report);
    }
    out
}

pub fn render_trips(trips: &[TripWithCalculations]) -> String {
    let mut out = String::new();
    let id_width = trips
        .iter()
        .map(|t| t.trip.id.as_str().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let _ = writeln!(
        out,
        "{:<id_width$}  {:<10}  {:<10}  {:>8}  {:>9}",
        "ID", "OUT", "IN", "CALENDAR", "FULL DAYS"
    );
    for t in trips {
        let note = if t.is_incomplete { "  incomplete" } else { "" };
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<10}  {:<10}  {:>8}  {:>9}{note}",
            t.trip.id.as_str(),
            t.trip.out_date,
            t.trip.in_date,
            t.calendar_days,
            t.full_days,
        );
    }
    let total: i64 = trips.iter().map(|t| t.full_days as i64).sum();
    let _ = writeln!(out, "{} trips, {total} full days away", trips.len());
    out
}
