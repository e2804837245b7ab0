use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};
use mintee_core::pattern::{DayOfMonth, DayOfWeek, DayPattern, WeekOfMonth};
use mintee_core::target::{TargetBounds, TargetOperator};
use std::collections::BTreeSet;

use crate::cli::OperatorArg;

/// Parse a calendar date, accepting both explicit dates and phrases like
/// 'today' or 'next monday'.
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    parse_date_string(date_str, Local::now(), Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

/// Parse a comma-separated list of dates.
pub fn parse_date_list(dates_str: &str) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for part in dates_str.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        dates.push(parse_date(part)?);
    }
    if dates.is_empty() {
        return Err(anyhow::anyhow!("No dates specified in: '{}'", dates_str));
    }
    Ok(dates)
}

/// Parse days of week like "sun,tue" / "monday,thursday", or the groups
/// "weekdays", "weekends", and "daily".
pub fn parse_weekdays(days_str: &str) -> Result<BTreeSet<DayOfWeek>> {
    use DayOfWeek::*;
    let input = days_str.trim().to_lowercase();

    match input.as_str() {
        "weekdays" | "workdays" => {
            return Ok([Monday, Tuesday, Wednesday, Thursday, Friday]
                .into_iter()
                .collect());
        }
        "weekends" => return Ok([Saturday, Sunday].into_iter().collect()),
        "daily" | "everyday" => {
            return Ok([Sunday, Monday, Tuesday, Wednesday, Thursday, Friday, Saturday]
                .into_iter()
                .collect());
        }
        _ => {}
    }

    let mut days = BTreeSet::new();
    let mut invalid = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<DayOfWeek>() {
            Ok(day) => {
                days.insert(day);
            }
            Err(_) => invalid.push(part.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(anyhow::anyhow!(
            "Invalid day(s): {}\n\nSupported formats:\n  • Full names: 'monday,tuesday'\n  • Short names: 'mon,tue'\n  • Groups: 'weekdays', 'weekends', 'daily'",
            invalid.join(", ")
        ));
    }
    if days.is_empty() {
        return Err(anyhow::anyhow!("No valid days specified in: '{}'", days_str));
    }
    Ok(days)
}

/// Parse weeks of month like "first,third,last".
pub fn parse_weeks(weeks_str: &str) -> Result<BTreeSet<WeekOfMonth>> {
    let mut weeks = BTreeSet::new();
    let mut invalid = Vec::new();
    for part in weeks_str.trim().to_lowercase().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<WeekOfMonth>() {
            Ok(week) => {
                weeks.insert(week);
            }
            Err(_) => invalid.push(part.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(anyhow::anyhow!(
            "Invalid week(s): {}\n\nSupported: first, second, third, fourth, last",
            invalid.join(", ")
        ));
    }
    if weeks.is_empty() {
        return Err(anyhow::anyhow!("No valid weeks specified in: '{}'", weeks_str));
    }
    Ok(weeks)
}

/// Parse days of month like "1,15,last".
pub fn parse_month_days(days_str: &str) -> Result<BTreeSet<DayOfMonth>> {
    let mut days = BTreeSet::new();
    let mut invalid = Vec::new();
    for part in days_str.trim().to_lowercase().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<DayOfMonth>() {
            Ok(day) => {
                days.insert(day);
            }
            Err(_) => invalid.push(part.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(anyhow::anyhow!(
            "Invalid day(s) of month: {}\n\nSupported: 1-31 and 'last'",
            invalid.join(", ")
        ));
    }
    if days.is_empty() {
        return Err(anyhow::anyhow!("No valid days specified in: '{}'", days_str));
    }
    Ok(days)
}

/// Assemble a day pattern from the schedule flags.
pub fn build_pattern(
    on: Option<&str>,
    weeks: Option<&str>,
    month_days: Option<&str>,
) -> Result<DayPattern> {
    match (month_days, weeks, on) {
        (Some(month_days), None, None) => Ok(DayPattern::monthly_by_day(parse_month_days(month_days)?)),
        (None, Some(weeks), Some(on)) => Ok(DayPattern::monthly_by_week(
            parse_weekdays(on)?,
            parse_weeks(weeks)?,
        )),
        (None, Some(_), None) => Err(anyhow::anyhow!("--weeks requires --on to pick the weekday")),
        (None, None, Some(on)) => Ok(DayPattern::weekly(parse_weekdays(on)?)),
        (None, None, None) => Err(anyhow::anyhow!(
            "Specify a pattern: --on, --on with --weeks, or --month-days"
        )),
        (Some(_), _, _) => Err(anyhow::anyhow!(
            "--month-days cannot be combined with --on or --weeks"
        )),
    }
}

/// Assemble and canonicalize target bounds from the target flags. A bare
/// value defaults its operator to lte; an operator without a value is an
/// error.
pub fn build_bounds(
    min: Option<f32>,
    min_op: Option<OperatorArg>,
    max: Option<f32>,
    max_op: Option<OperatorArg>,
) -> Result<TargetBounds> {
    let min_operator = match (min, min_op) {
        (Some(_), Some(op)) => TargetOperator::from(op),
        (Some(_), None) => TargetOperator::LessThanOrEqual,
        (None, Some(_)) => return Err(anyhow::anyhow!("--min-op requires --min")),
        (None, None) => TargetOperator::NotApplicable,
    };
    let max_operator = match (max, max_op) {
        (Some(_), Some(op)) => TargetOperator::from(op),
        (Some(_), None) => TargetOperator::LessThanOrEqual,
        (None, Some(_)) => return Err(anyhow::anyhow!("--max-op requires --max")),
        (None, None) => TargetOperator::NotApplicable,
    };

    let bounds = TargetBounds::validated(
        min_operator,
        max_operator,
        min.unwrap_or(0.0),
        max.unwrap_or(0.0),
    )?;
    Ok(bounds)
}
