use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use crate::dates::{date_range, days_in_month, weekday_of};
use crate::models::TaskTargetSet;
use crate::pattern::DayPattern;

/// When a task occurs: a recurrence over a date range, or explicit dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSchedule {
    Recurring {
        start: NaiveDate,
        end: NaiveDate,
        patterns: Vec<DayPattern>,
    },
    SpecificDates(Vec<NaiveDate>),
}

impl TaskSchedule {
    /// Expands the schedule into its ordered occurrence dates.
    pub fn occurrence_dates(&self) -> Vec<NaiveDate> {
        match self {
            TaskSchedule::Recurring {
                start,
                end,
                patterns,
            } => occurrence_dates(*start, *end, patterns),
            TaskSchedule::SpecificDates(dates) => {
                let ordered: BTreeSet<NaiveDate> = dates.iter().copied().collect();
                ordered.into_iter().collect()
            }
        }
    }
}

/// Ordered calendar dates in `start..=end` matched by any of `patterns`.
///
/// One matcher call per pattern per day; the caller owns deriving the three
/// calendar integers the matcher consumes, which happens here.
pub fn occurrence_dates(start: NaiveDate, end: NaiveDate, patterns: &[DayPattern]) -> Vec<NaiveDate> {
    date_range(start, end)
        .filter(|date| {
            let day = date.day();
            let weekday = weekday_of(*date);
            let total_days = days_in_month(date.year(), date.month());
            patterns.iter().any(|p| p.check_day(day, weekday, total_days))
        })
        .collect()
}

/// The highest-priority target set whose pattern matches `date`.
///
/// `sets` must be sorted by ascending priority (lower number wins); the
/// repository returns them that way.
pub fn owning_target_set(sets: &[TaskTargetSet], date: NaiveDate) -> Option<&TaskTargetSet> {
    let day = date.day();
    let weekday = weekday_of(date);
    let total_days = days_in_month(date.year(), date.month());
    sets.iter()
        .find(|set| set.pattern.check_day(day, weekday, total_days))
}

/// Instance-date delta between what exists and what a revised schedule wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDelta {
    /// Materialized dates the new schedule no longer covers. Deleting these
    /// loses any recorded completion data, so callers surface this list for
    /// confirmation before applying the edit.
    pub to_delete: Vec<NaiveDate>,
    /// Dates the new schedule covers that have no instance yet.
    pub to_create: Vec<NaiveDate>,
}

impl ScheduleDelta {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty()
    }
}

/// Reconciles already-materialized instance dates against a revised schedule.
///
/// Pure set comparison over the expanded candidate dates; both result lists
/// come back sorted. Instances on retained dates are untouched by design —
/// the delta is minimal-loss.
pub fn reconcile_schedule(existing_dates: &[NaiveDate], schedule: &TaskSchedule) -> ScheduleDelta {
    let wanted: BTreeSet<NaiveDate> = schedule.occurrence_dates().into_iter().collect();
    let existing: BTreeSet<NaiveDate> = existing_dates.iter().copied().collect();

    ScheduleDelta {
        to_delete: existing.difference(&wanted).copied().collect(),
        to_create: wanted.difference(&existing).copied().collect(),
    }
}
