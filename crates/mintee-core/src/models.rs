use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::pattern::DayPattern;
use crate::target::TargetBounds;

/// Longest recurring schedule accepted at definition time, in days. Keeps
/// full-range materialization bounded.
pub const MAX_SCHEDULE_DAYS: i64 = 3700;

/// How a task's occurrences are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskKind {
    /// Occurrences expand from day patterns over a start/end date range.
    Recurring = 1,
    /// Occurrences are explicitly chosen one-off dates.
    SpecificDates = 2,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task kind: {0}")]
pub struct ParseTaskKindError(String);

impl TryFrom<u8> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(TaskKind::Recurring),
            2 => Ok(TaskKind::SpecificDates),
            _ => Err(ParseTaskKindError(raw.to_string())),
        }
    }
}

impl From<TaskKind> for u8 {
    fn from(kind: TaskKind) -> u8 {
        kind as u8
    }
}

impl FromStr for TaskKind {
    type Err = ParseTaskKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recurring" => Ok(TaskKind::Recurring),
            "specific" | "specific-dates" | "dates" => Ok(TaskKind::SpecificDates),
            _ => Err(ParseTaskKindError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Recurring => write!(f, "recurring"),
            TaskKind::SpecificDates => write!(f, "specific-dates"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: TaskKind,
    /// First day of the recurrence range. None for specific-date tasks.
    pub start_date: Option<NaiveDate>,
    /// Last day of the recurrence range, inclusive. None for specific-date tasks.
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            name: "".to_string(),
            description: None,
            kind: TaskKind::Recurring,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// A recurrence rule plus its completion target, owned by a recurring task.
/// Lower `priority` wins when several sets match the same date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTargetSet {
    pub id: Uuid,
    pub task_id: Uuid,
    pub priority: u32,
    pub pattern: DayPattern,
    pub bounds: TargetBounds,
}

/// One materialized occurrence of a task on a specific date.
///
/// `completion` starts at 0 and is overwritten whenever the user records a
/// value; it is never re-validated against the owning set's bounds at write
/// time. Specific-date instances carry no owning set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: Uuid,
    pub task_id: Uuid,
    pub target_set_id: Option<Uuid>,
    pub date: NaiveDate,
    pub completion: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An instance joined with the bounds of its owning target set, ready for
/// status/fraction evaluation at render time.
#[derive(Debug, Clone)]
pub struct InstanceDetail {
    pub instance: TaskInstance,
    pub bounds: Option<TargetBounds>,
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

/// Data required to create a target set alongside a task or schedule edit.
/// `bounds` are expected to come from `TargetBounds::validated`.
#[derive(Debug, Clone)]
pub struct NewTargetSetData {
    pub priority: u32,
    pub pattern: DayPattern,
    pub bounds: TargetBounds,
}

/// Schedule portion of a new task.
#[derive(Debug, Clone)]
pub enum NewScheduleData {
    Recurring {
        start: NaiveDate,
        end: NaiveDate,
        target_sets: Vec<NewTargetSetData>,
    },
    SpecificDates { dates: Vec<NaiveDate> },
}

#[derive(Debug, Clone)]
pub struct NewTaskData {
    pub name: String,
    pub description: Option<String>,
    pub schedule: NewScheduleData,
}

/// Metadata-only task edits. Schedule edits go through
/// [`UpdateScheduleData`] so the delta preview cannot be bypassed.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// Pending schedule edit. `target_sets` and `dates` are full replacements
/// when present; absent fields keep their current values.
#[derive(Debug, Clone, Default)]
pub struct UpdateScheduleData {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub target_sets: Option<Vec<NewTargetSetData>>,
    pub dates: Option<Vec<NaiveDate>>,
}
