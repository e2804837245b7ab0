//! # Mintee Core Library
//!
//! Data model and engine for the Mintee habit tracker: tasks recur on
//! configurable day patterns (or one-off dates), every occurrence
//! materializes as an instance, and recorded completion values are judged
//! against dual-bound target ranges.
//!
//! ## Features
//!
//! - **Day-Pattern Recurrence**: weekday, week-of-month, and day-of-month
//!   rules with "last day/week of month" semantics
//! - **Target Evaluation**: canonicalized min/max operator pairs, progress
//!   fractions, and tri-state satisfactory/borderline/unsatisfactory status
//! - **Delta Reconciliation**: minimal-loss instance diffs when a schedule
//!   is edited, so recorded completions are only deleted after confirmation
//! - **SQLite Persistence**: repository pattern over sqlx with fail-fast
//!   decoding of enum-backed columns
//!
//! ## Core Modules
//!
//! - [`models`]: Core data structures and transfer objects
//! - [`pattern`]: Recurrence rules and the per-date matcher
//! - [`target`]: Target bounds validation and completion evaluation
//! - [`reconcile`]: Occurrence expansion and schedule-edit deltas
//! - [`analysis`]: Completion aggregation over date ranges
//! - [`repository`]: Data access layer with Repository pattern
//! - [`db`]: Database connection and migration management
//! - [`error`]: Error types with context
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mintee_core::{
//!     db,
//!     models::{NewScheduleData, NewTargetSetData, NewTaskData},
//!     pattern::{DayOfWeek, DayPattern},
//!     repository::{Repository, SqliteRepository, TaskRepository},
//!     target::{TargetBounds, TargetOperator},
//! };
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("mintee.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let task_data = NewTaskData {
//!         name: "Morning run".to_string(),
//!         description: None,
//!         schedule: NewScheduleData::Recurring {
//!             start: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
//!             end: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
//!             target_sets: vec![NewTargetSetData {
//!                 priority: 0,
//!                 pattern: DayPattern::weekly(
//!                     [DayOfWeek::Monday, DayOfWeek::Thursday].into_iter().collect(),
//!                 ),
//!                 bounds: TargetBounds::validated(
//!                     TargetOperator::LessThanOrEqual,
//!                     TargetOperator::NotApplicable,
//!                     5.0,
//!                     0.0,
//!                 )?,
//!             }],
//!         },
//!     };
//!
//!     let task = repo.add_task(task_data).await?;
//!     println!("Created task: {}", task.name);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;
pub mod pattern;
pub mod reconcile;
pub mod repository;
pub mod target;
