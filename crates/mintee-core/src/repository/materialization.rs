use crate::error::CoreError;
use crate::models::{Task, TaskKind, TaskTargetSet, UpdateScheduleData, MAX_SCHEDULE_DAYS};
use crate::reconcile::{owning_target_set, reconcile_schedule, ScheduleDelta, TaskSchedule};
use crate::repository::{InstanceRow, SqliteRepository, TargetSetRow, TaskRow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::MaterializationRepository for SqliteRepository {
    /// Creates any instances the task's schedule calls for that do not exist
    /// yet. Idempotent: re-running against an unchanged schedule creates
    /// nothing.
    async fn refresh_task_instances(&self, task_id: Uuid) -> Result<usize, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task = Self::fetch_task_in_tx(&mut tx, task_id).await?;
        let sets = Self::fetch_target_sets_in_tx(&mut tx, task_id).await?;
        let existing = Self::fetch_instance_dates_in_tx(&mut tx, task_id).await?;

        let schedule = Self::current_schedule(&task, &sets, &existing)?;
        let delta = reconcile_schedule(&existing, &schedule);

        let mut created = 0;
        for date in &delta.to_create {
            let owner = match task.kind {
                TaskKind::Recurring => owning_target_set(&sets, *date).map(|s| s.id),
                TaskKind::SpecificDates => None,
            };
            Self::insert_instance_in_tx(&mut tx, task_id, owner, *date).await?;
            created += 1;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Computes the instance-date delta a pending schedule edit would cause,
    /// without touching storage. `to_delete` lists the dates whose recorded
    /// completions would be lost; callers show it before applying.
    async fn preview_schedule_change(
        &self,
        task_id: Uuid,
        data: &UpdateScheduleData,
    ) -> Result<ScheduleDelta, CoreError> {
        use super::{InstanceRepository, TaskRepository};

        let task = self
            .find_task_by_id(task_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", task_id)))?;
        let sets = self.find_target_sets(task_id).await?;
        let existing: Vec<NaiveDate> = self
            .find_instances_for_task(task_id)
            .await?
            .into_iter()
            .map(|instance| instance.date)
            .collect();

        let revised = Self::revised_schedule(&task, &sets, data, &existing)?;
        Ok(reconcile_schedule(&existing, &revised))
    }

    /// Applies a schedule edit: updates the task's range, replaces target
    /// sets when given, deletes orphaned instances, creates missing ones,
    /// and relinks retained instances to their new owning sets. Retained
    /// dates keep their completion values.
    async fn apply_schedule_change(
        &self,
        task_id: Uuid,
        data: UpdateScheduleData,
    ) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task = Self::fetch_task_in_tx(&mut tx, task_id).await?;
        let current_sets = Self::fetch_target_sets_in_tx(&mut tx, task_id).await?;
        let existing = Self::fetch_instance_dates_in_tx(&mut tx, task_id).await?;

        let revised = Self::revised_schedule(&task, &current_sets, &data, &existing)?;
        let delta = reconcile_schedule(&existing, &revised);

        // Update the task's range columns for recurring tasks.
        let (new_start, new_end) = match &revised {
            TaskSchedule::Recurring { start, end, .. } => (Some(*start), Some(*end)),
            TaskSchedule::SpecificDates(_) => (None, None),
        };
        sqlx::query(
            "UPDATE tasks SET start_date = $1, end_date = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(new_start)
        .bind(new_end)
        .bind(Utc::now())
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

        // Replace target sets when the edit provides a new collection.
        let active_sets: Vec<TaskTargetSet> = if let Some(new_sets) = data.target_sets {
            sqlx::query("DELETE FROM task_target_sets WHERE task_id = $1")
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
            Self::insert_target_sets_in_tx(&mut tx, task_id, new_sets).await?
        } else {
            current_sets
        };

        for date in &delta.to_delete {
            sqlx::query("DELETE FROM task_instances WHERE task_id = $1 AND date = $2")
                .bind(task_id)
                .bind(date)
                .execute(&mut *tx)
                .await?;
        }

        // Relink retained instances; their owning set may have changed.
        if task.kind == TaskKind::Recurring {
            let retained = Self::fetch_instance_dates_in_tx(&mut tx, task_id).await?;
            for date in retained {
                let owner = owning_target_set(&active_sets, date).map(|s| s.id);
                sqlx::query(
                    "UPDATE task_instances SET target_set_id = $1 WHERE task_id = $2 AND date = $3",
                )
                .bind(owner)
                .bind(task_id)
                .bind(date)
                .execute(&mut *tx)
                .await?;
            }
        }

        for date in &delta.to_create {
            let owner = match task.kind {
                TaskKind::Recurring => owning_target_set(&active_sets, *date).map(|s| s.id),
                TaskKind::SpecificDates => None,
            };
            Self::insert_instance_in_tx(&mut tx, task_id, owner, *date).await?;
        }

        let row: TaskRow = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Task::try_from(row)
    }
}

impl SqliteRepository {
    pub(crate) fn validate_schedule_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
        if start > end {
            return Err(CoreError::InvalidInput(
                "Schedule start date is after its end date".to_string(),
            ));
        }
        if (end - start).num_days() >= MAX_SCHEDULE_DAYS {
            return Err(CoreError::InvalidInput(format!(
                "Schedule spans more than {} days",
                MAX_SCHEDULE_DAYS
            )));
        }
        Ok(())
    }

    async fn fetch_task_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
    ) -> Result<Task, CoreError> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_optional(&mut **tx)
            .await?;
        row.map(Task::try_from)
            .transpose()?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", task_id)))
    }

    async fn fetch_target_sets_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
    ) -> Result<Vec<TaskTargetSet>, CoreError> {
        let rows: Vec<TargetSetRow> = sqlx::query_as(
            "SELECT * FROM task_target_sets WHERE task_id = $1 ORDER BY priority",
        )
        .bind(task_id)
        .fetch_all(&mut **tx)
        .await?;
        rows.into_iter().map(TaskTargetSet::try_from).collect()
    }

    async fn fetch_instance_dates_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        let rows: Vec<InstanceRow> = sqlx::query_as(
            "SELECT * FROM task_instances WHERE task_id = $1 ORDER BY date",
        )
        .bind(task_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(|row| row.date).collect())
    }

    /// The task's schedule as currently persisted.
    fn current_schedule(
        task: &Task,
        sets: &[TaskTargetSet],
        existing_dates: &[NaiveDate],
    ) -> Result<TaskSchedule, CoreError> {
        match task.kind {
            TaskKind::Recurring => {
                let start = task.start_date.ok_or_else(|| {
                    CoreError::CorruptRecord(format!("recurring task {} has no start date", task.id))
                })?;
                let end = task.end_date.ok_or_else(|| {
                    CoreError::CorruptRecord(format!("recurring task {} has no end date", task.id))
                })?;
                Ok(TaskSchedule::Recurring {
                    start,
                    end,
                    patterns: sets.iter().map(|set| set.pattern.clone()).collect(),
                })
            }
            TaskKind::SpecificDates => Ok(TaskSchedule::SpecificDates(existing_dates.to_vec())),
        }
    }

    /// The schedule a pending edit would produce, merged over current state.
    fn revised_schedule(
        task: &Task,
        current_sets: &[TaskTargetSet],
        data: &UpdateScheduleData,
        existing_dates: &[NaiveDate],
    ) -> Result<TaskSchedule, CoreError> {
        match task.kind {
            TaskKind::Recurring => {
                if data.dates.is_some() {
                    return Err(CoreError::InvalidInput(
                        "A recurring task takes patterns, not explicit dates".to_string(),
                    ));
                }
                let current = Self::current_schedule(task, current_sets, existing_dates)?;
                let (current_start, current_end) = match current {
                    TaskSchedule::Recurring { start, end, .. } => (start, end),
                    TaskSchedule::SpecificDates(_) => unreachable!("kind checked above"),
                };
                let start = data.start.unwrap_or(current_start);
                let end = data.end.unwrap_or(current_end);
                Self::validate_schedule_range(start, end)?;

                let patterns = match &data.target_sets {
                    Some(new_sets) => {
                        if new_sets.is_empty() {
                            return Err(CoreError::InvalidInput(
                                "A recurring task needs at least one target set".to_string(),
                            ));
                        }
                        new_sets.iter().map(|set| set.pattern.clone()).collect()
                    }
                    None => current_sets.iter().map(|set| set.pattern.clone()).collect(),
                };
                Ok(TaskSchedule::Recurring {
                    start,
                    end,
                    patterns,
                })
            }
            TaskKind::SpecificDates => {
                if data.start.is_some() || data.end.is_some() || data.target_sets.is_some() {
                    return Err(CoreError::InvalidInput(
                        "A specific-dates task takes explicit dates, not patterns".to_string(),
                    ));
                }
                let dates = match &data.dates {
                    Some(dates) if dates.is_empty() => {
                        return Err(CoreError::InvalidInput(
                            "A specific-dates task needs at least one date".to_string(),
                        ))
                    }
                    Some(dates) => dates.clone(),
                    None => existing_dates.to_vec(),
                };
                Ok(TaskSchedule::SpecificDates(dates))
            }
        }
    }
}
