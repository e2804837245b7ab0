use crate::error::CoreError;
use crate::models::{
    NewScheduleData, NewTargetSetData, NewTaskData, Task, TaskKind, TaskTargetSet, UpdateTaskData,
};
use crate::reconcile::owning_target_set;
use crate::repository::{SqliteRepository, TargetSetRow, TaskRow};
use crate::target::TargetBounds;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use std::collections::BTreeSet;
use uuid::Uuid;

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("Task name cannot be empty".to_string()));
        }

        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        let task = match data.schedule {
            NewScheduleData::Recurring {
                start,
                end,
                target_sets,
            } => {
                Self::validate_schedule_range(start, end)?;
                if target_sets.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "A recurring task needs at least one target set".to_string(),
                    ));
                }

                let task = Task {
                    id: Uuid::now_v7(),
                    name: data.name,
                    description: data.description,
                    kind: TaskKind::Recurring,
                    start_date: Some(start),
                    end_date: Some(end),
                    created_at: now,
                    updated_at: now,
                };
                Self::insert_task_in_tx(&mut tx, &task).await?;

                let sets = Self::insert_target_sets_in_tx(&mut tx, task.id, target_sets).await?;
                Self::materialize_range_in_tx(&mut tx, task.id, start, end, &sets).await?;
                task
            }
            NewScheduleData::SpecificDates { dates } => {
                let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();
                if unique.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "A specific-dates task needs at least one date".to_string(),
                    ));
                }

                let task = Task {
                    id: Uuid::now_v7(),
                    name: data.name,
                    description: data.description,
                    kind: TaskKind::SpecificDates,
                    start_date: None,
                    end_date: None,
                    created_at: now,
                    updated_at: now,
                };
                Self::insert_task_in_tx(&mut tx, &task).await?;

                for date in unique {
                    Self::insert_instance_in_tx(&mut tx, task.id, None, date).await?;
                }
                task
            }
        };

        tx.commit().await?;
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        // Ids are stored as blobs; match on their hex expansion with dashes
        // stripped from the user's prefix.
        let mut pattern = short_id.replace('-', "").to_uppercase();
        pattern.push('%');

        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE hex(id) LIKE $1")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks ORDER BY created_at")
            .fetch_all(self.pool())
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let existing: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(CoreError::NotFound(format!("Task with id {} not found", id)));
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET ");
        let mut updated = false;

        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(CoreError::InvalidInput("Task name cannot be empty".to_string()));
            }
            qb.push("name = ");
            qb.push_bind(name);
            updated = true;
        }

        if let Some(description) = &data.description {
            if updated {
                qb.push(", ");
            }
            qb.push("description = ");
            qb.push_bind(description.clone());
            updated = true;
        }

        if updated {
            qb.push(", updated_at = ");
            qb.push_bind(Utc::now());
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }

        let row: TaskRow = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Task::try_from(row)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn find_target_sets(&self, task_id: Uuid) -> Result<Vec<TaskTargetSet>, CoreError> {
        let rows: Vec<TargetSetRow> = sqlx::query_as(
            "SELECT * FROM task_target_sets WHERE task_id = $1 ORDER BY priority",
        )
        .bind(task_id)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(TaskTargetSet::try_from).collect()
    }
}

impl SqliteRepository {
    pub(crate) async fn insert_task_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task: &Task,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO tasks (id, name, description, kind, start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(i64::from(u8::from(task.kind)))
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Validates, canonicalizes, and inserts a task's target sets. Returned
    /// sets are sorted by ascending priority, ready for owning-set lookups.
    pub(crate) async fn insert_target_sets_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
        mut target_sets: Vec<NewTargetSetData>,
    ) -> Result<Vec<TaskTargetSet>, CoreError> {
        target_sets.sort_by_key(|set| set.priority);
        let priorities: BTreeSet<u32> = target_sets.iter().map(|set| set.priority).collect();
        if priorities.len() != target_sets.len() {
            return Err(CoreError::InvalidInput(
                "Target set priorities must be unique".to_string(),
            ));
        }

        let mut inserted = Vec::with_capacity(target_sets.len());
        for set_data in target_sets {
            let bounds = TargetBounds::validated(
                set_data.bounds.min_op,
                set_data.bounds.max_op,
                set_data.bounds.min_target,
                set_data.bounds.max_target,
            )?;

            let set = TaskTargetSet {
                id: Uuid::now_v7(),
                task_id,
                priority: set_data.priority,
                pattern: set_data.pattern,
                bounds,
            };

            let pattern_json = serde_json::to_string(&set.pattern)
                .map_err(|e| CoreError::InvalidInput(format!("Unencodable pattern: {}", e)))?;

            sqlx::query(
                r#"INSERT INTO task_target_sets (id, task_id, priority, pattern_type, pattern, min_operator, max_operator, min_target, max_target)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            )
            .bind(set.id)
            .bind(set.task_id)
            .bind(i64::from(set.priority))
            .bind(i64::from(u8::from(set.pattern.pattern_type())))
            .bind(pattern_json)
            .bind(i64::from(u8::from(set.bounds.min_op)))
            .bind(i64::from(u8::from(set.bounds.max_op)))
            .bind(set.bounds.min_target)
            .bind(set.bounds.max_target)
            .execute(&mut **tx)
            .await?;

            inserted.push(set);
        }
        Ok(inserted)
    }

    pub(crate) async fn insert_instance_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
        target_set_id: Option<Uuid>,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO task_instances (id, task_id, target_set_id, date, completion, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6)"#,
        )
        .bind(Uuid::now_v7())
        .bind(task_id)
        .bind(target_set_id)
        .bind(date)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Materializes one instance per matching date in `start..=end`, linked
    /// to the highest-priority matching target set.
    pub(crate) async fn materialize_range_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        task_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        sets: &[TaskTargetSet],
    ) -> Result<usize, CoreError> {
        let mut created = 0;
        for date in crate::dates::date_range(start, end) {
            if let Some(owner) = owning_target_set(sets, date) {
                Self::insert_instance_in_tx(tx, task_id, Some(owner.id), date).await?;
                created += 1;
            }
        }
        Ok(created)
    }
}
