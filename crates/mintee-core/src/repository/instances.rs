use crate::error::CoreError;
use crate::models::{InstanceDetail, TaskInstance};
use crate::repository::{InstanceRow, SqliteRepository};
use crate::target::TargetBounds;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Instance columns joined with the owning set's operator/value columns.
#[derive(Debug, FromRow)]
struct InstanceDetailRow {
    id: Uuid,
    task_id: Uuid,
    target_set_id: Option<Uuid>,
    date: NaiveDate,
    completion: f32,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    min_operator: Option<i64>,
    max_operator: Option<i64>,
    min_target: Option<f32>,
    max_target: Option<f32>,
}

impl TryFrom<InstanceDetailRow> for InstanceDetail {
    type Error = CoreError;

    fn try_from(row: InstanceDetailRow) -> Result<Self, Self::Error> {
        let bounds = match (row.min_operator, row.max_operator, row.min_target, row.max_target) {
            (Some(min_op), Some(max_op), Some(min_target), Some(max_target)) => {
                Some(TargetBounds {
                    min_op: super::decode_discriminant(min_op, "target operator")?,
                    max_op: super::decode_discriminant(max_op, "target operator")?,
                    min_target,
                    max_target,
                })
            }
            _ => None,
        };

        Ok(InstanceDetail {
            instance: TaskInstance {
                id: row.id,
                task_id: row.task_id,
                target_set_id: row.target_set_id,
                date: row.date,
                completion: row.completion,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            bounds,
        })
    }
}

#[async_trait]
impl super::InstanceRepository for SqliteRepository {
    async fn find_instances_for_task(&self, task_id: Uuid) -> Result<Vec<TaskInstance>, CoreError> {
        let rows: Vec<InstanceRow> = sqlx::query_as(
            "SELECT * FROM task_instances WHERE task_id = $1 ORDER BY date",
        )
        .bind(task_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(TaskInstance::from).collect())
    }

    async fn find_instance_details(
        &self,
        task_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InstanceDetail>, CoreError> {
        let rows: Vec<InstanceDetailRow> = sqlx::query_as(
            r#"SELECT
                i.id, i.task_id, i.target_set_id, i.date, i.completion, i.created_at, i.updated_at,
                s.min_operator, s.max_operator, s.min_target, s.max_target
            FROM task_instances i
            LEFT JOIN task_target_sets s ON i.target_set_id = s.id
            WHERE i.task_id = $1 AND i.date BETWEEN $2 AND $3
            ORDER BY i.date"#,
        )
        .bind(task_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(InstanceDetail::try_from).collect()
    }

    async fn record_completion(
        &self,
        task_id: Uuid,
        date: NaiveDate,
        completion: f32,
    ) -> Result<TaskInstance, CoreError> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "UPDATE task_instances SET completion = $1, updated_at = $2 WHERE task_id = $3 AND date = $4",
        )
        .bind(completion)
        .bind(Utc::now())
        .bind(task_id)
        .bind(date)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let task_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = $1")
                .bind(task_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match task_exists {
                Some(_) => CoreError::NotFound(format!(
                    "Task has no occurrence on {}",
                    date
                )),
                None => CoreError::NotFound(format!("Task with id {} not found", task_id)),
            });
        }

        let row: InstanceRow = sqlx::query_as(
            "SELECT * FROM task_instances WHERE task_id = $1 AND date = $2",
        )
        .bind(task_id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TaskInstance::from(row))
    }
}
