use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    InstanceDetail, NewTaskData, Task, TaskInstance, TaskKind, TaskTargetSet, UpdateScheduleData,
    UpdateTaskData,
};
use crate::pattern::{DayPattern, PatternType};
use crate::reconcile::ScheduleDelta;
use crate::target::{TargetBounds, TargetOperator};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export domain modules
pub mod instances;
pub mod materialization;
pub mod tasks;

// Traits are defined in this module and implemented in respective domain modules

/// Domain-specific trait for task and target-set operations
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks(&self) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
    async fn find_target_sets(&self, task_id: Uuid) -> Result<Vec<TaskTargetSet>, CoreError>;
}

/// Domain-specific trait for instance operations
#[async_trait]
pub trait InstanceRepository {
    async fn find_instances_for_task(&self, task_id: Uuid) -> Result<Vec<TaskInstance>, CoreError>;
    async fn find_instance_details(
        &self,
        task_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InstanceDetail>, CoreError>;
    async fn record_completion(
        &self,
        task_id: Uuid,
        date: NaiveDate,
        completion: f32,
    ) -> Result<TaskInstance, CoreError>;
}

/// Domain-specific trait for occurrence materialization and schedule edits
#[async_trait]
pub trait MaterializationRepository {
    async fn refresh_task_instances(&self, task_id: Uuid) -> Result<usize, CoreError>;
    async fn preview_schedule_change(
        &self,
        task_id: Uuid,
        data: &UpdateScheduleData,
    ) -> Result<ScheduleDelta, CoreError>;
    async fn apply_schedule_change(
        &self,
        task_id: Uuid,
        data: UpdateScheduleData,
    ) -> Result<Task, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository: TaskRepository + InstanceRepository + MaterializationRepository {
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}

// ============================================================================
// Row types — raw column values, converted with validation into rich models.
// Unknown discriminants and pattern/type drift are reported as corrupt
// records instead of being silently defaulted.
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TaskRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = CoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let kind = decode_discriminant::<TaskKind>(row.kind, "task kind")?;
        Ok(Task {
            id: row.id,
            name: row.name,
            description: row.description,
            kind,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TargetSetRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub priority: i64,
    pub pattern_type: i64,
    pub pattern: String,
    pub min_operator: i64,
    pub max_operator: i64,
    pub min_target: f32,
    pub max_target: f32,
}

impl TryFrom<TargetSetRow> for TaskTargetSet {
    type Error = CoreError;

    fn try_from(row: TargetSetRow) -> Result<Self, Self::Error> {
        let pattern: DayPattern = serde_json::from_str(&row.pattern).map_err(|e| {
            CoreError::CorruptRecord(format!("target set {}: bad pattern: {}", row.id, e))
        })?;

        // The stored type must agree with the populated sets.
        let stored_type = decode_discriminant::<PatternType>(row.pattern_type, "pattern type")?;
        if stored_type != pattern.pattern_type() {
            return Err(CoreError::CorruptRecord(format!(
                "target set {}: stored pattern type {} disagrees with pattern ({})",
                row.id,
                stored_type,
                pattern.pattern_type()
            )));
        }

        let min_op = decode_discriminant::<TargetOperator>(row.min_operator, "target operator")?;
        let max_op = decode_discriminant::<TargetOperator>(row.max_operator, "target operator")?;

        Ok(TaskTargetSet {
            id: row.id,
            task_id: row.task_id,
            priority: u32::try_from(row.priority).map_err(|_| {
                CoreError::CorruptRecord(format!("target set {}: negative priority", row.id))
            })?,
            pattern,
            bounds: TargetBounds {
                min_op,
                max_op,
                min_target: row.min_target,
                max_target: row.max_target,
            },
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InstanceRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub target_set_id: Option<Uuid>,
    pub date: NaiveDate,
    pub completion: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InstanceRow> for TaskInstance {
    fn from(row: InstanceRow) -> Self {
        TaskInstance {
            id: row.id,
            task_id: row.task_id,
            target_set_id: row.target_set_id,
            date: row.date,
            completion: row.completion,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn decode_discriminant<T: TryFrom<u8>>(raw: i64, what: &str) -> Result<T, CoreError> {
    u8::try_from(raw)
        .ok()
        .and_then(|byte| T::try_from(byte).ok())
        .ok_or_else(|| CoreError::CorruptRecord(format!("unknown {} discriminant: {}", what, raw)))
}
