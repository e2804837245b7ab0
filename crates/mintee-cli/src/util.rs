use anyhow::{anyhow, Result};
use mintee_core::error::CoreError;
use mintee_core::repository::{Repository, TaskRepository};
use uuid::Uuid;

/// Resolves a task reference: an ID prefix first, then a case-insensitive
/// name prefix.
pub async fn resolve_task_id(repo: &impl Repository, reference: &str) -> Result<Uuid> {
    if reference.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Task reference must be at least 2 characters long.".to_string()
        )));
    }

    let mut tasks = repo.find_tasks_by_short_id_prefix(reference).await?;
    if tasks.is_empty() {
        let reference_lower = reference.to_lowercase();
        tasks = repo
            .find_tasks()
            .await?
            .into_iter()
            .filter(|t| t.name.to_lowercase().starts_with(&reference_lower))
            .collect();
    }

    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found matching '{}'",
            reference
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.name))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}
