use anyhow::Result;
use mintee_core::repository::{Repository, TaskRepository};

use crate::views::table::display_tasks;

pub async fn list_tasks(repo: &impl Repository) -> Result<()> {
    let tasks = repo.find_tasks().await?;
    display_tasks(&tasks);
    Ok(())
}
