use anyhow::Result;
use mintee_core::repository::{Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

pub async fn delete_task(repo: &impl Repository, task_id: Uuid) -> Result<()> {
    repo.delete_task(task_id).await?;
    let success_style = Style::new().green().bold();
    println!("{} Task deleted.", "✓".style(success_style));
    Ok(())
}
