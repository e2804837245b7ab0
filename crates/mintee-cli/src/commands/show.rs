use anyhow::Result;
use chrono::NaiveDate;
use mintee_core::models::TaskKind;
use mintee_core::repository::{InstanceRepository, Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};

use crate::cli::ShowCommand;
use crate::util::resolve_task_id;
use crate::views::table::{display_instances, display_target_sets};

pub async fn show_task(repo: &impl Repository, command: ShowCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Task with ID '{}' not found", task_id))?;

    let info_style = Style::new().blue();

    println!("{}", task.name.bright_white().bold());
    if let Some(description) = &task.description {
        println!("{}", description);
    }
    println!(
        "{} {} task, ID {}",
        "→".style(info_style),
        task.kind,
        task.id.to_string().yellow()
    );
    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        println!("{} Runs {} through {}", "→".style(info_style), start, end);
    }

    if task.kind == TaskKind::Recurring {
        let sets = repo.find_target_sets(task_id).await?;
        println!();
        display_target_sets(&sets);
    }

    let instances = repo.find_instances_for_task(task_id).await?;
    if let (Some(first), Some(last)) = (instances.first(), instances.last()) {
        let start: NaiveDate = first.date;
        let end: NaiveDate = last.date;
        let details = repo.find_instance_details(task_id, start, end).await?;
        println!();
        display_instances(&details);
    } else {
        println!("\nNo occurrences materialized.");
    }

    Ok(())
}
