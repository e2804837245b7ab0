use anyhow::Result;
use dialoguer::Confirm;
use mintee_core::models::{NewTargetSetData, TaskKind, TaskTargetSet, UpdateScheduleData};
use mintee_core::repository::{MaterializationRepository, Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

use crate::cli::{TargetAddCommand, TargetCommand, TargetRemoveCommand, TargetSubcommand};
use crate::parser::{build_bounds, build_pattern};
use crate::util::resolve_task_id;
use crate::views::table::{display_orphan_dates, display_target_sets};

pub async fn target_command(repo: &impl Repository, command: TargetCommand) -> Result<()> {
    match command.command {
        TargetSubcommand::Add(cmd) => add_target_set(repo, cmd).await,
        TargetSubcommand::List(cmd) => {
            let task_id = resolve_task_id(repo, &cmd.id).await?;
            let sets = repo.find_target_sets(task_id).await?;
            display_target_sets(&sets);
            Ok(())
        }
        TargetSubcommand::Remove(cmd) => remove_target_set(repo, cmd).await,
    }
}

async fn add_target_set(repo: &impl Repository, command: TargetAddCommand) -> Result<()> {
    let task_id = resolve_recurring_task(repo, &command.id).await?;

    let pattern = build_pattern(
        command.on.as_deref(),
        command.weeks.as_deref(),
        command.month_days.as_deref(),
    )?;
    let bounds = build_bounds(command.min, command.min_op, command.max, command.max_op)?;

    let mut target_sets = as_new_data(repo.find_target_sets(task_id).await?);
    target_sets.push(NewTargetSetData {
        priority: command.priority,
        pattern,
        bounds,
    });

    apply_target_replacement(repo, task_id, target_sets, command.force).await?;
    Ok(())
}

async fn remove_target_set(repo: &impl Repository, command: TargetRemoveCommand) -> Result<()> {
    let task_id = resolve_recurring_task(repo, &command.id).await?;

    let current = repo.find_target_sets(task_id).await?;
    let before = current.len();
    let target_sets: Vec<NewTargetSetData> = as_new_data(current)
        .into_iter()
        .filter(|set| set.priority != command.priority)
        .collect();

    if target_sets.len() == before {
        return Err(anyhow::anyhow!(
            "No target set with priority {} on this task",
            command.priority
        ));
    }

    apply_target_replacement(repo, task_id, target_sets, command.force).await?;
    Ok(())
}

async fn resolve_recurring_task(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    let task_id = resolve_task_id(repo, short_id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Task with ID '{}' not found", task_id))?;
    if task.kind != TaskKind::Recurring {
        return Err(anyhow::anyhow!("Target sets apply to recurring tasks only"));
    }
    Ok(task_id)
}

fn as_new_data(sets: Vec<TaskTargetSet>) -> Vec<NewTargetSetData> {
    sets.into_iter()
        .map(|set| NewTargetSetData {
            priority: set.priority,
            pattern: set.pattern,
            bounds: set.bounds,
        })
        .collect()
}

async fn apply_target_replacement(
    repo: &impl Repository,
    task_id: Uuid,
    target_sets: Vec<NewTargetSetData>,
    force: bool,
) -> Result<()> {
    let data = UpdateScheduleData {
        target_sets: Some(target_sets),
        ..Default::default()
    };

    let delta = repo.preview_schedule_change(task_id, &data).await?;

    if !delta.to_delete.is_empty() && !force {
        display_orphan_dates(&delta.to_delete);
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "{} occurrence(s) and their recorded completions will be deleted. Continue?",
                delta.to_delete.len()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Edit cancelled.");
            return Ok(());
        }
    }

    repo.apply_schedule_change(task_id, data).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Target sets updated: {} occurrence(s) removed, {} created.",
        "✓".style(success_style),
        delta.to_delete.len(),
        delta.to_create.len()
    );
    Ok(())
}
