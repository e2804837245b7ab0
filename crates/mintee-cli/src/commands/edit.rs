use anyhow::Result;
use dialoguer::Confirm;
use mintee_core::models::{NewTargetSetData, UpdateScheduleData, UpdateTaskData};
use mintee_core::repository::{MaterializationRepository, Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};

use crate::cli::EditCommand;
use crate::parser::{build_bounds, build_pattern, parse_date, parse_date_list};
use crate::util::resolve_task_id;
use crate::views::table::display_orphan_dates;

pub async fn edit_task(repo: &impl Repository, command: EditCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let success_style = Style::new().green().bold();

    // Metadata edits apply directly; they cannot orphan occurrences.
    if command.name.is_some() || command.description.is_some() || command.description_clear {
        let data = UpdateTaskData {
            name: command.name.clone(),
            description: if command.description_clear {
                Some(None)
            } else {
                command.description.clone().map(Some)
            },
        };
        repo.update_task(task_id, data).await?;
        println!("{} Task updated.", "✓".style(success_style));
    }

    let pattern_given =
        command.on.is_some() || command.weeks.is_some() || command.month_days.is_some();
    let target_given = command.min.is_some()
        || command.max.is_some()
        || command.min_op.is_some()
        || command.max_op.is_some();
    let schedule_given = pattern_given
        || target_given
        || command.from.is_some()
        || command.until.is_some()
        || command.dates.is_some();

    if !schedule_given {
        return Ok(());
    }

    if target_given && !pattern_given {
        return Err(anyhow::anyhow!(
            "Target flags replace a whole target set; give the pattern too (--on/--weeks/--month-days), or use 'mintee target'"
        ));
    }

    let target_sets = if pattern_given {
        let pattern = build_pattern(
            command.on.as_deref(),
            command.weeks.as_deref(),
            command.month_days.as_deref(),
        )?;
        let bounds = build_bounds(command.min, command.min_op, command.max, command.max_op)?;
        Some(vec![NewTargetSetData {
            priority: 0,
            pattern,
            bounds,
        }])
    } else {
        None
    };

    let data = UpdateScheduleData {
        start: command.from.as_deref().map(parse_date).transpose()?,
        end: command.until.as_deref().map(parse_date).transpose()?,
        target_sets,
        dates: command.dates.as_deref().map(parse_date_list).transpose()?,
    };

    let delta = repo.preview_schedule_change(task_id, &data).await?;

    if !delta.to_delete.is_empty() && !command.force {
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

    println!(
        "{} Schedule updated: {} occurrence(s) removed, {} created.",
        "✓".style(success_style),
        delta.to_delete.len(),
        delta.to_create.len()
    );

    Ok(())
}
