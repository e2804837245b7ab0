use anyhow::Result;
use mintee_core::models::{NewScheduleData, NewTargetSetData, NewTaskData};
use mintee_core::repository::{InstanceRepository, Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::parser::{build_bounds, build_pattern, parse_date, parse_date_list};

pub async fn add_task(repo: &impl Repository, command: AddCommand) -> Result<()> {
    let schedule = if let Some(dates_str) = &command.dates {
        if command.min.is_some() || command.max.is_some() {
            return Err(anyhow::anyhow!(
                "Targets apply to recurring tasks; one-off dates are recorded without bounds"
            ));
        }
        NewScheduleData::SpecificDates {
            dates: parse_date_list(dates_str)?,
        }
    } else {
        let from = command
            .from
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("A recurring task needs --from (or use --dates)"))?;
        let until = command
            .until
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("A recurring task needs --until (or use --dates)"))?;

        let pattern = build_pattern(
            command.on.as_deref(),
            command.weeks.as_deref(),
            command.month_days.as_deref(),
        )?;
        let bounds = build_bounds(command.min, command.min_op, command.max, command.max_op)?;

        NewScheduleData::Recurring {
            start: parse_date(from)?,
            end: parse_date(until)?,
            target_sets: vec![NewTargetSetData {
                priority: 0,
                pattern,
                bounds,
            }],
        }
    };

    let is_recurring = matches!(schedule, NewScheduleData::Recurring { .. });
    let new_task_data = NewTaskData {
        name: command.name,
        description: command.description,
        schedule,
    };

    let added_task = repo.add_task(new_task_data).await?;
    let occurrence_count = repo.find_instances_for_task(added_task.id).await?.len();

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    if is_recurring {
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            added_task.name.bright_white().bold()
        );
    } else {
        println!(
            "{} Created task: {}",
            "✓".style(success_style),
            added_task.name.bright_white().bold()
        );
    }
    println!(
        "  {} Task ID: {}",
        "→".style(info_style),
        added_task.id.to_string().yellow()
    );
    println!(
        "  {} {} occurrence(s) materialized",
        "→".style(info_style),
        occurrence_count
    );

    println!("\n{} Next steps:", "💡".style(subtle_style));
    println!(
        "   {} Record a completion: mintee record {} <value>",
        "•".style(subtle_style),
        added_task.id.to_string().yellow()
    );
    println!(
        "   {} View the schedule: mintee show {}",
        "•".style(subtle_style),
        added_task.id.to_string().yellow()
    );

    Ok(())
}
