use anyhow::Result;
use chrono::{Duration, Local};
use mintee_core::analysis::summarize_instances;
use mintee_core::repository::{InstanceRepository, Repository, TaskRepository};
use owo_colors::{OwoColorize, Style};

use crate::cli::StatsCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::util::resolve_task_id;

pub async fn stats_command(
    repo: &impl Repository,
    command: StatsCommand,
    config: &Config,
) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Task with ID '{}' not found", task_id))?;

    let today = Local::now().date_naive();
    let end = match &command.to {
        Some(date_str) => parse_date(date_str)?,
        None => today,
    };
    let start = match &command.from {
        Some(date_str) => parse_date(date_str)?,
        None => end - Duration::days(i64::from(config.stats.window_days)),
    };
    if start > end {
        return Err(anyhow::anyhow!("Range start {} is after its end {}", start, end));
    }

    let details = repo.find_instance_details(task_id, start, end).await?;
    let summary = summarize_instances(start, end, &details);

    let info_style = Style::new().blue();

    println!(
        "{} — {} through {}",
        task.name.bright_white().bold(),
        start,
        end
    );
    println!(
        "{} {} occurrence(s) in range",
        "→".style(info_style),
        summary.total()
    );
    println!("  {} {}", "satisfactory".green().bold(), summary.satisfactory);
    println!("  {} {}", "borderline".yellow().bold(), summary.borderline);
    println!(
        "  {} {}",
        "unsatisfactory".red().bold(),
        summary.unsatisfactory
    );
    if summary.untargeted > 0 {
        println!("  {} {}", "untargeted".bright_black(), summary.untargeted);
    }
    if let Some(average) = summary.average_fraction {
        println!(
            "{} Average progress: {:.0}%",
            "→".style(info_style),
            average * 100.0
        );
    }

    Ok(())
}
