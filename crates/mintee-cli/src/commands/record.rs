use anyhow::Result;
use chrono::Local;
use mintee_core::repository::{InstanceRepository, Repository};
use mintee_core::target::CompletionStatus;
use owo_colors::{OwoColorize, Style};

use crate::cli::RecordCommand;
use crate::parser::parse_date;
use crate::util::resolve_task_id;

pub async fn record_completion(repo: &impl Repository, command: RecordCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let date = match &command.on {
        Some(date_str) => parse_date(date_str)?,
        None => Local::now().date_naive(),
    };

    let instance = repo.record_completion(task_id, date, command.value).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Recorded {} for {}",
        "✓".style(success_style),
        command.value,
        instance.date
    );

    // Report where that leaves the occurrence against its target.
    let details = repo.find_instance_details(task_id, date, date).await?;
    if let Some(bounds) = details.first().and_then(|detail| detail.bounds) {
        let status = bounds.completion_status(command.value);
        let status_text = match status {
            CompletionStatus::Satisfactory => status.to_string().green().bold().to_string(),
            CompletionStatus::Borderline => status.to_string().yellow().bold().to_string(),
            CompletionStatus::Unsatisfactory => status.to_string().red().bold().to_string(),
        };
        let progress = bounds
            .completion_fraction(command.value)
            .map(|fraction| format!("{:.0}%", fraction * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!("  Target {} — {} ({})", bounds, status_text, progress);
    }

    Ok(())
}
