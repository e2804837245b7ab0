use chrono::NaiveDate;
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use mintee_core::models::{InstanceDetail, Task, TaskKind, TaskTargetSet};
use mintee_core::target::CompletionStatus;

pub fn display_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Kind", "From", "Until", "Created"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(&task.id.to_string()[..7]));

        let mut display_name = String::new();
        if task.kind == TaskKind::Recurring {
            display_name.push('↻'); // Recurring symbol
            display_name.push(' ');
        }
        display_name.push_str(&task.name);
        row.add_cell(Cell::new(display_name));

        row.add_cell(Cell::new(task.kind.to_string()));
        row.add_cell(Cell::new(format_date_opt(task.start_date)));
        row.add_cell(Cell::new(format_date_opt(task.end_date)));
        row.add_cell(Cell::new(task.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_target_sets(sets: &[TaskTargetSet]) {
    if sets.is_empty() {
        println!("No target sets.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Priority", "Type", "Pattern", "Target"]);

    for set in sets {
        let mut row = Row::new();
        row.add_cell(Cell::new(set.priority));
        row.add_cell(Cell::new(set.pattern.pattern_type().to_string()));
        row.add_cell(Cell::new(describe_pattern(set)));
        row.add_cell(Cell::new(set.bounds.to_string()));
        table.add_row(row);
    }

    println!("{table}");
}

/// Instances with their legend-colored status: green for satisfactory,
/// yellow for borderline, red for unsatisfactory.
pub fn display_instances(details: &[InstanceDetail]) {
    if details.is_empty() {
        println!("No occurrences recorded.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Completion", "Target", "Progress", "Status"]);

    for detail in details {
        let mut row = Row::new();
        row.add_cell(Cell::new(detail.instance.date.to_string()));
        row.add_cell(Cell::new(detail.instance.completion));

        match &detail.bounds {
            Some(bounds) => {
                row.add_cell(Cell::new(bounds.to_string()));

                let progress = bounds
                    .completion_fraction(detail.instance.completion)
                    .map(|fraction| format!("{:.0}%", fraction * 100.0))
                    .unwrap_or_else(|| "-".to_string());
                row.add_cell(Cell::new(progress));

                let status = bounds.completion_status(detail.instance.completion);
                let status_cell = Cell::new(status.to_string());
                let status_cell = match status {
                    CompletionStatus::Satisfactory => status_cell.fg(Color::Green),
                    CompletionStatus::Borderline => status_cell.fg(Color::Yellow),
                    CompletionStatus::Unsatisfactory => status_cell.fg(Color::Red),
                };
                row.add_cell(status_cell);
            }
            None => {
                row.add_cell(Cell::new("-"));
                row.add_cell(Cell::new("-"));
                row.add_cell(Cell::new("untargeted").fg(Color::DarkGrey));
            }
        }

        table.add_row(row);
    }

    println!("{table}");
}

/// Dates whose recorded completions a pending edit would delete.
pub fn display_orphan_dates(dates: &[NaiveDate]) {
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Occurrences to delete")
        .add_attribute(Attribute::Bold)
        .fg(Color::Red)]);
    for date in dates {
        table.add_row(vec![Cell::new(date.to_string())]);
    }
    println!("{table}");
}

fn format_date_opt(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn describe_pattern(set: &TaskTargetSet) -> String {
    use mintee_core::pattern::PatternType;

    let pattern = &set.pattern;
    match pattern.pattern_type() {
        PatternType::DayOfWeek => join_display(pattern.days_of_week.iter()),
        PatternType::WeekOfMonth => format!(
            "{} week(s): {}",
            join_display(pattern.weeks_of_month.iter()),
            join_display(pattern.days_of_week.iter())
        ),
        PatternType::DayOfMonth => format!("day(s) {}", join_display(pattern.days_of_month.iter())),
    }
}

fn join_display<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
