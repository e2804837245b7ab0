use clap::{Parser, Subcommand, ValueEnum};
use mintee_core::target::TargetOperator;

/// Track recurring habits and tasks against completion targets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List,
    /// Show a task's schedule, targets, and recorded occurrences
    Show(ShowCommand),
    /// Record a completion value for an occurrence
    Record(RecordCommand),
    /// Edit a task's name, range, or schedule
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Manage a task's target sets
    Target(TargetCommand),
    /// Summarize completion over a date range
    Stats(StatsCommand),
}

/// Comparison operator for a target bound
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorArg {
    /// Strictly above (min) / below (max) the bound
    Lt,
    /// At or above (min) / at or below (max) the bound
    Lte,
    /// Exactly the bound value
    Eq,
}

impl From<OperatorArg> for TargetOperator {
    fn from(arg: OperatorArg) -> Self {
        match arg {
            OperatorArg::Lt => TargetOperator::LessThan,
            OperatorArg::Lte => TargetOperator::LessThanOrEqual,
            OperatorArg::Eq => TargetOperator::Equal,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The name of the task
    pub name: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// First day of the recurrence range (e.g. '2025-03-03', 'next monday')
    #[clap(long)]
    pub from: Option<String>,
    /// Last day of the recurrence range, inclusive
    #[clap(long)]
    pub until: Option<String>,
    /// Days of week (sun,mon,tue,wed,thu,fri,sat or 'weekdays'/'weekends')
    #[clap(long)]
    pub on: Option<String>,
    /// Weeks of month (first,second,third,fourth,last); requires --on
    #[clap(long)]
    pub weeks: Option<String>,
    /// Days of month (1-31 or 'last')
    #[clap(long, conflicts_with_all = ["on", "weeks"])]
    pub month_days: Option<String>,
    /// One-off dates instead of a recurrence (comma-separated)
    #[clap(long, conflicts_with_all = ["from", "until", "on", "weeks", "month_days"])]
    pub dates: Option<String>,
    /// Minimum target value
    #[clap(long)]
    pub min: Option<f32>,
    /// Operator for the minimum bound (defaults to lte when --min is given)
    #[clap(long, value_enum)]
    pub min_op: Option<OperatorArg>,
    /// Maximum target value
    #[clap(long)]
    pub max: Option<f32>,
    /// Operator for the maximum bound (defaults to lte when --max is given)
    #[clap(long, value_enum)]
    pub max_op: Option<OperatorArg>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID of the task to show
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecordCommand {
    /// The ID of the task
    pub id: String,
    /// The completion value to record
    pub value: f32,
    /// The occurrence date (defaults to today)
    #[clap(long)]
    pub on: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    /// New first day of the recurrence range
    #[arg(long)]
    pub from: Option<String>,
    /// New last day of the recurrence range
    #[arg(long)]
    pub until: Option<String>,

    /// Replace the schedule's days of week. Changing the pattern replaces
    /// the task's target sets, so target flags must be given too.
    #[arg(long)]
    pub on: Option<String>,
    /// Replace the schedule's weeks of month; requires --on
    #[arg(long)]
    pub weeks: Option<String>,
    /// Replace the schedule's days of month
    #[arg(long, conflicts_with_all = ["on", "weeks"])]
    pub month_days: Option<String>,
    /// Replace a specific-dates task's dates (comma-separated)
    #[arg(long, conflicts_with_all = ["from", "until", "on", "weeks", "month_days"])]
    pub dates: Option<String>,

    #[arg(long)]
    pub min: Option<f32>,
    #[arg(long, value_enum)]
    pub min_op: Option<OperatorArg>,
    #[arg(long)]
    pub max: Option<f32>,
    #[arg(long, value_enum)]
    pub max_op: Option<OperatorArg>,

    /// Apply without confirming, even if recorded occurrences are deleted
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TargetCommand {
    #[command(subcommand)]
    pub command: TargetSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TargetSubcommand {
    /// Add a target set to a recurring task
    Add(TargetAddCommand),
    /// List a task's target sets
    List(TargetListCommand),
    /// Remove a target set by priority
    Remove(TargetRemoveCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct TargetAddCommand {
    /// The ID of the task
    pub id: String,
    /// Priority of the new set (lower wins when several sets match a date)
    #[clap(long)]
    pub priority: u32,
    /// Days of week for the set's pattern
    #[clap(long)]
    pub on: Option<String>,
    /// Weeks of month; requires --on
    #[clap(long)]
    pub weeks: Option<String>,
    /// Days of month
    #[clap(long, conflicts_with_all = ["on", "weeks"])]
    pub month_days: Option<String>,
    #[clap(long)]
    pub min: Option<f32>,
    #[clap(long, value_enum)]
    pub min_op: Option<OperatorArg>,
    #[clap(long)]
    pub max: Option<f32>,
    #[clap(long, value_enum)]
    pub max_op: Option<OperatorArg>,
    /// Apply without confirming
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TargetListCommand {
    /// The ID of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct TargetRemoveCommand {
    /// The ID of the task
    pub id: String,
    /// Priority of the set to remove
    pub priority: u32,
    /// Apply without confirming, even if recorded occurrences are deleted
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsCommand {
    /// The ID of the task
    pub id: String,
    /// Start of the range (defaults to the configured window before today)
    #[clap(long)]
    pub from: Option<String>,
    /// End of the range (defaults to today)
    #[clap(long)]
    pub to: Option<String>,
}
