use clap::Parser;
use dialoguer::Confirm;
use mintee_core::db;
use mintee_core::error::CoreError;
use mintee_core::repository::{SqliteRepository, TaskRepository};
use owo_colors::{OwoColorize, Style};
use util::resolve_task_id;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

const DATABASE_URL: &str = "mintee.db";

#[tokio::main]
async fn main() {
    let config = config::Config::new().unwrap_or_else(|_| config::Config::default());
    let database_url = config
        .database_path
        .clone()
        .unwrap_or_else(|| DATABASE_URL.to_string());

    let db_pool = match db::establish_connection(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool);

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, command).await,
        cli::Commands::List => commands::list::list_tasks(&repository).await,
        cli::Commands::Show(command) => commands::show::show_task(&repository, command).await,
        cli::Commands::Record(command) => {
            commands::record::record_completion(&repository, command).await
        }
        cli::Commands::Edit(command) => commands::edit::edit_task(&repository, command).await,
        cli::Commands::Delete(command) => {
            let task_id = match resolve_task_id(&repository, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e);
                    return;
                }
            };
            let task = match repository.find_task_by_id(task_id).await {
                Ok(Some(t)) => t,
                Ok(None) => {
                    let error_style = Style::new().red().bold();
                    eprintln!(
                        "{} Task with ID '{}' not found.",
                        "Error:".style(error_style),
                        task_id
                    );
                    return;
                }
                Err(e) => {
                    handle_error(e.into());
                    return;
                }
            };

            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to delete task '{}' and all its recorded occurrences?",
                        task.name
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Deletion cancelled.");
                    return;
                }
            }
            commands::delete::delete_task(&repository, task_id).await
        }
        cli::Commands::Target(command) => {
            commands::target::target_command(&repository, command).await
        }
        cli::Commands::Stats(command) => {
            commands::stats::stats_command(&repository, command, &config).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in tasks {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidTarget(s) => {
                eprintln!(
                    "{} Invalid target: {}. Adjust the bounds and retry.",
                    "Error:".style(error_style),
                    s.yellow()
                );
            }
            CoreError::CorruptRecord(s) => {
                eprintln!(
                    "{} The database holds an unreadable record: {}",
                    "Error:".style(error_style),
                    s
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
