use predicates::prelude::*;

mod helpers;
use helpers::{CliTestHarness, TestFixtures};

#[test]
fn test_add_and_list_recurring_task() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&TestFixtures::monday_task_args())
        .stdout(predicate::str::contains("Created recurring task"))
        .stdout(predicate::str::contains("2 occurrence(s) materialized"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Weekly review"))
        .stdout(predicate::str::contains("recurring"));
}

#[test]
fn test_add_specific_dates_task() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&TestFixtures::dates_task_args())
        .stdout(predicate::str::contains("Created task"))
        .stdout(predicate::str::contains("2 occurrence(s) materialized"));
}

#[test]
fn test_record_on_pattern_date() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::monday_task_args());

    harness
        .run_success(&["record", "Weekly", "3", "--on", "2025-03-03"])
        .stdout(predicate::str::contains("Recorded 3"))
        .stdout(predicate::str::contains("satisfactory"));
}

#[test]
fn test_record_off_pattern_date_reports_error() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::monday_task_args());

    // business errors are reported on stderr
    harness
        .command()
        .args(["record", "Weekly", "3", "--on", "2025-03-04"])
        .assert()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_edit_force_reports_delta() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::monday_task_args());

    harness
        .run_success(&[
            "edit", "Weekly", "--on", "tue", "--min", "2", "--force",
        ])
        .stdout(predicate::str::contains("2 occurrence(s) removed"))
        .stdout(predicate::str::contains("2 created"));
}

#[test]
fn test_target_list_shows_bounds() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::monday_task_args());

    harness
        .run_success(&["target", "list", "Weekly"])
        .stdout(predicate::str::contains("Priority"))
        .stdout(predicate::str::contains(">= 2"));
}

#[test]
fn test_stats_counts_range() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::monday_task_args());
    harness.run_success(&["record", "Weekly", "5", "--on", "2025-03-03"]);

    harness
        .run_success(&[
            "stats", "Weekly", "--from", "2025-03-01", "--to", "2025-03-31",
        ])
        .stdout(predicate::str::contains("2 occurrence(s) in range"));
}

#[test]
fn test_delete_force() {
    let harness = CliTestHarness::new();
    harness.run_success(&TestFixtures::dates_task_args());

    harness
        .run_success(&["delete", "Dentist", "--force"])
        .stdout(predicate::str::contains("Task deleted"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn test_missing_subcommand_fails() {
    let harness = CliTestHarness::new();
    harness.run_failure(&[]);
}
