use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mintee").expect("Failed to find mintee binary");

        // Route the CLI at the temporary database
        cmd.env("MINTEE_DATABASE_PATH", &self.db_path);

        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// A recurring Monday task over a fixed two-week window
    pub fn monday_task_args() -> Vec<&'static str> {
        vec![
            "add",
            "Weekly review",
            "--from",
            "2025-03-03",
            "--until",
            "2025-03-16",
            "--on",
            "mon",
            "--min",
            "2",
        ]
    }

    /// A one-off dates task
    pub fn dates_task_args() -> Vec<&'static str> {
        vec!["add", "Dentist", "--dates", "2025-04-10,2025-07-02"]
    }
}
