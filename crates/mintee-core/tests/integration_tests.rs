use chrono::NaiveDate;
use mintee_core::db::establish_connection;
use mintee_core::models::*;
use mintee_core::pattern::{DayOfMonth, DayOfWeek, DayPattern};
use mintee_core::repository::{
    InstanceRepository, MaterializationRepository, SqliteRepository, TaskRepository,
};
use mintee_core::target::{CompletionStatus, TargetBounds, TargetOperator};
use tempfile::TempDir;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::new(pool), temp_dir)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn weekly_pattern(days: &[DayOfWeek]) -> DayPattern {
    DayPattern::weekly(days.iter().copied().collect())
}

fn at_least(min: f32) -> TargetBounds {
    TargetBounds::validated(
        TargetOperator::LessThanOrEqual,
        TargetOperator::NotApplicable,
        min,
        0.0,
    )
    .expect("valid bounds")
}

/// Helper to create a recurring Monday task over a two-week window
async fn create_monday_task(repo: &SqliteRepository) -> Task {
    let data = NewTaskData {
        name: "Weekly review".to_string(),
        description: Some("Test task".to_string()),
        schedule: NewScheduleData::Recurring {
            start: ymd(2025, 3, 3),
            end: ymd(2025, 3, 16),
            target_sets: vec![NewTargetSetData {
                priority: 0,
                pattern: weekly_pattern(&[DayOfWeek::Monday]),
                bounds: at_least(2.0),
            }],
        },
    };
    repo.add_task(data).await.expect("Failed to create test task")
}

#[tokio::test]
async fn test_add_recurring_task_materializes_instances() {
    let (repo, _temp_dir) = setup_test_db().await;

    let task = create_monday_task(&repo).await;
    assert_eq!(task.kind, TaskKind::Recurring);
    assert_eq!(task.start_date, Some(ymd(2025, 3, 3)));

    // 2025-03-03 and 2025-03-10 are the two Mondays in range
    let instances = repo.find_instances_for_task(task.id).await.unwrap();
    let dates: Vec<NaiveDate> = instances.iter().map(|i| i.date).collect();
    assert_eq!(dates, vec![ymd(2025, 3, 3), ymd(2025, 3, 10)]);
    assert!(instances.iter().all(|i| i.target_set_id.is_some()));
    assert!(instances.iter().all(|i| i.completion == 0.0));
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    let created = repo.refresh_task_instances(task.id).await.unwrap();
    assert_eq!(created, 0);
    assert_eq!(repo.find_instances_for_task(task.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_record_completion_and_status() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    let instance = repo
        .record_completion(task.id, ymd(2025, 3, 3), 3.0)
        .await
        .unwrap();
    assert_eq!(instance.completion, 3.0);

    let details = repo
        .find_instance_details(task.id, ymd(2025, 3, 1), ymd(2025, 3, 31))
        .await
        .unwrap();
    assert_eq!(details.len(), 2);

    let first = &details[0];
    let bounds = first.bounds.expect("recurring instance carries bounds");
    assert_eq!(
        bounds.completion_status(first.instance.completion),
        CompletionStatus::Satisfactory
    );
    // second Monday still at zero, below the >= 2 target
    let second = &details[1];
    let bounds = second.bounds.unwrap();
    assert_eq!(
        bounds.completion_status(second.instance.completion),
        CompletionStatus::Unsatisfactory
    );
}

#[tokio::test]
async fn test_record_completion_off_pattern_date_fails() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    // 2025-03-04 is a Tuesday; no instance exists there
    let result = repo.record_completion(task.id, ymd(2025, 3, 4), 1.0).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_schedule_edit_preview_and_apply() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    repo.record_completion(task.id, ymd(2025, 3, 3), 5.0)
        .await
        .unwrap();

    // Move the pattern from Monday to Tuesday: both Mondays become orphans.
    let edit = UpdateScheduleData {
        target_sets: Some(vec![NewTargetSetData {
            priority: 0,
            pattern: weekly_pattern(&[DayOfWeek::Tuesday]),
            bounds: at_least(2.0),
        }]),
        ..Default::default()
    };

    let delta = repo.preview_schedule_change(task.id, &edit).await.unwrap();
    assert_eq!(delta.to_delete, vec![ymd(2025, 3, 3), ymd(2025, 3, 10)]);
    assert_eq!(delta.to_create, vec![ymd(2025, 3, 4), ymd(2025, 3, 11)]);

    // Preview alone must not touch storage.
    let dates: Vec<NaiveDate> = repo
        .find_instances_for_task(task.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.date)
        .collect();
    assert_eq!(dates, vec![ymd(2025, 3, 3), ymd(2025, 3, 10)]);

    let updated = repo.apply_schedule_change(task.id, edit).await.unwrap();
    assert_eq!(updated.id, task.id);

    let dates: Vec<NaiveDate> = repo
        .find_instances_for_task(task.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.date)
        .collect();
    assert_eq!(dates, vec![ymd(2025, 3, 4), ymd(2025, 3, 11)]);
}

#[tokio::test]
async fn test_schedule_edit_preserves_retained_completions() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    repo.record_completion(task.id, ymd(2025, 3, 3), 4.0)
        .await
        .unwrap();

    // Shrink the range to one week: only the second Monday is orphaned.
    let edit = UpdateScheduleData {
        end: Some(ymd(2025, 3, 9)),
        ..Default::default()
    };

    let delta = repo.preview_schedule_change(task.id, &edit).await.unwrap();
    assert_eq!(delta.to_delete, vec![ymd(2025, 3, 10)]);
    assert!(delta.to_create.is_empty());

    repo.apply_schedule_change(task.id, edit).await.unwrap();

    let instances = repo.find_instances_for_task(task.id).await.unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].date, ymd(2025, 3, 3));
    assert_eq!(instances[0].completion, 4.0);
}

#[tokio::test]
async fn test_priority_order_decides_owning_set() {
    let (repo, _temp_dir) = setup_test_db().await;

    let data = NewTaskData {
        name: "Stretching".to_string(),
        description: None,
        schedule: NewScheduleData::Recurring {
            start: ymd(2025, 3, 3),
            end: ymd(2025, 3, 9),
            target_sets: vec![
                NewTargetSetData {
                    priority: 1,
                    pattern: weekly_pattern(&[DayOfWeek::Monday, DayOfWeek::Wednesday]),
                    bounds: at_least(10.0),
                },
                NewTargetSetData {
                    priority: 0,
                    pattern: weekly_pattern(&[DayOfWeek::Monday]),
                    bounds: at_least(20.0),
                },
            ],
        },
    };
    let task = repo.add_task(data).await.unwrap();

    let sets = repo.find_target_sets(task.id).await.unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].priority, 0);

    let instances = repo.find_instances_for_task(task.id).await.unwrap();
    assert_eq!(instances.len(), 2);
    // Monday belongs to the priority-0 set, Wednesday falls through to 1
    assert_eq!(instances[0].date, ymd(2025, 3, 3));
    assert_eq!(instances[0].target_set_id, Some(sets[0].id));
    assert_eq!(instances[1].date, ymd(2025, 3, 5));
    assert_eq!(instances[1].target_set_id, Some(sets[1].id));
}

#[tokio::test]
async fn test_specific_dates_task_lifecycle() {
    let (repo, _temp_dir) = setup_test_db().await;

    let data = NewTaskData {
        name: "Dentist".to_string(),
        description: None,
        schedule: NewScheduleData::SpecificDates {
            dates: vec![ymd(2025, 4, 10), ymd(2025, 7, 2), ymd(2025, 4, 10)],
        },
    };
    let task = repo.add_task(data).await.unwrap();
    assert_eq!(task.kind, TaskKind::SpecificDates);

    // duplicate dates collapse to one instance
    let instances = repo.find_instances_for_task(task.id).await.unwrap();
    assert_eq!(instances.len(), 2);
    assert!(instances.iter().all(|i| i.target_set_id.is_none()));

    // replace the date list; the removed date is the orphan
    let edit = UpdateScheduleData {
        dates: Some(vec![ymd(2025, 7, 2), ymd(2025, 8, 1)]),
        ..Default::default()
    };
    let delta = repo.preview_schedule_change(task.id, &edit).await.unwrap();
    assert_eq!(delta.to_delete, vec![ymd(2025, 4, 10)]);
    assert_eq!(delta.to_create, vec![ymd(2025, 8, 1)]);

    repo.apply_schedule_change(task.id, edit).await.unwrap();
    let dates: Vec<NaiveDate> = repo
        .find_instances_for_task(task.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.date)
        .collect();
    assert_eq!(dates, vec![ymd(2025, 7, 2), ymd(2025, 8, 1)]);
}

#[tokio::test]
async fn test_last_day_of_month_pattern_end_to_end() {
    let (repo, _temp_dir) = setup_test_db().await;

    let data = NewTaskData {
        name: "Pay rent".to_string(),
        description: None,
        schedule: NewScheduleData::Recurring {
            start: ymd(2024, 1, 1),
            end: ymd(2024, 3, 31),
            target_sets: vec![NewTargetSetData {
                priority: 0,
                pattern: DayPattern::monthly_by_day([DayOfMonth::Last].into_iter().collect()),
                bounds: at_least(1.0),
            }],
        },
    };
    let task = repo.add_task(data).await.unwrap();

    let dates: Vec<NaiveDate> = repo
        .find_instances_for_task(task.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.date)
        .collect();
    // 2024 is a leap year: February materializes on the 29th
    assert_eq!(dates, vec![ymd(2024, 1, 31), ymd(2024, 2, 29), ymd(2024, 3, 31)]);
}

#[tokio::test]
async fn test_task_crud_and_short_id_resolution() {
    let (repo, _temp_dir) = setup_test_db().await;
    let task = create_monday_task(&repo).await;

    let update = UpdateTaskData {
        name: Some("Weekly planning".to_string()),
        description: Some(None),
    };
    let updated = repo.update_task(task.id, update).await.unwrap();
    assert_eq!(updated.name, "Weekly planning");
    assert_eq!(updated.description, None);

    let prefix = &task.id.to_string()[..8];
    let matches = repo.find_tasks_by_short_id_prefix(prefix).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, task.id);

    repo.delete_task(task.id).await.unwrap();
    assert!(repo.find_task_by_id(task.id).await.unwrap().is_none());
    // cascade removes the instances too
    assert!(repo.find_instances_for_task(task.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_schedules_rejected() {
    let (repo, _temp_dir) = setup_test_db().await;

    let inverted = NewTaskData {
        name: "Broken".to_string(),
        description: None,
        schedule: NewScheduleData::Recurring {
            start: ymd(2025, 3, 10),
            end: ymd(2025, 3, 3),
            target_sets: vec![NewTargetSetData {
                priority: 0,
                pattern: weekly_pattern(&[DayOfWeek::Monday]),
                bounds: at_least(1.0),
            }],
        },
    };
    assert!(repo.add_task(inverted).await.is_err());

    let no_sets = NewTaskData {
        name: "Empty".to_string(),
        description: None,
        schedule: NewScheduleData::Recurring {
            start: ymd(2025, 3, 3),
            end: ymd(2025, 3, 10),
            target_sets: vec![],
        },
    };
    assert!(repo.add_task(no_sets).await.is_err());
}
