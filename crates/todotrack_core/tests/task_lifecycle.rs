use todotrack_core::{
    NewTask, PeriodType, Task, TaskBuckets, TaskValidationError, DAY_MS,
};
use uuid::Uuid;

const T0: i64 = 1_700_000_000_000;

fn new_task(title: &str, created_at: i64) -> Task {
    NewTask {
        list_id: Uuid::new_v4(),
        title: title.to_string(),
        is_periodic: false,
        period_type: None,
        period_days: None,
        created_at,
    }
    .into_task(Uuid::new_v4(), Uuid::new_v4())
}

fn periodic_task(title: &str, period_type: PeriodType, period_days: Option<u16>) -> Task {
    let mut task = new_task(title, T0);
    task.is_periodic = true;
    task.period_type = Some(period_type);
    task.period_days = period_days;
    task
}

fn completed_at(mut task: Task, at: i64) -> Task {
    let patch = task.toggle_complete(at);
    task.apply_patch(&patch);
    task
}

#[test]
fn toggling_twice_restores_state_and_resets_age_anchor() {
    let original = new_task("Buy milk", T0);
    let mut task = original.clone();

    task.apply_patch(&task.toggle_complete(T0 + 5 * DAY_MS));
    assert!(task.is_completed);
    assert_eq!(task.completed_at, Some(T0 + 5 * DAY_MS));
    assert_eq!(task.created_at, T0);
    task.validate().expect("valid task");

    task.apply_patch(&task.toggle_complete(T0 + 7 * DAY_MS));
    assert_eq!(task.is_completed, original.is_completed);
    assert_eq!(task.completed_at, None);
    assert_eq!(task.created_at, T0 + 7 * DAY_MS);
    task.validate().expect("valid task");
}

#[test]
fn completing_does_not_touch_age_anchor_or_snooze() {
    let task = new_task("Buy milk", T0);
    let patch = task.toggle_complete(T0 + 1);
    assert_eq!(patch.created_at, None);
    assert_eq!(patch.is_snoozed, None);
    assert_eq!(patch.snoozed_until, None);
}

#[test]
fn snooze_sets_exact_deadline_and_hides_until_reached() {
    for days in [1_u32, 3, 7, 365] {
        let mut task = new_task("Buy milk", T0);
        task.apply_patch(&task.snooze(days, T0).expect("snooze days in range"));
        let until = T0 + i64::from(days) * DAY_MS;

        assert!(task.is_snoozed);
        assert_eq!(task.snoozed_until, Some(until));
        assert!(!task.is_visible(T0));
        assert!(!task.is_visible(until - 1));
        assert!(task.is_visible(until));
        assert!(task.is_visible(until + DAY_MS));
        task.validate().expect("valid task");
    }
}

#[test]
fn unsnooze_clears_both_fields() {
    let mut task = new_task("Buy milk", T0);
    task.apply_patch(&task.snooze(2, T0).expect("snooze days in range"));
    task.apply_patch(&task.unsnooze());

    assert!(!task.is_snoozed);
    assert_eq!(task.snoozed_until, None);
    assert!(task.is_visible(T0));
}

#[test]
fn days_on_list_is_monotonic_and_resets_after_reopen() {
    let mut task = new_task("Buy milk", T0);
    let mut previous = 0;
    for hour in 0..(24 * 10) {
        let days = task.days_on_list(T0 + hour * 60 * 60 * 1000);
        assert!(days >= previous);
        previous = days;
    }
    assert_eq!(previous, 9);

    task.apply_patch(&task.toggle_complete(T0 + 10 * DAY_MS));
    assert_eq!(task.days_on_list(T0 + 11 * DAY_MS), 0);

    task.apply_patch(&task.toggle_complete(T0 + 12 * DAY_MS));
    assert_eq!(task.days_on_list(T0 + 12 * DAY_MS + 1000), 0);
    assert_eq!(task.days_on_list(T0 + 13 * DAY_MS), 1);
}

#[test]
fn completed_bucket_puts_periodic_first_regardless_of_time() {
    let periodic = completed_at(periodic_task("A", PeriodType::Weekly, None), T0 + 1);
    let plain = completed_at(new_task("B", T0), T0 + 2);

    let buckets = TaskBuckets::partition(&[plain.clone(), periodic.clone()], T0 + 3);
    let titles: Vec<_> = buckets.completed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[test]
fn completed_bucket_orders_by_completion_descending_within_group() {
    let first = completed_at(new_task("first", T0), T0 + 10);
    let second = completed_at(new_task("second", T0), T0 + 20);

    let buckets = TaskBuckets::partition(&[first, second], T0 + 30);
    let titles: Vec<_> = buckets.completed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[test]
fn active_bucket_is_newest_first() {
    let older = new_task("older", T0);
    let newer = new_task("newer", T0 + 1_000);

    let buckets = TaskBuckets::partition(&[older, newer], T0 + 2_000);
    let titles: Vec<_> = buckets.active.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
}

#[test]
fn snoozed_bucket_keeps_input_order_and_releases_expired() {
    let mut long = new_task("long", T0 + 5);
    long.apply_patch(&long.snooze(5, T0).expect("snooze days in range"));
    let mut short = new_task("short", T0);
    short.apply_patch(&short.snooze(1, T0).expect("snooze days in range"));

    let before = TaskBuckets::partition(&[long.clone(), short.clone()], T0);
    let titles: Vec<_> = before.snoozed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["long", "short"]);
    assert!(before.active.is_empty());

    let after = TaskBuckets::partition(&[long, short], T0 + DAY_MS);
    assert_eq!(after.snoozed.len(), 1);
    assert_eq!(after.active.len(), 1);
    assert_eq!(after.active[0].title, "short");
}

#[test]
fn new_plain_task_is_active_with_zero_age_and_no_label() {
    let task = new_task("Buy milk", T0);
    let buckets = TaskBuckets::partition(std::slice::from_ref(&task), T0);

    assert_eq!(buckets.active, vec![task.clone()]);
    assert_eq!(task.days_on_list(T0), 0);
    assert_eq!(task.period_label(), "");
}

#[test]
fn snoozed_milk_reports_ready_after_three_days() {
    let mut task = new_task("Buy milk", T0);
    task.apply_patch(&task.snooze(3, T0).expect("snooze days in range"));

    let hidden = TaskBuckets::partition(std::slice::from_ref(&task), T0 + 1);
    assert!(hidden.active.is_empty());
    assert_eq!(hidden.snoozed.len(), 1);
    assert_eq!(task.snooze_label(T0 + 1), "3 days");

    let later = T0 + 3 * DAY_MS;
    assert_eq!(task.snooze_label(later), "Ready");
    let released = TaskBuckets::partition(std::slice::from_ref(&task), later);
    assert_eq!(released.active.len(), 1);
}

#[test]
fn periodic_labels_follow_cadence() {
    assert_eq!(
        periodic_task("x", PeriodType::Monthly, None).period_label(),
        "Monthly"
    );
    assert_eq!(
        periodic_task("x", PeriodType::Custom, Some(3)).period_label(),
        "Every 3 days"
    );
}

#[test]
fn completing_periodic_task_does_not_recreate_it() {
    let task = periodic_task("water plants", PeriodType::Daily, None);
    let done = completed_at(task, T0 + 1);
    let buckets = TaskBuckets::partition(std::slice::from_ref(&done), T0 + 2 * DAY_MS);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets.completed.len(), 1);
}

#[test]
fn validate_enforces_field_pairings() {
    let mut task = new_task("x", T0);
    task.completed_at = Some(T0);
    assert_eq!(
        task.validate(),
        Err(TaskValidationError::CompletionMismatch {
            is_completed: false
        })
    );

    let mut task = new_task("x", T0);
    task.snoozed_until = Some(T0);
    assert_eq!(
        task.validate(),
        Err(TaskValidationError::SnoozeMismatch { is_snoozed: false })
    );

    let mut task = periodic_task("x", PeriodType::Weekly, Some(3));
    assert_eq!(
        task.validate(),
        Err(TaskValidationError::UnexpectedPeriodDays)
    );
    task.period_type = Some(PeriodType::Custom);
    task.validate().expect("valid task");
    task.period_days = Some(400);
    assert_eq!(
        task.validate(),
        Err(TaskValidationError::PeriodDaysOutOfRange(400))
    );

    let mut task = new_task("   ", T0);
    assert_eq!(task.validate(), Err(TaskValidationError::BlankTitle));
    task.title = "ok".to_string();
    task.is_periodic = true;
    assert_eq!(
        task.validate(),
        Err(TaskValidationError::PeriodTypeMismatch { is_periodic: true })
    );
}

#[test]
fn task_serialization_uses_table_field_names() {
    let task = periodic_task("backup", PeriodType::Custom, Some(10));
    let json = serde_json::to_value(&task).expect("serialize");

    assert_eq!(json["title"], "backup");
    assert_eq!(json["is_periodic"], true);
    assert_eq!(json["period_type"], "custom");
    assert_eq!(json["period_days"], 10);
    assert_eq!(json["created_at"], T0);
    assert!(json["snoozed_until"].is_null());

    let decoded: Task = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, task);
}
