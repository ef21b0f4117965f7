use rusqlite::Connection;
use todotrack_core::db::{open_db, open_db_in_memory, DataVersionWatch};
use todotrack_core::{
    AddOutcome, AuthGateway, ListService, ManualClock, OAuthRequest, PeriodType, Session,
    SkipReason, SqliteAuthGateway, SqliteListRepository, SqliteTodoRepository, TaskDraft,
    TodoApp, TodoChangeFeed, TodoService, DAY_MS, DEFAULT_LIST_NAME,
};

const T0: i64 = 1_700_000_000_000;

type App<'a> = TodoApp<'a, SqliteListRepository<'a>, SqliteTodoRepository<'a>, &'a ManualClock>;

fn sign_in(conn: &Connection, account: &str) -> Session {
    SqliteAuthGateway::try_new(conn)
        .expect("gateway on migrated db")
        .sign_in_with_oauth(&OAuthRequest::new("google", account))
        .expect("sign in")
}

fn build_app<'a>(
    conn: &'a Connection,
    clock: &'a ManualClock,
    feed: &'a TodoChangeFeed,
    session: Session,
) -> App<'a> {
    let lists = ListService::new(
        SqliteListRepository::try_new(conn, session.user_id).expect("list repo on migrated db"),
        clock,
    );
    let todos = TodoService::new(
        SqliteTodoRepository::try_new(conn, session.user_id)
            .expect("todo repo on migrated db")
            .with_change_feed(feed),
        clock,
    );
    let mut app = TodoApp::new(session, lists, todos, feed);
    app.bootstrap();
    app
}

fn add(app: &mut App<'_>, draft: TaskDraft) -> todotrack_core::Task {
    *app.draft_mut() = draft;
    app.submit_draft().expect("draft submitted")
}

#[test]
fn bootstrap_creates_and_opens_default_list_once() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let session = sign_in(&conn, "me@example.com");

    let app = build_app(&conn, &clock, &feed, session.clone());
    assert_eq!(app.lists().len(), 1);
    assert_eq!(app.active_list().expect("active list").name, DEFAULT_LIST_NAME);
    assert!(app.todos().is_empty());
    assert!(app.buckets().is_empty());
    drop(app);

    let again = build_app(&conn, &clock, &feed, session);
    assert_eq!(again.lists().len(), 1);
}

#[test]
fn buy_milk_snooze_and_release() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let mut app = build_app(&conn, &clock, &feed, sign_in(&conn, "me@example.com"));

    let task = add(&mut app, TaskDraft::new("Buy milk"));
    assert_eq!(app.draft(), &TaskDraft::default());
    let buckets = app.buckets();
    assert_eq!(buckets.active.len(), 1);
    assert_eq!(buckets.active[0].days_on_list(app.now_ms()), 0);
    assert_eq!(buckets.active[0].period_label(), "");

    assert!(app.snooze(task.id, 3));
    let buckets = app.buckets();
    assert!(buckets.active.is_empty());
    assert_eq!(buckets.snoozed.len(), 1);
    assert_eq!(buckets.snoozed[0].snoozed_until, Some(T0 + 3 * DAY_MS));

    clock.advance_days(3);
    let buckets = app.buckets();
    assert_eq!(buckets.active.len(), 1);
    assert_eq!(buckets.active[0].snooze_label(app.now_ms()), "Ready");
    assert_eq!(buckets.active[0].days_on_list(app.now_ms()), 3);

    assert!(app.unsnooze(task.id));
    let stored = app.find_task(task.id).expect("task in snapshot");
    assert!(!stored.is_snoozed);
    assert_eq!(stored.snoozed_until, None);
}

#[test]
fn completing_and_reopening_moves_between_buckets() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let mut app = build_app(&conn, &clock, &feed, sign_in(&conn, "me@example.com"));

    let plain = add(&mut app, TaskDraft::new("Buy milk"));
    let periodic = add(&mut app, TaskDraft::new("Water plants").every_days(3));
    assert_eq!(periodic.period_label(), "Every 3 days");

    clock.advance_ms(1_000);
    assert!(app.toggle_complete(periodic.id));
    clock.advance_ms(1_000);
    assert!(app.toggle_complete(plain.id));

    let buckets = app.buckets();
    assert!(buckets.active.is_empty());
    let order: Vec<_> = buckets.completed.iter().map(|task| task.id).collect();
    assert_eq!(order, vec![periodic.id, plain.id]);

    clock.advance_days(2);
    assert!(app.toggle_complete(plain.id));
    let reopened = app.find_task(plain.id).expect("task in snapshot");
    assert!(!reopened.is_completed);
    assert_eq!(reopened.created_at, app.now_ms());
    assert_eq!(reopened.days_on_list(app.now_ms()), 0);
    assert_eq!(app.buckets().completed.len(), 1);
}

#[test]
fn failed_actions_keep_state_and_report_false() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let mut app = build_app(&conn, &clock, &feed, sign_in(&conn, "me@example.com"));

    let task = add(&mut app, TaskDraft::new("Buy milk"));
    let before = app.todos().to_vec();

    assert!(!app.snooze(task.id, 0));
    assert!(!app.snooze(task.id, 366));
    assert!(!app.toggle_complete(uuid::Uuid::new_v4()));
    assert_eq!(app.todos(), before.as_slice());

    assert!(app.delete(task.id));
    assert!(app.todos().is_empty());
    assert!(!app.delete(task.id));

    app.draft_mut().title = "   ".to_string();
    assert!(app.submit_draft().is_none());
    assert_eq!(app.draft().title, "   ");
}

#[test]
fn creating_a_list_switches_to_it_and_resets_draft() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let mut app = build_app(&conn, &clock, &feed, sign_in(&conn, "me@example.com"));
    add(&mut app, TaskDraft::new("Buy milk"));

    app.draft_mut().title = "half typed".to_string();
    let groceries = app.create_list("  Groceries ").expect("create list");
    assert_eq!(app.active_list_id(), Some(groceries));
    assert_eq!(app.active_list().expect("active list").name, "Groceries");
    assert_eq!(app.draft(), &TaskDraft::default());
    assert!(app.todos().is_empty());

    assert!(app.create_list("   ").is_none());
    assert_eq!(app.lists().len(), 2);
    assert_eq!(app.active_list_id(), Some(groceries));

    assert!(app.select_list_by_name("my tasks"));
    assert_eq!(app.todos().len(), 1);
    assert!(!app.select_list_by_name("nope"));
    assert!(!app.select_list(uuid::Uuid::new_v4()));
    assert_eq!(app.active_list().expect("active list").name, DEFAULT_LIST_NAME);
}

#[test]
fn external_writes_are_picked_up_by_pump() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let session = sign_in(&conn, "me@example.com");
    let user_id = session.user_id;
    let mut app = build_app(&conn, &clock, &feed, session);
    let list_id = app.active_list_id().expect("active list selected");
    app.pump_changes();

    let other_device = TodoService::new(
        SqliteTodoRepository::try_new(&conn, user_id)
            .expect("todo repo on migrated db")
            .with_change_feed(&feed),
        &clock,
    );
    let outcome = other_device
        .add_task(list_id, &TaskDraft::new("From elsewhere"))
        .expect("add task");
    assert!(matches!(outcome, AddOutcome::Created(_)));
    assert!(app.todos().is_empty());

    assert_eq!(app.pump_changes(), 1);
    assert_eq!(app.todos().len(), 1);
    assert_eq!(app.todos()[0].title, "From elsewhere");
    assert_eq!(app.pump_changes(), 0);
}

#[test]
fn changes_to_other_lists_do_not_refetch_active_list() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let session = sign_in(&conn, "me@example.com");
    let user_id = session.user_id;
    let mut app = build_app(&conn, &clock, &feed, session);
    let first = app.active_list_id().expect("active list selected");
    app.create_list("Work").expect("create list");
    app.pump_changes();

    let other_device = TodoService::new(
        SqliteTodoRepository::try_new(&conn, user_id)
            .expect("todo repo on migrated db")
            .with_change_feed(&feed),
        &clock,
    );
    other_device
        .add_task(first, &TaskDraft::new("Not here"))
        .expect("add task");

    assert_eq!(app.pump_changes(), 0);
    assert!(app.todos().is_empty());
    assert_eq!(feed.subscriber_count(), 1);
}

#[test]
fn submit_is_skipped_while_another_is_outstanding() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let session = sign_in(&conn, "me@example.com");
    let lists = ListService::new(
        SqliteListRepository::try_new(&conn, session.user_id).expect("list repo on migrated db"),
        &clock,
    );
    let list_id = lists.ensure_default_list().expect("ensure default list")[0].id;
    let service = TodoService::new(
        SqliteTodoRepository::try_new(&conn, session.user_id).expect("todo repo on migrated db"),
        &clock,
    );
    let draft = TaskDraft::new("Buy milk").periodic(PeriodType::Weekly);

    let guard = service.begin_submit().expect("submit guard free");
    assert!(service.is_submitting());
    assert!(service.begin_submit().is_none());
    assert_eq!(
        service.add_task(list_id, &draft).expect("add task"),
        AddOutcome::Skipped(SkipReason::SubmitInFlight)
    );
    drop(guard);

    assert!(!service.is_submitting());
    let AddOutcome::Created(task) = service.add_task(list_id, &draft).expect("add task") else {
        panic!("expected a created task");
    };
    assert_eq!(task.period_label(), "Weekly");
    assert!(!service.is_submitting());
    assert_eq!(
        service.add_task(list_id, &TaskDraft::new(" ")).expect("add task"),
        AddOutcome::Skipped(SkipReason::BlankTitle)
    );
}

#[test]
fn snooze_is_refused_for_completed_or_already_snoozed_tasks() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let mut app = build_app(&conn, &clock, &feed, sign_in(&conn, "me@example.com"));

    let snoozed = add(&mut app, TaskDraft::new("Call bank"));
    assert!(app.snooze(snoozed.id, 2));
    let until = app.find_task(snoozed.id).expect("task in snapshot").snoozed_until;
    assert!(!app.snooze(snoozed.id, 5));
    assert_eq!(
        app.find_task(snoozed.id).expect("task in snapshot").snoozed_until,
        until
    );

    let done = add(&mut app, TaskDraft::new("Pay rent"));
    assert!(app.toggle_complete(done.id));
    assert!(!app.snooze(done.id, 1));
    let stored = app.find_task(done.id).expect("task in snapshot");
    assert!(!stored.is_snoozed);
    assert_eq!(stored.snoozed_until, None);
}

#[test]
fn commits_from_another_connection_are_seen_through_data_version() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("shared.sqlite3");
    let conn = open_db(&path).expect("open first connection");
    let other_conn = open_db(&path).expect("open second connection");
    let clock = ManualClock::new(T0);
    let feed = TodoChangeFeed::new();
    let other_feed = TodoChangeFeed::new();
    let session = sign_in(&conn, "me@example.com");
    let user_id = session.user_id;
    let mut app = build_app(&conn, &clock, &feed, session);
    let list_id = app.active_list_id().expect("default list opened");
    app.pump_changes();

    let mut watch = DataVersionWatch::try_new(&conn).expect("read data_version");
    assert!(!watch.poll().expect("poll data_version"));

    add(&mut app, TaskDraft::new("Mine"));
    assert!(!watch.poll().expect("poll data_version"));

    let other_process = TodoService::new(
        SqliteTodoRepository::try_new(&other_conn, user_id)
            .expect("repo on migrated db")
            .with_change_feed(&other_feed),
        &clock,
    );
    other_process
        .add_task(list_id, &TaskDraft::new("From another process"))
        .expect("add through second connection");

    app.pump_changes();
    assert_eq!(app.todos().len(), 1);

    assert!(watch.poll().expect("poll data_version"));
    app.refresh();
    let titles: Vec<_> = app.todos().iter().map(|task| task.title.as_str()).collect();
    assert!(titles.contains(&"From another process"));
    assert_eq!(titles.len(), 2);
    assert!(!watch.poll().expect("poll data_version"));
}
