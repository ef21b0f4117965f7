//! Terminal front end for the todo tracker.
//!
//! # Responsibility
//! - Resolve configuration and start logging before touching storage.
//! - Map subcommands onto `TodoApp` actions and print the results.
//!
//! # Invariants
//! - Failed actions leave the open list untouched; details go to the log.

mod cli;
mod render;

use clap::Parser;
use cli::{AddArgs, Cli, Command, LoginArgs, ShellLine};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use todotrack_core::db::{open_db, Connection, DataVersionWatch};
use todotrack_core::{
    init_logging_from, sign_in, sign_out, AuthGateway, AuthState, ClientConfig, ListService,
    OAuthRequest, PeriodType, Session, SqliteAuthGateway, SqliteListRepository,
    SqliteTodoRepository, SystemClock, TaskDraft, TaskId, TodoApp, TodoChangeFeed, TodoService,
    MAX_SNOOZE_DAYS, MIN_SNOOZE_DAYS,
};

type App<'a> = TodoApp<'a, SqliteListRepository<'a>, SqliteTodoRepository<'a>, SystemClock>;
type CliResult<T> = Result<T, String>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Err(err) = init_logging_from(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn run(cli: Cli, config: &ClientConfig) -> CliResult<()> {
    let conn = open_db(&config.db_path).map_err(|err| {
        format!(
            "cannot open database `{}`: {err}",
            config.db_path.display()
        )
    })?;
    let gateway = SqliteAuthGateway::try_new(&conn).map_err(|err| err.to_string())?;

    let command = cli.command.unwrap_or(Command::Show);
    match command {
        Command::Login(args) => login(&gateway, &args),
        Command::Logout => {
            if !sign_out(&gateway) {
                return Err("sign-out failed; see the log for details".to_string());
            }
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            match AuthState::connect(&gateway).session() {
                Some(session) => println!("{} via {}", session.account, session.provider),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        command => {
            let auth = AuthState::connect(&gateway);
            let Some(session) = auth.session().cloned() else {
                return Err("not signed in; run `todotrack login --account <email>`".to_string());
            };
            let feed = TodoChangeFeed::new();
            let mut app = open_app(&conn, &feed, session)?;
            if let Some(name) = cli.list.as_deref() {
                if !app.select_list_by_name(name) {
                    return Err(format!("no list named `{name}`"));
                }
            }
            match command {
                Command::Shell => shell(&mut app, &conn),
                command => execute(&mut app, command),
            }
        }
    }
}

fn login<G: AuthGateway>(gateway: &G, args: &LoginArgs) -> CliResult<()> {
    let mut request = OAuthRequest::new(args.provider.as_str(), args.account.as_str());
    if let Some(redirect) = &args.redirect {
        request = request.with_redirect(redirect.as_str());
    }
    if let Err(err) = request.normalized() {
        return Err(err.to_string());
    }
    if !sign_in(gateway, &request) {
        return Err("sign-in failed; see the log for details".to_string());
    }
    println!("Signed in as {}.", request.account.trim());
    Ok(())
}

fn open_app<'a>(
    conn: &'a Connection,
    feed: &'a TodoChangeFeed,
    session: Session,
) -> CliResult<App<'a>> {
    let lists =
        SqliteListRepository::try_new(conn, session.user_id).map_err(|err| err.to_string())?;
    let todos = SqliteTodoRepository::try_new(conn, session.user_id)
        .map_err(|err| err.to_string())?
        .with_change_feed(feed);

    let mut app = TodoApp::new(
        session,
        ListService::new(lists, SystemClock),
        TodoService::new(todos, SystemClock),
        feed,
    );
    app.bootstrap();
    if app.active_list_id().is_none() {
        return Err("could not load lists; see the log for details".to_string());
    }
    Ok(app)
}

fn execute(app: &mut App<'_>, command: Command) -> CliResult<()> {
    match command {
        Command::Show => print!("{}", board(app)),
        Command::Lists => print!("{}", render::lists(app.lists(), app.active_list())),
        Command::NewList(args) => {
            let name = args.joined();
            if app.create_list(&name).is_none() {
                return Err(format!("could not create list `{}`", name.trim()));
            }
            println!("Created and opened `{}`.", name.trim());
        }
        Command::Use(args) => {
            let name = args.joined();
            if !app.select_list_by_name(&name) {
                return Err(format!("no list named `{name}`"));
            }
            print!("{}", board(app));
        }
        Command::Add(args) => add(app, args)?,
        Command::Done(task) => {
            let id = resolve_task(app, &task.id)?;
            if !app.toggle_complete(id) {
                return Err("could not update the task; see the log for details".to_string());
            }
            let completed = app.find_task(id).is_some_and(|task| task.is_completed);
            println!("{}", if completed { "Completed." } else { "Reopened." });
        }
        Command::Snooze(args) => {
            if !(MIN_SNOOZE_DAYS..=MAX_SNOOZE_DAYS).contains(&args.days) {
                return Err(format!(
                    "cannot snooze for {} days; allowed range is {MIN_SNOOZE_DAYS}-{MAX_SNOOZE_DAYS}",
                    args.days
                ));
            }
            let id = resolve_task(app, &args.id)?;
            if !app.snooze(id, args.days) {
                return Err(
                    "could not snooze the task; completed and snoozed tasks cannot be snoozed, see the log for details"
                        .to_string(),
                );
            }
            println!("Snoozed for {} days.", args.days);
        }
        Command::Unsnooze(task) => {
            let id = resolve_task(app, &task.id)?;
            if !app.unsnooze(id) {
                return Err("could not unsnooze the task; see the log for details".to_string());
            }
            println!("Back on the list.");
        }
        Command::Rm(task) => {
            let id = resolve_task(app, &task.id)?;
            if !app.delete(id) {
                return Err("could not delete the task; see the log for details".to_string());
            }
            println!("Deleted.");
        }
        Command::Login(_) | Command::Logout | Command::Whoami | Command::Shell => {
            return Err("not available inside the shell".to_string());
        }
    }
    Ok(())
}

fn add(app: &mut App<'_>, args: AddArgs) -> CliResult<()> {
    let mut draft = TaskDraft::new(args.title.join(" "));
    if !draft.is_submittable() {
        return Err("task title must not be blank".to_string());
    }
    match (args.periodic, args.days.as_deref()) {
        (Some(period_type), _) => draft = draft.periodic(period_type),
        (None, Some(_)) => draft = draft.periodic(PeriodType::Custom),
        (None, None) => {}
    }
    if let Some(days) = args.days.as_deref() {
        draft.set_custom_days_input(days);
    }

    *app.draft_mut() = draft;
    let Some(task) = app.submit_draft() else {
        return Err("task was not added; see the log for details".to_string());
    };
    println!("Added `{}` as {}.", task.title, render::short_id(&task));
    Ok(())
}

/// Finds the task in the open list whose id starts with `prefix`.
fn resolve_task(app: &App<'_>, prefix: &str) -> CliResult<TaskId> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return Err("task id must not be blank".to_string());
    }
    let mut matches = app
        .todos()
        .iter()
        .filter(|task| task.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => Err(format!("no task in this list matches `{prefix}`")),
        (Some(_), Some(_)) => Err(format!("`{prefix}` matches more than one task")),
    }
}

fn board(app: &App<'_>) -> String {
    render::board(app.active_list(), &app.buckets(), app.now_ms())
}

fn shell(app: &mut App<'_>, conn: &Connection) -> CliResult<()> {
    info!("event=shell_start module=cli status=ok");
    let mut external = DataVersionWatch::try_new(conn).map_err(|err| err.to_string())?;
    print!("{}", board(app));

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        let prompt = app.active_list().map_or("todotrack", |list| list.name.as_str());
        print!("{prompt}> ");
        std::io::stdout()
            .flush()
            .map_err(|err| format!("stdout: {err}"))?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|err| format!("stdin: {err}"))?;
        if read == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first() {
            None => continue,
            Some(&"exit") | Some(&"quit") => break,
            Some(_) => {}
        }

        app.pump_changes();
        if pull_external_writes(app, &mut external) {
            println!("(list updated)");
        }
        match ShellLine::try_parse_from(words.iter().copied()) {
            Ok(parsed) => {
                if let Err(message) = execute(app, parsed.command) {
                    warn!("event=shell_command module=cli status=error command={}", words[0]);
                    println!("error: {message}");
                }
            }
            Err(err) => {
                let _ = err.print();
            }
        }
    }

    info!("event=shell_stop module=cli status=ok");
    Ok(())
}

/// Re-fetches when another process committed to the database since the
/// last prompt. Returns whether it did.
fn pull_external_writes(app: &mut App<'_>, external: &mut DataVersionWatch<'_>) -> bool {
    match external.poll() {
        Ok(true) => {
            app.refresh();
            true
        }
        Ok(false) => false,
        Err(err) => {
            warn!("event=shell_poll module=cli status=error error={err}");
            false
        }
    }
}
