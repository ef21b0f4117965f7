use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use todotrack_core::PeriodType;

#[derive(Parser)]
#[command(
    name = "todotrack",
    about = concat!("todotrack v", env!("CARGO_PKG_VERSION"), " - lists, snoozes and recurring chores"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Database file (overrides TODOTRACK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// List to open instead of the first one
    #[arg(short = 'l', long, global = true)]
    pub list: Option<String>,

    /// Log level: trace, debug, info, warn or error (overrides TODOTRACK_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute log directory (overrides TODOTRACK_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

/// One line typed into the interactive shell.
#[derive(Parser)]
#[command(name = "todotrack", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in through an OAuth provider
    Login(LoginArgs),
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show all lists; the open one is starred
    Lists,
    /// Create a list and open it
    NewList(NameArgs),
    /// Open a list by name
    Use(NameArgs),
    /// Show the open list grouped into active, snoozed and completed
    Show,
    /// Add a task to the open list
    Add(AddArgs),
    /// Toggle a task between open and completed
    Done(TaskRef),
    /// Hide a task for a number of days
    Snooze(SnoozeArgs),
    /// Bring a snoozed task back now
    Unsnooze(TaskRef),
    /// Permanently delete a task
    Rm(TaskRef),
    /// Interactive session that follows changes made elsewhere
    Shell,
}

#[derive(Args)]
pub struct LoginArgs {
    /// OAuth provider id
    #[arg(long, default_value = "google")]
    pub provider: String,
    /// Provider account, usually an email address
    #[arg(long)]
    pub account: String,
    /// Where the provider should return after consent
    #[arg(long)]
    pub redirect: Option<String>,
}

#[derive(Args)]
pub struct NameArgs {
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

impl NameArgs {
    pub fn joined(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
    /// Recurrence: daily, weekly, monthly, quarterly, yearly or custom
    #[arg(long, value_name = "TYPE")]
    pub periodic: Option<PeriodType>,
    /// Days between repeats for a custom recurrence (1-365)
    #[arg(long, value_name = "N")]
    pub days: Option<String>,
}

#[derive(Args)]
pub struct TaskRef {
    /// Task id or a unique prefix of it
    pub id: String,
}

#[derive(Args)]
pub struct SnoozeArgs {
    /// Task id or a unique prefix of it
    pub id: String,
    /// Days to snooze (1-365)
    pub days: u32,
}
