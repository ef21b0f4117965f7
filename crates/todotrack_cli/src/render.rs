//! Plain-text views of lists and tasks.

use chrono::{DateTime, Local};
use std::fmt::Write;
use todotrack_core::{Task, TaskBuckets, TaskList};

const SHORT_ID_LEN: usize = 8;
const EMPTY_LIST_MESSAGE: &str = "No tasks yet. Add one above!";

pub fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Formats epoch milliseconds as a local calendar date.
pub fn format_date(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

fn format_snooze_date(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%a %b %-d").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

fn local_time(epoch_ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(&Local))
}

/// One task as a single line.
pub fn task_line(task: &Task, now_ms: i64) -> String {
    let mut parts = Vec::with_capacity(4);
    parts.push(if task.is_completed {
        "Completed".to_string()
    } else {
        age_label(task.days_on_list(now_ms))
    });
    if task.is_periodic {
        parts.push(task.period_label());
    }
    if let (true, Some(until)) = (task.is_snoozed, task.snoozed_until) {
        parts.push(format!(
            "Snoozed until {} ({})",
            format_snooze_date(until),
            task.snooze_label(now_ms)
        ));
    }
    parts.push(format!("Added {}", format_date(task.created_at)));

    let mark = if task.is_completed { "x" } else { " " };
    format!(
        "[{mark}] {}  {}  {}",
        short_id(task),
        task.title,
        parts.join(" | ")
    )
}

fn age_label(days: i64) -> String {
    if days == 1 {
        "1 day on list".to_string()
    } else {
        format!("{days} days on list")
    }
}

/// The open list grouped into active, snoozed and completed sections.
pub fn board(list: Option<&TaskList>, buckets: &TaskBuckets, now_ms: i64) -> String {
    let mut out = String::new();
    let title = list.map_or("(no list)", |list| list.name.as_str());
    let _ = writeln!(out, "== {title} ==");

    if buckets.is_empty() {
        let _ = writeln!(out, "{EMPTY_LIST_MESSAGE}");
        return out;
    }

    for task in &buckets.active {
        let _ = writeln!(out, "{}", task_line(task, now_ms));
    }
    section(&mut out, "Snoozed", &buckets.snoozed, now_ms);
    section(&mut out, "Completed", &buckets.completed, now_ms);
    out
}

fn section(out: &mut String, heading: &str, tasks: &[Task], now_ms: i64) {
    if tasks.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading} ({})", tasks.len());
    for task in tasks {
        let _ = writeln!(out, "{}", task_line(task, now_ms));
    }
}

/// All lists, starring the open one.
pub fn lists(lists: &[TaskList], active: Option<&TaskList>) -> String {
    let mut out = String::new();
    for list in lists {
        let marker = if active.is_some_and(|open| open.id == list.id) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, "{marker} {}", list.name);
    }
    out
}
