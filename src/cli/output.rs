use std::io::IsTerminal;

use crossterm::style::{Color, Stylize, style};
use serde::Serialize;

use crate::model::task::{Priority, Summary, Task};
use crate::ops::task_ops::pending_by_priority;
use crate::parse::format_deadline;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Names longer than this are truncated in the list view
const MAX_NAME_CELLS: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based position, usable as a task reference
    pub position: usize,
    pub name: String,
    pub priority: Priority,
    pub completed: bool,
    /// `dd-MM-yyyy`
    pub deadline: String,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub pending_by_priority: PendingJson,
}

#[derive(Serialize)]
pub struct PendingJson {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(position: usize, task: &Task) -> TaskJson {
    TaskJson {
        position,
        name: task.name.clone(),
        priority: task.priority,
        completed: task.completed,
        deadline: format_deadline(task.deadline),
    }
}

pub fn tasks_to_json(tasks: &[Task]) -> Vec<TaskJson> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| task_to_json(i + 1, t))
        .collect()
}

pub fn stats_to_json(summary: Summary, tasks: &[Task]) -> StatsJson {
    let [(_, high), (_, medium), (_, low)] = pending_by_priority(tasks);
    StatsJson {
        total: summary.total,
        completed: summary.completed,
        pending: summary.pending(),
        pending_by_priority: PendingJson { high, medium, low },
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Whether to emit terminal colours on stdout
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn check_mark(task: &Task) -> &'static str {
    if task.completed { "[✔]" } else { "[ ]" }
}

/// Format a single task: `[ ] Buy milk | High | 25-12-2025`
pub fn format_task_line(task: &Task) -> String {
    format!(
        "{} {} | {} | {}",
        check_mark(task),
        task.name,
        task.priority,
        format_deadline(task.deadline)
    )
}

/// Format the whole list as numbered lines with aligned columns
pub fn format_task_list(tasks: &[Task]) -> Vec<String> {
    let num_width = tasks.len().to_string().len();
    let names: Vec<String> = tasks
        .iter()
        .map(|t| truncate_to_width(&t.name, MAX_NAME_CELLS))
        .collect();
    let name_width = names.iter().map(|n| display_width(n)).max().unwrap_or(0);

    tasks
        .iter()
        .zip(&names)
        .enumerate()
        .map(|(i, (task, name))| {
            format!(
                "{:>num_width$}. {} {} | {:<6} | {}",
                i + 1,
                check_mark(task),
                pad_to_width(name, name_width),
                task.priority.as_str(),
                format_deadline(task.deadline),
            )
        })
        .collect()
}

/// Colour a rendered line the way the list view shows it: pending tasks
/// bold in their priority colour, completed tasks struck through.
pub fn style_task_line(line: &str, task: &Task) -> String {
    if task.completed {
        return style(line).crossed_out().to_string();
    }
    style(line)
        .bold()
        .with(priority_color(task.priority))
        .to_string()
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::DarkYellow,
        Priority::Low => Color::DarkGreen,
    }
}

/// Format the summary block for `stats`
pub fn format_stats(summary: Summary, tasks: &[Task]) -> Vec<String> {
    let mut lines = vec![summary.to_string()];
    lines.push(format!("Pending: {}", summary.pending()));
    for (priority, count) in pending_by_priority(tasks) {
        lines.push(format!("  {:<6}  {}", priority.as_str(), count));
    }
    lines
}
