use crate::model::task::Task;
use crate::parse::deadline::format_deadline;
use crate::parse::task_parser::FIELD_DELIMITER;

/// Serialize tasks to the task file format, one newline-terminated line each.
pub fn serialize_tasks(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&serialize_task(task));
        out.push('\n');
    }
    out
}

/// Serialize a single task: `name|priority|completed|dd-MM-yyyy`
pub fn serialize_task(task: &Task) -> String {
    let d = FIELD_DELIMITER;
    format!(
        "{}{d}{}{d}{}{d}{}",
        task.name,
        task.priority,
        task.completed,
        format_deadline(task.deadline)
    )
}
