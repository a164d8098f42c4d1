use crate::model::task::{Priority, Task};
use crate::parse::deadline::{DateError, parse_deadline};

/// Field separator in the task file
pub const FIELD_DELIMITER: char = '|';

/// Why a single line could not become a task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineFault {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error(transparent)]
    Deadline(#[from] DateError),
}

/// A line skipped during parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based line number
    pub line: usize,
    pub text: String,
    pub fault: LineFault,
}

/// A deadline that could not be parsed. Aborts the whole file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    pub source: DateError,
}

/// Result of parsing a task file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTasks {
    pub tasks: Vec<Task>,
    /// Lines that were skipped for having the wrong field count
    pub dropped: Vec<DroppedLine>,
}

/// Parse the contents of a task file.
///
/// Blank lines are ignored. Lines with the wrong number of fields are
/// collected in `dropped` and parsing continues. A malformed deadline fails
/// the whole parse.
pub fn parse_task_file(text: &str) -> Result<ParsedTasks, LineError> {
    let mut parsed = ParsedTasks::default();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_task_line(line) {
            Ok(task) => parsed.tasks.push(task),
            Err(LineFault::Deadline(source)) => {
                return Err(LineError {
                    line: idx + 1,
                    source,
                });
            }
            Err(fault) => parsed.dropped.push(DroppedLine {
                line: idx + 1,
                text: line.to_string(),
                fault,
            }),
        }
    }

    Ok(parsed)
}

/// Parse a single `name|priority|completed|dd-MM-yyyy` line
pub fn parse_task_line(line: &str) -> Result<Task, LineFault> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let &[name, priority, completed, deadline] = fields.as_slice() else {
        return Err(LineFault::FieldCount(fields.len()));
    };

    let priority = Priority::from_stored(priority);
    let deadline = parse_deadline(deadline)?;

    Ok(Task {
        name: name.to_string(),
        priority,
        completed: parse_completed(completed),
        deadline,
    })
}

/// `true` in any letter case is true; everything else is false.
fn parse_completed(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_line() {
        let task = parse_task_line("Buy milk|High|false|25-12-2025").unwrap();
        assert_eq!(
            task,
            Task {
                name: "Buy milk".into(),
                priority: Priority::High,
                completed: false,
                deadline: ymd(2025, 12, 25),
            }
        );
    }

    #[test]
    fn test_completed_flag_parsing() {
        let done = |flag: &str| {
            parse_task_line(&format!("x|Low|{}|01-01-2030", flag))
                .unwrap()
                .completed
        };
        assert!(done("true"));
        assert!(done("TRUE"));
        assert!(done("True"));
        assert!(!done("false"));
        assert!(!done("yes"));
        assert!(!done("1"));
        assert!(!done(""));
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            parse_task_line("Buy milk|High|25-12-2025"),
            Err(LineFault::FieldCount(3))
        );
        assert_eq!(
            parse_task_line("a|b|High|false|25-12-2025"),
            Err(LineFault::FieldCount(5))
        );
    }

    #[test]
    fn test_unknown_priority_ranks_as_low() {
        let priority = |text: &str| {
            parse_task_line(&format!("Buy milk|{}|false|25-12-2025", text))
                .unwrap()
                .priority
        };
        assert_eq!(priority("High"), Priority::High);
        assert_eq!(priority("Medium"), Priority::Medium);
        assert_eq!(priority("Low"), Priority::Low);
        assert_eq!(priority("high"), Priority::Low);
        assert_eq!(priority("Urgent"), Priority::Low);
        assert_eq!(priority(""), Priority::Low);
    }

    #[test]
    fn test_file_keeps_lines_with_unknown_priority() {
        let parsed = parse_task_file("A|urgent|false|01-02-2030\nB|High|false|02-02-2030\n").unwrap();
        assert!(parsed.dropped.is_empty());
        assert_eq!(parsed.tasks.len(), 2);
        assert_eq!(parsed.tasks[0].priority, Priority::Low);
    }

    #[test]
    fn test_file_skips_short_lines_and_keeps_the_rest() {
        let text = "\
Pay rent|High|false|10-01-2025
broken|Low|05-01-2025
Call mom|Low|true|05-01-2025
";
        let parsed = parse_task_file(text).unwrap();
        assert_eq!(parsed.tasks.len(), 2);
        assert_eq!(parsed.tasks[0].name, "Pay rent");
        assert_eq!(parsed.tasks[1].name, "Call mom");
        assert!(parsed.tasks[1].completed);
        assert_eq!(
            parsed.dropped,
            vec![DroppedLine {
                line: 2,
                text: "broken|Low|05-01-2025".into(),
                fault: LineFault::FieldCount(3),
            }]
        );
    }

    #[test]
    fn test_file_ignores_blank_lines() {
        let parsed = parse_task_file("\nA|Medium|false|01-02-2030\n\n   \r\n").unwrap();
        assert_eq!(parsed.tasks.len(), 1);
        assert!(parsed.dropped.is_empty());
    }

    #[test]
    fn test_file_handles_crlf() {
        let parsed = parse_task_file("A|Low|true|01-02-2030\r\nB|High|false|02-02-2030\r\n").unwrap();
        assert_eq!(parsed.tasks.len(), 2);
        assert!(parsed.tasks[0].completed);
        assert_eq!(parsed.tasks[1].deadline, ymd(2030, 2, 2));
    }

    #[test]
    fn test_bad_deadline_aborts_file() {
        let text = "\
A|High|false|01-02-2030
B|High|false|2030-02-01
C|High|false|03-02-2030
";
        let err = parse_task_file(text).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.source, DateError::Malformed("2030-02-01".into()));
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse_task_file("").unwrap(), ParsedTasks::default());
    }
}
