use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task priority. Declaration order is rank order: High sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Integer rank used for sorting (High = 1, Medium = 2, Low = 3)
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// The literal written to the task file
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Read the literal stored in the task file. Only `High` and `Medium`
    /// are recognized exactly; any other text ranks as Low.
    pub fn from_stored(s: &str) -> Priority {
        match s {
            "High" => Priority::High,
            "Medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for priority text typed by a user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority '{0}' (expected high, medium or low)")]
pub struct UnknownPriority(pub String);

/// User input is matched case-insensitively; `h`/`m`/`l` are accepted too.
impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub priority: Priority,
    pub completed: bool,
    pub deadline: NaiveDate,
}

impl Task {
    /// Create a pending task
    pub fn new(name: impl Into<String>, priority: Priority, deadline: NaiveDate) -> Self {
        Task {
            name: name.into(),
            priority,
            completed: false,
            deadline,
        }
    }

    /// Case-insensitive name comparison, used for duplicate checks and lookups
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

/// Raw values submitted for an add or edit, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub priority: Priority,
    /// Deadline text in `dd-MM-yyyy`
    pub deadline: String,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, priority: Priority, deadline: impl Into<String>) -> Self {
        TaskDraft {
            name: name.into(),
            priority,
            deadline: deadline.into(),
        }
    }
}

/// Counts shown under the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
}

impl Summary {
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total Tasks: {} | Completed: {}", self.total, self.completed)
    }
}

/// How a caller addresses a task in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    /// 0-based index in the current order
    Position(usize),
    /// Case-insensitive name
    Name(String),
}

impl TaskRef {
    /// Parse a user-supplied reference: a 1-based number without leading
    /// zeros selects by position, anything else selects by name. A position
    /// past the end of the list falls back to a task with that number as
    /// its name (see `TaskStore::get`).
    pub fn from_user_input(s: &str) -> TaskRef {
        let trimmed = s.trim();
        if trimmed.starts_with('0') || trimmed.starts_with('+') {
            return TaskRef::Name(trimmed.to_string());
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => TaskRef::Position(n - 1),
            _ => TaskRef::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskRef::Position(i) => write!(f, "#{}", i + 1),
            TaskRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
        assert_eq!(
            Priority::ALL.map(Priority::rank),
            [1, 2, 3]
        );
    }

    #[test]
    fn test_stored_priority_is_case_sensitive() {
        assert_eq!(Priority::from_stored("Medium"), Priority::Medium);
        assert_eq!(Priority::from_stored("medium"), Priority::Low);
        assert_eq!(Priority::from_stored("HIGH"), Priority::Low);
    }

    #[test]
    fn test_priority_user_input() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" low ".parse::<Priority>(), Ok(Priority::Low));
        assert_eq!("m".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_name_matches_ignores_case() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let task = Task::new("Buy Milk", Priority::High, date);
        assert!(task.name_matches("buy milk"));
        assert!(task.name_matches("BUY MILK "));
        assert!(!task.name_matches("buy bread"));
    }

    #[test]
    fn test_task_ref_from_user_input() {
        assert_eq!(TaskRef::from_user_input("1"), TaskRef::Position(0));
        assert_eq!(TaskRef::from_user_input("12"), TaskRef::Position(11));
        assert_eq!(TaskRef::from_user_input("0"), TaskRef::Name("0".into()));
        assert_eq!(TaskRef::from_user_input("007"), TaskRef::Name("007".into()));
        assert_eq!(TaskRef::from_user_input("+3"), TaskRef::Name("+3".into()));
        assert_eq!(
            TaskRef::from_user_input(" Pay rent "),
            TaskRef::Name("Pay rent".into())
        );
    }

    #[test]
    fn test_summary_display() {
        let s = Summary {
            total: 5,
            completed: 2,
        };
        assert_eq!(s.to_string(), "Total Tasks: 5 | Completed: 2");
        assert_eq!(s.pending(), 3);
    }
}
