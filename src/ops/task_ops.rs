use chrono::{Local, NaiveDate};

use crate::model::task::{Priority, Summary, Task, TaskDraft, TaskRef};
use crate::parse::deadline::{DateError, parse_deadline};
use crate::parse::task_parser::FIELD_DELIMITER;

/// Input rejected before it reaches the store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("task name cannot contain '|' or line breaks: {0}")]
    InvalidName(String),
    #[error(transparent)]
    InvalidDeadline(#[from] DateError),
    #[error("deadline {deadline} has already passed (today is {today}), please enter a future date")]
    DeadlinePassed { deadline: NaiveDate, today: NaiveDate },
}

/// Error type for task store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a task named '{0}' already exists")]
    DuplicateName(String),
    #[error("task not found: {0}")]
    NotFound(String),
}

/// Today's date on the local clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Validate a draft into its trimmed name and parsed deadline.
///
/// A deadline of `today` is accepted; only dates strictly before it fail.
pub fn validate_draft(draft: &TaskDraft, today: NaiveDate) -> Result<(String, NaiveDate), ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.contains(FIELD_DELIMITER) || name.contains(['\n', '\r']) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }

    let deadline = parse_deadline(draft.deadline.trim())?;
    if deadline < today {
        return Err(ValidationError::DeadlinePassed { deadline, today });
    }

    Ok((name.to_string(), deadline))
}

/// Ordered, in-memory collection of tasks.
///
/// All mutation goes through the methods below. Failed operations leave the
/// sequence untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Wrap tasks loaded from disk, keeping their order as-is
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TaskStore { tasks }
    }

    /// Read-only view of the tasks in their current order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task. A position past the end of the list matches a task
    /// named by that number instead.
    pub fn get(&self, task_ref: &TaskRef) -> Option<&Task> {
        self.position(task_ref).map(|idx| &self.tasks[idx])
    }

    /// Total and completed counts
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.completed).count(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a new pending task, then re-sort by (completed, deadline).
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        self.add_as_of(draft, today())
    }

    /// `add` with an explicit reference date for the past-deadline check
    pub fn add_as_of(&mut self, draft: TaskDraft, today: NaiveDate) -> Result<Task, TaskError> {
        let (name, deadline) = validate_draft(&draft, today)?;
        if self.tasks.iter().any(|t| t.name_matches(&name)) {
            return Err(TaskError::DuplicateName(name));
        }

        let task = Task::new(name, draft.priority, deadline);
        tracing::debug!(name = %task.name, priority = %task.priority, %deadline, "adding task");
        self.tasks.push(task.clone());
        self.sort_pending_first();
        Ok(task)
    }

    /// Replace a task's name, priority and deadline, then re-sort by
    /// (completed, deadline). Name uniqueness is not re-checked.
    pub fn edit(&mut self, task_ref: &TaskRef, draft: TaskDraft) -> Result<(), TaskError> {
        self.edit_as_of(task_ref, draft, today())
    }

    /// `edit` with an explicit reference date for the past-deadline check
    pub fn edit_as_of(
        &mut self,
        task_ref: &TaskRef,
        draft: TaskDraft,
        today: NaiveDate,
    ) -> Result<(), TaskError> {
        let idx = self.resolve(task_ref)?;
        let (name, deadline) = validate_draft(&draft, today)?;

        let task = &mut self.tasks[idx];
        tracing::debug!(from = %task.name, to = %name, "editing task");
        task.name = name;
        task.priority = draft.priority;
        task.deadline = deadline;
        self.sort_pending_first();
        Ok(())
    }

    /// Delete a task and hand it back
    pub fn remove(&mut self, task_ref: &TaskRef) -> Result<Task, TaskError> {
        let idx = self.resolve(task_ref)?;
        let task = self.tasks.remove(idx);
        tracing::debug!(name = %task.name, "removed task");
        Ok(task)
    }

    /// Mark a task completed and move it to the end. Other tasks keep their
    /// relative order.
    pub fn mark_complete(&mut self, task_ref: &TaskRef) -> Result<(), TaskError> {
        let idx = self.resolve(task_ref)?;
        let mut task = self.tasks.remove(idx);
        task.completed = true;
        tracing::debug!(name = %task.name, "completed task");
        self.tasks.push(task);
        Ok(())
    }

    /// Stable sort by deadline only. Completed tasks are not pinned.
    pub fn sort_by_deadline(&mut self) {
        self.tasks.sort_by_key(|t| t.deadline);
    }

    /// Stable sort by priority rank only. Completed tasks are not pinned.
    pub fn sort_by_priority(&mut self) {
        self.tasks.sort_by_key(|t| t.priority.rank());
    }

    /// The ordering applied after add and edit: pending before completed,
    /// then earliest deadline first.
    fn sort_pending_first(&mut self) {
        self.tasks.sort_by_key(|t| (t.completed, t.deadline));
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    fn position(&self, task_ref: &TaskRef) -> Option<usize> {
        match task_ref {
            TaskRef::Position(idx) if *idx < self.tasks.len() => Some(*idx),
            // Out of range: the number may be a task's name
            TaskRef::Position(idx) => {
                let name = (idx + 1).to_string();
                self.tasks.iter().position(|t| t.name_matches(&name))
            }
            TaskRef::Name(name) => self.tasks.iter().position(|t| t.name_matches(name)),
        }
    }

    fn resolve(&self, task_ref: &TaskRef) -> Result<usize, TaskError> {
        self.position(task_ref)
            .ok_or_else(|| TaskError::NotFound(task_ref.to_string()))
    }
}

/// Count of pending tasks per priority, highest first
pub fn pending_by_priority(tasks: &[Task]) -> [(Priority, usize); 3] {
    Priority::ALL.map(|p| {
        let count = tasks
            .iter()
            .filter(|t| !t.completed && t.priority == p)
            .count();
        (p, count)
    })
}
