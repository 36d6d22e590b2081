use crate::error::{Result, TaskError};
use crate::task::{IntoDeadline, Priority, Task, TaskStatus};
use chrono::{Local, NaiveDate};
use std::fmt;
use tracing::{debug, info};

/// One record of a bulk import, still in raw text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub name: String,
    pub deadline: String,
    pub priority: String,
    /// Ignored by [`TaskStore::import`]; honored by [`TaskStore::restore`].
    pub status: Option<String>,
}

impl ImportRow {
    pub fn new(
        name: impl Into<String>,
        deadline: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            deadline: deadline.into(),
            priority: priority.into(),
            status: None,
        }
    }

    fn into_task(self, keep_status: bool) -> Result<Task> {
        let name = validate_name(self.name)?;
        let deadline = self.deadline.as_str().into_deadline()?;
        let priority = self.priority.parse::<Priority>()?;
        let mut task = Task::new(name, deadline, priority);
        if keep_status {
            if let Some(status) = self.status.as_deref() {
                task.status = status.parse()?;
            }
        }
        Ok(task)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTask {
    /// Storage index, usable with [`TaskStore::mark_done`].
    pub index: usize,
    pub name: String,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    AllCompleted,
    Next(NextTask),
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::AllCompleted => write!(f, "All tasks completed!"),
            Suggestion::Next(next) => write!(
                f,
                "Next Task: {} | Deadline: {} | Priority: {}",
                next.name,
                next.deadline.format("%Y-%m-%d"),
                next.priority
            ),
        }
    }
}

/// The session's task list, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_done()).count()
    }

    pub fn done_count(&self) -> usize {
        self.tasks.len() - self.pending_count()
    }

    /// Appends a pending task. The store is untouched on error.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        deadline: impl IntoDeadline,
        priority: Priority,
    ) -> Result<()> {
        let name = validate_name(name.into())?;
        let deadline = deadline.into_deadline()?;
        debug!(%name, %deadline, %priority, "adding task");
        self.tasks.push(Task::new(name, deadline, priority));
        Ok(())
    }

    /// Marks the task at `index` (storage order) as done. Marking a finished
    /// task again is a no-op.
    pub fn mark_done(&mut self, index: usize) -> Result<()> {
        let len = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(TaskError::IndexOutOfRange { index, len })?;
        task.status = TaskStatus::Done;
        debug!(index, name = %task.name, "task marked done");
        Ok(())
    }

    pub fn suggest_task(&self) -> Suggestion {
        self.suggest_task_on(Local::now().date_naive())
    }

    /// Picks the pending task with the best priority, breaking ties by the
    /// fewest days left. Equal keys keep insertion order.
    pub fn suggest_task_on(&self, today: NaiveDate) -> Suggestion {
        let mut pending: Vec<(usize, &Task, i64)> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_done())
            .map(|(i, t)| (i, t, t.days_left(today)))
            .collect();
        pending.sort_by_key(|&(_, task, days_left)| (task.priority, days_left));

        match pending.first() {
            None => Suggestion::AllCompleted,
            Some(&(index, task, days_left)) => Suggestion::Next(NextTask {
                index,
                name: task.name.clone(),
                deadline: task.deadline,
                priority: task.priority,
                days_left,
            }),
        }
    }

    /// Appends every row as a pending task, ignoring any status column.
    /// All rows are validated first, so a single bad row leaves the store
    /// as it was.
    pub fn import<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let parsed = parse_rows(rows, false)?;
        let count = parsed.len();
        self.tasks.extend(parsed);
        info!(count, total = self.tasks.len(), "imported tasks");
        Ok(count)
    }

    /// Like [`TaskStore::import`] but keeps each row's status. Used to reload
    /// a file this program exported earlier.
    pub fn restore<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let parsed = parse_rows(rows, true)?;
        let count = parsed.len();
        self.tasks.extend(parsed);
        info!(count, total = self.tasks.len(), "restored tasks");
        Ok(count)
    }

    /// Tasks ordered for display by (status, priority, deadline), each paired
    /// with its storage index.
    pub fn display_order(&self) -> Vec<(usize, &Task)> {
        let mut rows: Vec<(usize, &Task)> = self.tasks.iter().enumerate().collect();
        rows.sort_by_key(|(_, t)| (t.status, t.priority, t.deadline));
        rows
    }

    pub fn days_left_report(&self, today: NaiveDate) -> Vec<(&str, i64)> {
        self.tasks
            .iter()
            .map(|t| (t.name.as_str(), t.days_left(today)))
            .collect()
    }
}

/// Names are stored trimmed so they survive a CSV round trip unchanged.
fn validate_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyName);
    }
    if trimmed.len() == name.len() {
        return Ok(name);
    }
    Ok(trimmed.to_string())
}

fn parse_rows<I>(rows: I, keep_status: bool) -> Result<Vec<Task>>
where
    I: IntoIterator<Item = ImportRow>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_task(keep_status).map_err(|e| TaskError::Row {
                row: i + 1,
                source: Box::new(e),
            })
        })
        .collect()
}
