use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task index {index} is out of range (store has {len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("malformed date: {0:?}")]
    MalformedDate(String),

    #[error("invalid priority {0} (expected 1, 2 or 3)")]
    InvalidPriority(i64),

    #[error("malformed priority: {0:?}")]
    MalformedPriority(String),

    #[error("unknown status: {0:?}")]
    MalformedStatus(String),

    #[error("task name must not be empty")]
    EmptyName,

    #[error("missing column {0:?} in CSV header")]
    MissingColumn(&'static str),

    /// An imported row failed to validate; `row` is the 1-based data row.
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<TaskError>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
