//! Smart To-Do: a single-user task list that suggests what to do next.

pub mod app;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod task;
pub mod task_store;
pub mod ui;

pub use error::{Result, TaskError};
pub use task::{parse_deadline, Priority, Task, TaskStatus};
pub use task_store::{ImportRow, NextTask, Suggestion, TaskStore};
