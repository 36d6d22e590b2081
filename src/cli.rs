//! One-shot commands that work on a CSV file instead of the interactive UI.

use crate::csv_io;
use crate::task::Priority;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smart-todo", version, about = "Task list with next-task suggestions")]
pub struct Cli {
    /// CSV file with Task, Deadline, Priority columns
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Path to the JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print all tasks, pending first, by priority then deadline
    List,

    /// Print the task to do next
    Suggest,

    /// Add a task and write the file back
    Add {
        /// Task name
        name: String,

        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: String,

        /// 1 = high, 2 = medium, 3 = low
        #[arg(short, long, default_value_t = 1)]
        priority: u8,
    },

    /// Mark the task at INDEX (file order, from 0) as done and write the file back
    Done { index: usize },
}

pub fn run(command: Commands, file: &Path) -> Result<()> {
    match command {
        Commands::List => run_list(file),
        Commands::Suggest => run_suggest(file),
        Commands::Add {
            name,
            deadline,
            priority,
        } => run_add(file, name, &deadline, priority),
        Commands::Done { index } => run_done(file, index),
    }
}

fn run_list(file: &Path) -> Result<()> {
    let store = csv_io::load_session(file)
        .with_context(|| format!("Failed to load tasks from {:?}", file))?;
    if store.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    println!(
        "{:>3}  {:<30} {:<10} {:>8}  {}",
        "#", "Task", "Deadline", "Priority", "Status"
    );
    for (index, task) in store.display_order() {
        println!(
            "{:>3}  {:<30} {:<10} {:>8}  {}",
            index,
            task.name,
            task.deadline.format("%Y-%m-%d"),
            task.priority,
            task.status
        );
    }
    Ok(())
}

fn run_suggest(file: &Path) -> Result<()> {
    let store = csv_io::load_session(file)
        .with_context(|| format!("Failed to load tasks from {:?}", file))?;
    println!("{}", store.suggest_task());
    Ok(())
}

fn run_add(file: &Path, name: String, deadline: &str, priority: u8) -> Result<()> {
    let mut store = csv_io::load_session(file)
        .with_context(|| format!("Failed to load tasks from {:?}", file))?;
    let priority = Priority::new(priority)?;
    store.add_task(name.as_str(), deadline, priority)?;
    csv_io::export_to_path(&store, file)
        .with_context(|| format!("Failed to write tasks to {:?}", file))?;
    println!("Task '{}' added successfully!", name);
    Ok(())
}

fn run_done(file: &Path, index: usize) -> Result<()> {
    let mut store = csv_io::load_session(file)
        .with_context(|| format!("Failed to load tasks from {:?}", file))?;
    store.mark_done(index)?;
    csv_io::export_to_path(&store, file)
        .with_context(|| format!("Failed to write tasks to {:?}", file))?;
    println!("Task #{} marked as done!", index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::parse_from([
            "smart-todo", "add", "Buy milk", "--deadline", "2026-06-01", "-p", "2", "--file", "t.csv",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("t.csv")));
        match cli.command {
            Some(Commands::Add { name, deadline, priority }) => {
                assert_eq!(name, "Buy milk");
                assert_eq!(deadline, "2026-06-01");
                assert_eq!(priority, 2);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_and_done_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.csv");

        run_add(&file, "first".to_string(), "2026-06-01", 2).unwrap();
        run_add(&file, "second".to_string(), "2026-06-02", 1).unwrap();
        run_done(&file, 0).unwrap();

        let store = csv_io::load_session(&file).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.tasks()[0].status, TaskStatus::Done);
        assert_eq!(store.tasks()[1].status, TaskStatus::Pending);
    }

    #[test]
    fn test_add_rejects_bad_priority_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.csv");
        assert!(run_add(&file, "x".to_string(), "2026-06-01", 9).is_err());
        assert!(!file.exists());
    }

    #[test]
    fn test_done_out_of_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tasks.csv");
        run_add(&file, "only".to_string(), "2026-06-01", 1).unwrap();
        let err = run_done(&file, 3).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
