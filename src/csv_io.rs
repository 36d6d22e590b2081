//! CSV import and export in the `Task,Deadline,Priority,Status` layout.

use crate::error::{Result, TaskError};
use crate::task::{Priority, TaskStatus};
use crate::task_store::{ImportRow, TaskStore};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use tracing::{debug, info};

pub const HEADER: [&str; 4] = ["Task", "Deadline", "Priority", "Status"];

#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    #[serde(serialize_with = "serialize_date")]
    deadline: NaiveDate,
    priority: Priority,
    status: TaskStatus,
}

fn serialize_date<S>(date: &NaiveDate, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.collect_str(&date.format("%Y-%m-%d"))
}

struct Columns {
    name: usize,
    deadline: usize,
    priority: usize,
    status: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(wanted));
        Ok(Self {
            name: find(HEADER[0]).ok_or(TaskError::MissingColumn(HEADER[0]))?,
            deadline: find(HEADER[1]).ok_or(TaskError::MissingColumn(HEADER[1]))?,
            priority: find(HEADER[2]).ok_or(TaskError::MissingColumn(HEADER[2]))?,
            status: find(HEADER[3]),
        })
    }

    fn row(&self, record: &StringRecord) -> ImportRow {
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        ImportRow {
            name: field(self.name),
            deadline: field(self.deadline),
            priority: field(self.priority),
            status: self.status.map(field),
        }
    }
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(columns.row(&record?));
    }
    debug!(rows = rows.len(), "read CSV rows");
    Ok(rows)
}

/// Bulk import: appends every row as pending. Fails as a whole on any bad row.
pub fn import_from_reader<R: Read>(store: &mut TaskStore, reader: R) -> Result<usize> {
    let rows = read_rows(reader)?;
    store.import(rows)
}

pub fn import_from_path(store: &mut TaskStore, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    info!(path = %path.display(), "importing tasks");
    import_from_reader(store, File::open(path)?)
}

/// Loads a previously exported file into a fresh store, keeping each task's
/// status. A missing file gives an empty store.
pub fn load_session(path: impl AsRef<Path>) -> Result<TaskStore> {
    let path = path.as_ref();
    let mut store = TaskStore::new();
    if !path.exists() {
        debug!(path = %path.display(), "no task file yet, starting empty");
        return Ok(store);
    }
    store.restore(read_rows(File::open(path)?)?)?;
    Ok(store)
}

pub fn export_to_writer<W: Write>(store: &TaskStore, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for task in store.tasks() {
        writer.serialize(ExportRow {
            name: &task.name,
            deadline: task.deadline,
            priority: task.priority,
            status: task.status,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_to_path(store: &TaskStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    export_to_writer(store, File::create(path)?)?;
    info!(path = %path.display(), count = store.len(), "exported tasks");
    Ok(())
}

pub fn export_to_string(store: &TaskStore) -> Result<String> {
    let mut buf = Vec::new();
    export_to_writer(store, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::new();
        store
            .add_task("Write, then edit", "2026-02-01", Priority::MEDIUM)
            .unwrap();
        store.add_task("Gym", "2026-01-15", Priority::LOW).unwrap();
        store.mark_done(1).unwrap();
        store
    }

    #[test]
    fn test_export_format() {
        let csv = export_to_string(&sample_store()).unwrap();
        assert_eq!(
            csv,
            "Task,Deadline,Priority,Status\n\
             \"Write, then edit\",2026-02-01,2,Pending\n\
             Gym,2026-01-15,3,Done\n"
        );
    }

    #[test]
    fn test_export_empty_store_has_header() {
        let csv = export_to_string(&TaskStore::new()).unwrap();
        assert_eq!(csv, "Task,Deadline,Priority,Status\n");
    }

    #[test]
    fn test_import_ignores_status_and_extra_columns() {
        let data = "Priority, Task ,Deadline,Status,Notes\n\
                    1,Pay rent,2026-03-01 00:00:00,Done,urgent\n\
                    3, Water plants ,03/05/2026,,\n";
        let mut store = TaskStore::new();
        assert_eq!(import_from_reader(&mut store, data.as_bytes()).unwrap(), 2);

        let tasks = store.tasks();
        assert_eq!(tasks[0].name, "Pay rent");
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[1].name, "Water plants");
        assert_eq!(tasks[1].deadline, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(tasks[1].priority, Priority::LOW);
    }

    #[test]
    fn test_import_missing_column() {
        let mut store = TaskStore::new();
        let err = import_from_reader(&mut store, "Task,Priority\nx,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TaskError::MissingColumn("Deadline")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_bad_priority_fails_whole_batch() {
        let data = "Task,Deadline,Priority\na,2026-01-01,1\nb,2026-01-02,5\n";
        let mut store = TaskStore::new();
        let err = import_from_reader(&mut store, data.as_bytes()).unwrap_err();
        assert!(matches!(err, TaskError::Row { row: 2, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_session_keeps_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        export_to_path(&sample_store(), &path).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.tasks(), sample_store().tasks());
    }

    #[test]
    fn test_load_session_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_session(dir.path().join("nope.csv")).unwrap();
        assert!(store.is_empty());
    }
}
