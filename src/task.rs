use crate::error::{Result, TaskError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::{fmt, str::FromStr};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Urgency class of a task. Lower is more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const HIGH: Priority = Priority(1);
    pub const MEDIUM: Priority = Priority(2);
    pub const LOW: Priority = Priority(3);

    pub fn new(value: u8) -> Result<Self> {
        match value {
            1..=3 => Ok(Self(value)),
            other => Err(TaskError::InvalidPriority(i64::from(other))),
        }
    }

    /// Cycles 1 -> 2 -> 3 -> 1, for the form selector.
    pub fn next(self) -> Self {
        Self(self.0 % 3 + 1)
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "High",
            2 => "Medium",
            _ => "Low",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.0
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let value: i64 = s
            .parse()
            .map_err(|_| TaskError::MalformedPriority(s.to_string()))?;
        u8::try_from(value)
            .map_err(|_| TaskError::InvalidPriority(value))
            .and_then(Self::new)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a task. Declaration order is display order: pending first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            other => Err(TaskError::MalformedStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(name: impl Into<String>, deadline: NaiveDate, priority: Priority) -> Self {
        Self {
            name: name.into(),
            deadline,
            priority,
            status: TaskStatus::Pending,
        }
    }

    /// Signed days until the deadline; negative when overdue.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Anything `add_task` accepts as a deadline.
pub trait IntoDeadline {
    fn into_deadline(self) -> Result<NaiveDate>;
}

impl IntoDeadline for NaiveDate {
    fn into_deadline(self) -> Result<NaiveDate> {
        Ok(self)
    }
}

impl IntoDeadline for &str {
    fn into_deadline(self) -> Result<NaiveDate> {
        parse_deadline(self)
    }
}

/// Parses a deadline into a calendar date, dropping any time of day.
pub fn parse_deadline(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| TaskError::MalformedDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_priority_domain() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(4).is_err());
        assert_eq!(Priority::new(2).unwrap(), Priority::MEDIUM);
        assert!(matches!(
            "7".parse::<Priority>(),
            Err(TaskError::InvalidPriority(7))
        ));
        assert!(matches!(
            "-1".parse::<Priority>(),
            Err(TaskError::InvalidPriority(-1))
        ));
        assert!(matches!(
            "high".parse::<Priority>(),
            Err(TaskError::MalformedPriority(_))
        ));
        assert_eq!(" 3 ".parse::<Priority>().unwrap(), Priority::LOW);
    }

    #[test]
    fn test_priority_cycle() {
        assert_eq!(Priority::HIGH.next(), Priority::MEDIUM);
        assert_eq!(Priority::MEDIUM.next(), Priority::LOW);
        assert_eq!(Priority::LOW.next(), Priority::HIGH);
        assert_eq!(Priority::LOW.label(), "Low");
    }

    #[test]
    fn test_status_order_pending_first() {
        assert!(TaskStatus::Pending < TaskStatus::Done);
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_parse_deadline_formats() {
        let want = ymd(2026, 3, 9);
        assert_eq!(parse_deadline("2026-03-09").unwrap(), want);
        assert_eq!(parse_deadline(" 2026/03/09 ").unwrap(), want);
        assert_eq!(parse_deadline("03/09/2026").unwrap(), want);
        assert_eq!(parse_deadline("2026-03-09 17:45:00").unwrap(), want);
        assert_eq!(parse_deadline("2026-03-09T23:59:59").unwrap(), want);
        assert_eq!(parse_deadline("2026-03-09T08:00:00+02:00").unwrap(), want);
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        assert!(matches!(
            parse_deadline("next tuesday"),
            Err(TaskError::MalformedDate(s)) if s == "next tuesday"
        ));
        assert!(parse_deadline("2026-02-30").is_err());
        assert!(parse_deadline("").is_err());
    }

    #[test]
    fn test_days_left() {
        let task = Task::new("ship", ymd(2026, 1, 10), Priority::HIGH);
        assert_eq!(task.days_left(ymd(2026, 1, 3)), 7);
        assert_eq!(task.days_left(ymd(2026, 1, 10)), 0);
        assert_eq!(task.days_left(ymd(2026, 1, 12)), -2);
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
