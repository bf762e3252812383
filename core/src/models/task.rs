use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TaskId = uuid::Uuid;

/// Lifecycle of a booking task.
///
/// `Idle` on creation, `Running` while a retry loop owns it. `Stopped` is the
/// only externally driven transition and the state every loop leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Idle => "Idle",
            TaskStatus::Running => "Running",
            TaskStatus::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(TaskStatus::Idle),
            "Running" => Ok(TaskStatus::Running),
            "Stopped" => Ok(TaskStatus::Stopped),
            other => Err(anyhow::anyhow!("Invalid TaskStatus value: {}", other)),
        }
    }
}

/// One user-initiated attempt to claim a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingTask {
    pub id: TaskId,

    // Target
    pub space_no: String,
    pub date: NaiveDate,
    /// Start time as rendered by the site, e.g. `"10:00"`.
    pub time: String,

    // Progress
    pub attempts: u64,
    pub log: Vec<String>,

    // Lifecycle
    pub status: TaskStatus,
}

impl BookingTask {
    pub fn new(space_no: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            space_no: space_no.into(),
            date,
            time: time.into(),
            attempts: 0,
            log: Vec::new(),
            status: TaskStatus::Idle,
        }
    }

    /// `YYYY-MM-DD`, the format the site expects in `use_date`.
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Label reported for a successful claim.
    pub fn slot_label(&self) -> String {
        format!("{} {}", self.date_str(), self.time)
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }
}
