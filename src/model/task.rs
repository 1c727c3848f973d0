use chrono::NaiveDate;
use derive_new::new;
use serde::{Deserialize, Serialize};

use super::Account;
use crate::database::Record;
use crate::time::{now, Timestamp};

/// Task priority, stored as its ordinal (1 = high, 3 = low).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn ordinal(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Priority> {
        match ordinal {
            1 => Some(Priority::High),
            2 => Some(Priority::Medium),
            3 => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => f.write_str("high"),
            Priority::Medium => f.write_str("medium"),
            Priority::Low => f.write_str("low"),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ordinal().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinal = u8::deserialize(deserializer)?;
        Priority::from_ordinal(ordinal).ok_or_else(|| {
            serde::de::Error::custom(format!("priority must be 1, 2 or 3, got {ordinal}"))
        })
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Priority,
}

/// A to-do item. Only the completion flag changes after creation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Task {
    #[new(default)]
    pub id: Record<Task>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub account: Record<Account>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Priority,
    #[new(value = "false")]
    pub completed: bool,
}

crate::table!("tasks": Task = id);

impl Task {
    pub fn from_new(account: Record<Account>, task: NewTask) -> Self {
        Self::new(
            account,
            task.title,
            task.description,
            task.due_date,
            task.priority,
        )
    }
}
