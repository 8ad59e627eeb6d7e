use crate::error::AppError;
use crate::model::task::{TaskRecord, calendar_date, required_title, unix_epoch};
use crate::model::TaskStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Task on the priority board. Completion is a plain flag, independent of
/// priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "calendar_date::option")]
    pub deadline: Option<Date>,
    #[serde(default = "unix_epoch", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AppError::validation(format!(
                "priority must be low, medium or high, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: Option<Date>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    /// `Some(None)` removes the deadline.
    pub deadline: Option<Option<Date>>,
}

impl TaskRecord for PriorityTask {
    type Draft = BoardDraft;
    type Patch = BoardPatch;

    const STORE_KEY: &'static str = "tasks";
    const SORTABLE: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    fn deadline(&self) -> Option<Date> {
        self.deadline
    }

    fn from_draft(
        draft: BoardDraft,
        id: String,
        created_at: OffsetDateTime,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            title: required_title(&draft.title)?,
            description: draft.description.trim().to_string(),
            priority: draft.priority,
            completed: false,
            deadline: draft.deadline,
            created_at,
        })
    }

    fn apply_patch(&mut self, patch: BoardPatch) -> Result<(), AppError> {
        let title = patch.title.as_deref().map(required_title).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        Ok(())
    }
}
