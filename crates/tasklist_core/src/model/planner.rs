use crate::error::AppError;
use crate::model::task::{TaskRecord, calendar_date, required_title};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Task in the deadline planner. The status drives completion accounting and
/// the deadline is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "calendar_date")]
    pub deadline: Date,
    pub status: TaskStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    /// Any status string this build does not recognise. Such records still
    /// load, count as not completed and sort after every known status.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }

    /// Position in the status sort: completed first, pending last.
    pub fn rank(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::InProgress => 1,
            Self::Pending => 2,
            Self::Unknown => 3,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" | "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(AppError::validation(format!(
                "status must be pending, inprogress or completed, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlannerDraft {
    pub title: String,
    pub description: String,
    pub deadline: Option<Date>,
    pub status: TaskStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlannerPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<Date>,
    pub status: Option<TaskStatus>,
}

impl TaskRecord for PlannerTask {
    type Draft = PlannerDraft;
    type Patch = PlannerPatch;

    const STORE_KEY: &'static str = "stm_tasks";
    const SORTABLE: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn deadline(&self) -> Option<Date> {
        Some(self.deadline)
    }

    fn from_draft(
        draft: PlannerDraft,
        id: String,
        created_at: OffsetDateTime,
    ) -> Result<Self, AppError> {
        let title = required_title(&draft.title)?;
        let deadline = draft
            .deadline
            .ok_or_else(|| AppError::validation("deadline is required"))?;

        Ok(Self {
            id,
            title,
            description: draft.description.trim().to_string(),
            deadline,
            status: draft.status,
            created_at,
        })
    }

    fn apply_patch(&mut self, patch: PlannerPatch) -> Result<(), AppError> {
        let title = patch.title.as_deref().map(required_title).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }
}
