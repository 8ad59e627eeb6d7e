use crate::model::task::{calendar_date, format_date};
use crate::model::{PlannerTask, TaskRecord};
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    pub id: String,
    pub title: String,
    #[serde(with = "calendar_date")]
    pub deadline: Date,
}

/// Every overdue task found by one check, delivered as a single batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueReport {
    #[serde(with = "calendar_date")]
    pub today: Date,
    pub entries: Vec<OverdueEntry>,
}

impl OverdueReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// One line per task, `<title> (due <date>)`.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{} (due {})", entry.title, format_date(entry.deadline)))
            .collect()
    }
}

/// Tasks that are not completed and whose deadline is strictly before
/// `today`. Returns `None` when nothing is overdue.
pub fn find_overdue(tasks: &[PlannerTask], today: Date) -> Option<OverdueReport> {
    let entries: Vec<OverdueEntry> = tasks
        .iter()
        .filter(|task| !task.is_completed() && task.deadline < today)
        .map(|task| OverdueEntry {
            id: task.id.clone(),
            title: task.title.clone(),
            deadline: task.deadline,
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(OverdueReport { today, entries })
    }
}

/// Today's calendar date in the local timezone, or UTC when the offset
/// cannot be determined.
pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}
