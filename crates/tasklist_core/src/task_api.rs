use crate::error::AppError;
use crate::model::task::parse_date;
use crate::model::{
    BoardDraft, BoardPatch, PlannerDraft, PlannerPatch, PlannerTask, Priority, PriorityTask,
    TaskRecord, TaskStatus,
};
use crate::overdue::{OverdueReport, find_overdue};
use crate::storage::KeyValueStore;
use crate::store::Store;
use crate::view::{Stats, ViewQuery, project};
use time::Date;

#[derive(Debug, Clone)]
pub struct ListResult<R> {
    pub tasks: Vec<R>,
    pub stats: Stats,
}

/// A freshly opened planner and the result of its one load-time overdue
/// check.
#[derive(Debug)]
pub struct PlannerStartup<K: KeyValueStore> {
    pub store: Store<PlannerTask, K>,
    pub overdue: Option<OverdueReport>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub clear_deadline: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlannerEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
}

pub fn open_board<K: KeyValueStore>(kv: K) -> Store<PriorityTask, K> {
    Store::open(kv)
}

pub fn open_planner<K: KeyValueStore>(kv: K, today: Date) -> PlannerStartup<K> {
    let store = Store::open(kv);
    let overdue = find_overdue(store.tasks(), today);
    if let Some(report) = overdue.as_ref() {
        log::info!("{} overdue task(s) at load", report.len());
    }
    PlannerStartup { store, overdue }
}

pub fn add_board_task<K: KeyValueStore>(
    store: &mut Store<PriorityTask, K>,
    title: &str,
    priority: Option<&str>,
    deadline: Option<&str>,
    description: Option<&str>,
) -> Result<PriorityTask, AppError> {
    let priority = priority
        .map(str::parse::<Priority>)
        .transpose()?
        .unwrap_or_default();
    let deadline = optional_date(deadline)?;

    store.create(BoardDraft {
        title: title.to_string(),
        description: description.unwrap_or_default().to_string(),
        priority,
        deadline,
    })
}

pub fn edit_board_task<K: KeyValueStore>(
    store: &mut Store<PriorityTask, K>,
    id: &str,
    edit: BoardEdit,
) -> Result<PriorityTask, AppError> {
    let id = required_id(id)?;
    if edit.clear_deadline && edit.deadline.is_some() {
        return Err(AppError::validation(
            "deadline and clear_deadline cannot be combined",
        ));
    }

    let deadline = if edit.clear_deadline {
        Some(None)
    } else {
        edit.deadline
            .as_deref()
            .map(|raw| parse_date(raw).map(Some))
            .transpose()?
    };
    let patch = BoardPatch {
        title: edit.title,
        description: edit.description,
        priority: edit.priority.as_deref().map(str::parse).transpose()?,
        completed: None,
        deadline,
    };

    store.update(id, patch)
}

pub fn toggle_board_task<K: KeyValueStore>(
    store: &mut Store<PriorityTask, K>,
    id: &str,
) -> Result<PriorityTask, AppError> {
    let id = required_id(id)?;
    store.toggle_completed(id)
}

pub fn add_planner_task<K: KeyValueStore>(
    store: &mut Store<PlannerTask, K>,
    title: &str,
    description: Option<&str>,
    deadline: &str,
    status: Option<&str>,
) -> Result<PlannerTask, AppError> {
    let status = status
        .map(str::parse::<TaskStatus>)
        .transpose()?
        .unwrap_or_default();
    let deadline = optional_date(Some(deadline))?;

    store.create(PlannerDraft {
        title: title.to_string(),
        description: description.unwrap_or_default().to_string(),
        deadline,
        status,
    })
}

pub fn edit_planner_task<K: KeyValueStore>(
    store: &mut Store<PlannerTask, K>,
    id: &str,
    edit: PlannerEdit,
) -> Result<PlannerTask, AppError> {
    let id = required_id(id)?;
    let deadline = match edit.deadline.as_deref() {
        Some(raw) if raw.trim().is_empty() => {
            return Err(AppError::validation("deadline is required"));
        }
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let patch = PlannerPatch {
        title: edit.title,
        description: edit.description,
        deadline,
        status: edit.status.as_deref().map(str::parse).transpose()?,
    };

    store.update(id, patch)
}

pub fn set_planner_status<K: KeyValueStore>(
    store: &mut Store<PlannerTask, K>,
    id: &str,
    status: &str,
) -> Result<PlannerTask, AppError> {
    let id = required_id(id)?;
    let status = status.parse::<TaskStatus>()?;
    store.set_status(id, status)
}

/// Deletes a task. An unknown id is not an error and returns `None`.
pub fn delete_task<R: TaskRecord, K: KeyValueStore>(
    store: &mut Store<R, K>,
    id: &str,
) -> Result<Option<R>, AppError> {
    let id = required_id(id)?;
    store.delete(id)
}

pub fn clear_tasks<R: TaskRecord, K: KeyValueStore>(
    store: &mut Store<R, K>,
) -> Result<usize, AppError> {
    store.clear()
}

pub fn get_task<R: TaskRecord, K: KeyValueStore>(
    store: &Store<R, K>,
    id: &str,
) -> Result<R, AppError> {
    let id = required_id(id)?;
    store.get(id).cloned()
}

pub fn list_tasks<R: TaskRecord, K: KeyValueStore>(
    store: &Store<R, K>,
    query: &ViewQuery,
) -> ListResult<R> {
    ListResult {
        tasks: project(store.tasks(), query).into_iter().cloned().collect(),
        stats: Stats::from_tasks(store.tasks()),
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(trimmed)
}

fn optional_date(raw: Option<&str>) -> Result<Option<Date>, AppError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value).map(Some),
        _ => Ok(None),
    }
}
