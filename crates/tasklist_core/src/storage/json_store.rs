use crate::error::AppError;
use crate::model::TaskRecord;
use crate::storage::kv::KeyValueStore;
use std::collections::HashSet;

/// Reads the task sequence stored under `R::STORE_KEY`.
///
/// Never fails: an absent key, an empty value or content that is not a JSON
/// array all load as an empty list. Records inside the array are decoded one
/// by one and only the unreadable ones are dropped.
pub fn load_tasks<R, K>(kv: &K) -> Vec<R>
where
    R: TaskRecord,
    K: KeyValueStore + ?Sized,
{
    let raw = match kv.get(R::STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::warn!("could not read '{}', starting empty: {err}", R::STORE_KEY);
            return Vec::new();
        }
    };

    if raw.trim().is_empty() {
        return Vec::new();
    }

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(err) => {
            log::warn!("malformed data under '{}', starting empty: {err}", R::STORE_KEY);
            return Vec::new();
        }
    };

    let tasks = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<R>(record) {
            Ok(task) => Some(task),
            Err(err) => {
                log::warn!(
                    "dropping unreadable record {index} under '{}': {err}",
                    R::STORE_KEY
                );
                None
            }
        })
        .collect();
    drop_duplicate_ids(tasks)
}

/// Writes the full task sequence under `R::STORE_KEY`.
pub fn save_tasks<R, K>(kv: &mut K, tasks: &[R]) -> Result<(), AppError>
where
    R: TaskRecord,
    K: KeyValueStore + ?Sized,
{
    let content =
        serde_json::to_string_pretty(tasks).map_err(|err| AppError::persistence(err.to_string()))?;
    kv.set(R::STORE_KEY, &content).map_err(|err| match err {
        AppError::Persistence(_) => err,
        other => AppError::persistence(other.message()),
    })?;
    log::debug!("saved {} task(s) under '{}'", tasks.len(), R::STORE_KEY);
    Ok(())
}

fn drop_duplicate_ids<R: TaskRecord>(tasks: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .into_iter()
        .filter(|task| {
            let fresh = seen.insert(task.id().to_string());
            if !fresh {
                log::warn!("dropping stored task with duplicate id {}", task.id());
            }
            fresh
        })
        .collect()
}
