use crate::error::AppError;
use crate::model::task::new_task_id;
use crate::model::{
    BoardPatch, PlannerPatch, PlannerTask, PriorityTask, TaskRecord, TaskStatus,
};
use crate::storage::KeyValueStore;
use crate::storage::json_store;
use time::OffsetDateTime;

/// Authoritative in-memory task sequence for one session.
///
/// Every successful mutation writes the whole sequence to the backing medium
/// exactly once before returning. If that write fails the mutation is kept in
/// memory, the store is marked dirty and the caller gets
/// [`AppError::Persistence`]; [`Store::persist`] retries the write.
#[derive(Debug)]
pub struct Store<R: TaskRecord, K: KeyValueStore> {
    tasks: Vec<R>,
    kv: K,
    dirty: bool,
}

impl<R: TaskRecord, K: KeyValueStore> Store<R, K> {
    pub fn open(kv: K) -> Self {
        let tasks = json_store::load_tasks::<R, K>(&kv);
        log::debug!("loaded {} task(s) from '{}'", tasks.len(), R::STORE_KEY);
        Self {
            tasks,
            kv,
            dirty: false,
        }
    }

    pub fn tasks(&self) -> &[R] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&R, AppError> {
        self.tasks
            .iter()
            .find(|task| task.id() == id)
            .ok_or_else(|| AppError::task_not_found(id))
    }

    /// True while the medium holds an older snapshot than memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn backend(&self) -> &K {
        &self.kv
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn create(&mut self, draft: R::Draft) -> Result<R, AppError> {
        let task = R::from_draft(draft, self.unused_id(), OffsetDateTime::now_utc())?;
        self.tasks.push(task.clone());
        log::debug!("created task {}", task.id());
        self.commit()?;
        Ok(task)
    }

    pub fn update(&mut self, id: &str, patch: R::Patch) -> Result<R, AppError> {
        let index = self.position(id)?;
        self.tasks[index].apply_patch(patch)?;
        let updated = self.tasks[index].clone();
        log::debug!("updated task {id}");
        self.commit()?;
        Ok(updated)
    }

    /// Removes the task if present. Deleting an unknown id is a no-op and
    /// does not touch the medium.
    pub fn delete(&mut self, id: &str) -> Result<Option<R>, AppError> {
        let Some(index) = self.tasks.iter().position(|task| task.id() == id) else {
            log::debug!("delete of unknown task {id} ignored");
            return Ok(None);
        };

        let removed = self.tasks.remove(index);
        log::debug!("deleted task {id}");
        self.commit()?;
        Ok(Some(removed))
    }

    /// Empties the store and returns how many tasks were removed.
    pub fn clear(&mut self) -> Result<usize, AppError> {
        let removed = self.tasks.len();
        self.tasks.clear();
        log::debug!("cleared {removed} task(s)");
        self.commit()?;
        Ok(removed)
    }

    /// Writes the current sequence again, typically after a failed write.
    pub fn persist(&mut self) -> Result<(), AppError> {
        self.commit()
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or_else(|| AppError::task_not_found(id))
    }

    fn unused_id(&self) -> String {
        loop {
            let id = new_task_id();
            if self.tasks.iter().all(|task| task.id() != id) {
                return id;
            }
        }
    }

    fn commit(&mut self) -> Result<(), AppError> {
        match json_store::save_tasks(&mut self.kv, &self.tasks) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                log::warn!("changes kept in memory only: {err}");
                Err(err)
            }
        }
    }
}

impl<K: KeyValueStore> Store<PlannerTask, K> {
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<PlannerTask, AppError> {
        self.update(
            id,
            PlannerPatch {
                status: Some(status),
                ..PlannerPatch::default()
            },
        )
    }
}

impl<K: KeyValueStore> Store<PriorityTask, K> {
    pub fn toggle_completed(&mut self, id: &str) -> Result<PriorityTask, AppError> {
        let completed = self.get(id)?.completed;
        self.set_completed(id, !completed)
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> Result<PriorityTask, AppError> {
        self.update(
            id,
            BoardPatch {
                completed: Some(completed),
                ..BoardPatch::default()
            },
        )
    }
}
