use std::sync::{Mutex, MutexGuard};

use super::tables::Tables;
use super::{TaskFilter, TaskStore};
use crate::error::StoreError;
use crate::workflow::{NewProject, NewTask, Project, Task, TaskStatus};

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl TaskStore for MemoryStore {
    fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        Ok(self.lock()?.insert_project(project))
    }

    fn project(&self, id: u64) -> Result<Project, StoreError> {
        self.lock()?.project(id)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.lock()?.projects())
    }

    fn save_project(&self, project: &Project) -> Result<Project, StoreError> {
        self.lock()?.save_project(project)
    }

    fn delete_project(&self, id: u64, expected_version: u64) -> Result<Vec<Task>, StoreError> {
        self.lock()?.delete_project(id, expected_version)
    }

    fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        self.lock()?.insert_task(task)
    }

    fn task(&self, id: u64) -> Result<Task, StoreError> {
        self.lock()?.task(id)
    }

    fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(self.lock()?.tasks(filter))
    }

    fn save_task(&self, task: &Task) -> Result<Task, StoreError> {
        self.lock()?.save_task(task)
    }

    fn commit_status(
        &self,
        id: u64,
        expected_version: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        self.lock()?.commit_status(id, expected_version, status)
    }

    fn delete_task(&self, id: u64, expected_version: u64) -> Result<Task, StoreError> {
        self.lock()?.delete_task(id, expected_version)
    }
}
