//! Persistent storage for projects and tasks.
//!
//! [`TaskStore`] is the storage collaborator of the workflow engine. Writes
//! to a task are optimistic: every write bumps `Task::version`, and a write
//! carrying a stale version fails with [`StoreError::Conflict`]. Two
//! transitions validated against the same snapshot can therefore never both
//! commit. Projects are versioned the same way.

mod file;
mod memory;
mod tables;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::workflow::{NewProject, NewTask, Project, Task, TaskStatus};

/// Optional filters for task listings. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub project_id: Option<u64>,
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self.project_id.is_none_or(|id| task.project_id == id)
            && self
                .assignee
                .as_deref()
                .is_none_or(|who| task.assignee.as_deref() == Some(who))
    }
}

pub trait TaskStore {
    fn insert_project(&self, project: NewProject) -> Result<Project, StoreError>;

    fn project(&self, id: u64) -> Result<Project, StoreError>;

    fn projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Replace the editable fields of a project; `project.version` must match
    /// the stored version.
    fn save_project(&self, project: &Project) -> Result<Project, StoreError>;

    /// Remove a project together with its tasks, returning the removed tasks.
    fn delete_project(&self, id: u64, expected_version: u64) -> Result<Vec<Task>, StoreError>;

    /// New tasks always start as `PENDENTE` with version 0.
    fn insert_task(&self, task: NewTask) -> Result<Task, StoreError>;

    fn task(&self, id: u64) -> Result<Task, StoreError>;

    /// Tasks matching `filter`, newest first.
    fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Replace the editable fields of a task. The stored status is kept;
    /// `task.version` must match the stored version.
    fn save_task(&self, task: &Task) -> Result<Task, StoreError>;

    /// Set the status of a task if its stored version is still
    /// `expected_version`.
    fn commit_status(
        &self,
        id: u64,
        expected_version: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError>;

    fn delete_task(&self, id: u64, expected_version: u64) -> Result<Task, StoreError>;
}

impl<S: TaskStore + ?Sized> TaskStore for &S {
    fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        (**self).insert_project(project)
    }

    fn project(&self, id: u64) -> Result<Project, StoreError> {
        (**self).project(id)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        (**self).projects()
    }

    fn save_project(&self, project: &Project) -> Result<Project, StoreError> {
        (**self).save_project(project)
    }

    fn delete_project(&self, id: u64, expected_version: u64) -> Result<Vec<Task>, StoreError> {
        (**self).delete_project(id, expected_version)
    }

    fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        (**self).insert_task(task)
    }

    fn task(&self, id: u64) -> Result<Task, StoreError> {
        (**self).task(id)
    }

    fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        (**self).tasks(filter)
    }

    fn save_task(&self, task: &Task) -> Result<Task, StoreError> {
        (**self).save_task(task)
    }

    fn commit_status(
        &self,
        id: u64,
        expected_version: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        (**self).commit_status(id, expected_version, status)
    }

    fn delete_task(&self, id: u64, expected_version: u64) -> Result<Task, StoreError> {
        (**self).delete_task(id, expected_version)
    }
}
