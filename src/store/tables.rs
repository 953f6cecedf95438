use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::TaskFilter;
use crate::error::StoreError;
use crate::workflow::{NewProject, NewTask, Project, Task, TaskStatus};

/// The whole database: both tables plus id counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    next_project_id: u64,
    #[serde(default)]
    next_task_id: u64,
    #[serde(default)]
    projects: BTreeMap<u64, Project>,
    #[serde(default)]
    tasks: BTreeMap<u64, Task>,
}

impl Tables {
    pub(crate) fn insert_project(&mut self, new: NewProject) -> Project {
        self.next_project_id += 1;
        let project = Project {
            id: self.next_project_id,
            name: new.name,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            version: 0,
        };
        self.projects.insert(project.id, project.clone());
        project
    }

    pub(crate) fn project(&self, id: u64) -> Result<Project, StoreError> {
        self.projects
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProjectNotFound(id))
    }

    pub(crate) fn projects(&self) -> Vec<Project> {
        self.projects.values().cloned().collect()
    }

    pub(crate) fn save_project(&mut self, project: &Project) -> Result<Project, StoreError> {
        let stored = self.checked_project_mut(project.id, project.version)?;
        stored.name = project.name.clone();
        stored.description = project.description.clone();
        stored.start_date = project.start_date;
        stored.end_date = project.end_date;
        stored.version += 1;
        Ok(stored.clone())
    }

    /// Remove a project and every task in it. Returns the removed tasks.
    pub(crate) fn delete_project(
        &mut self,
        id: u64,
        expected_version: u64,
    ) -> Result<Vec<Task>, StoreError> {
        self.checked_project_mut(id, expected_version)?;
        self.projects.remove(&id);
        let (removed, kept): (BTreeMap<u64, Task>, _) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|(_, task)| task.project_id == id);
        self.tasks = kept;
        Ok(removed.into_values().collect())
    }

    pub(crate) fn insert_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        if !self.projects.contains_key(&new.project_id) {
            return Err(StoreError::ProjectNotFound(new.project_id));
        }
        self.next_task_id += 1;
        let task = Task {
            id: self.next_task_id,
            project_id: new.project_id,
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            assignee: new.assignee,
            due_date: new.due_date,
            created_at: Utc::now(),
            version: 0,
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub(crate) fn task(&self, id: u64) -> Result<Task, StoreError> {
        self.tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    pub(crate) fn tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }

    pub(crate) fn save_task(&mut self, task: &Task) -> Result<Task, StoreError> {
        let stored = self.checked_mut(task.id, task.version)?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.assignee = task.assignee.clone();
        stored.due_date = task.due_date;
        stored.version += 1;
        Ok(stored.clone())
    }

    pub(crate) fn commit_status(
        &mut self,
        id: u64,
        expected_version: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let stored = self.checked_mut(id, expected_version)?;
        stored.status = status;
        stored.version += 1;
        Ok(stored.clone())
    }

    pub(crate) fn delete_task(&mut self, id: u64, expected_version: u64) -> Result<Task, StoreError> {
        self.checked_mut(id, expected_version)?;
        self.tasks.remove(&id).ok_or(StoreError::TaskNotFound(id))
    }

    fn checked_project_mut(
        &mut self,
        id: u64,
        expected_version: u64,
    ) -> Result<&mut Project, StoreError> {
        let stored = self
            .projects
            .get_mut(&id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        if stored.version != expected_version {
            return Err(StoreError::ProjectConflict {
                project_id: id,
                expected: expected_version,
                found: stored.version,
            });
        }
        Ok(stored)
    }

    fn checked_mut(&mut self, id: u64, expected_version: u64) -> Result<&mut Task, StoreError> {
        let stored = self.tasks.get_mut(&id).ok_or(StoreError::TaskNotFound(id))?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                task_id: id,
                expected: expected_version,
                found: stored.version,
            });
        }
        Ok(stored)
    }
}
