//! Application service tying validation, storage, the workflow engine and the
//! audit sink together.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::audit::AuditSink;
use crate::error::ServiceError;
use crate::store::{TaskFilter, TaskStore};
use crate::validation;
use crate::workflow::{
    Actor, NewProject, NewTask, Project, ProjectUpdate, Task, TaskStatus, TaskUpdate,
    TransitionRecord, WorkflowEngine,
};

/// A project together with how many tasks it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: Project,
    pub task_count: usize,
}

pub struct TaskService<S, A> {
    store: S,
    audit: A,
}

impl<S: TaskStore, A: AuditSink> TaskService<S, A> {
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub fn create_project(
        &self,
        input: NewProject,
        today: NaiveDate,
    ) -> Result<Project, ServiceError> {
        let input = validation::validate_new_project(input, today)?;
        let project = self.store.insert_project(input)?;
        info!(project_id = project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Projects with their task counts, latest start date first. `name`
    /// filters by case-insensitive substring.
    pub fn projects(&self, name: Option<&str>) -> Result<Vec<ProjectSummary>, ServiceError> {
        let needle = name.map(str::to_lowercase);
        let tasks = self.store.tasks(&TaskFilter::default())?;

        let mut summaries: Vec<ProjectSummary> = self
            .store
            .projects()?
            .into_iter()
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n))
            })
            .map(|project| ProjectSummary {
                task_count: tasks.iter().filter(|t| t.project_id == project.id).count(),
                project,
            })
            .collect();
        summaries.sort_by(|a, b| b.project.start_date.cmp(&a.project.start_date));
        Ok(summaries)
    }

    pub fn project(&self, id: u64) -> Result<Project, ServiceError> {
        Ok(self.store.project(id)?)
    }

    /// Edit a project's name, description or period.
    pub fn update_project(&self, id: u64, update: ProjectUpdate) -> Result<Project, ServiceError> {
        let project = self.store.project(id)?;
        let edited = validation::validate_project_update(&project, update)?;
        let project = self.store.save_project(&edited)?;
        info!(project_id = id, version = project.version, "project updated");
        Ok(project)
    }

    /// Delete a project and all of its tasks. Returns how many tasks went
    /// with it.
    pub fn delete_project(&self, id: u64) -> Result<usize, ServiceError> {
        let project = self.store.project(id)?;
        let removed = self.store.delete_project(id, project.version)?;
        info!(project_id = id, tasks = removed.len(), "project deleted");
        Ok(removed.len())
    }

    pub fn create_task(&self, input: NewTask, today: NaiveDate) -> Result<Task, ServiceError> {
        let project = self.store.project(input.project_id)?;
        let input = validation::validate_new_task(input, &project, today)?;
        let task = self.store.insert_task(input)?;
        info!(task_id = task.id, project_id = task.project_id, "task created");
        Ok(task)
    }

    pub fn task(&self, id: u64) -> Result<Task, ServiceError> {
        Ok(self.store.task(id)?)
    }

    pub fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.tasks(filter)?)
    }

    /// Edit a task's title or due date.
    pub fn update_task(&self, id: u64, update: TaskUpdate) -> Result<Task, ServiceError> {
        let task = self.store.task(id)?;
        let project = self.store.project(task.project_id)?;
        let edited = validation::validate_task_update(&task, update, &project)?;
        let task = self.store.save_task(&edited)?;
        debug!(task_id = id, "task updated");
        Ok(task)
    }

    pub fn delete_task(&self, id: u64) -> Result<Task, ServiceError> {
        let task = self.store.task(id)?;
        let task = self.store.delete_task(id, task.version)?;
        info!(task_id = id, project_id = task.project_id, "task deleted");
        Ok(task)
    }

    /// Set or clear the assignee of a task.
    pub fn assign(&self, id: u64, assignee: Option<&str>) -> Result<Task, ServiceError> {
        let mut task = self.store.task(id)?;
        task.assignee = validation::validate_assignment(&task, assignee)?;
        let task = self.store.save_task(&task)?;
        debug!(task_id = id, assignee = ?task.assignee, "assignee updated");
        Ok(task)
    }

    /// Replace the description of a task.
    pub fn describe(&self, id: u64, description: &str) -> Result<Task, ServiceError> {
        let mut task = self.store.task(id)?;
        task.description = validation::validate_description(&task, description)?;
        let task = self.store.save_task(&task)?;
        debug!(task_id = id, "description updated");
        Ok(task)
    }

    /// Move a task to `target` through the workflow engine.
    ///
    /// The rules are checked against the stored snapshot and the commit only
    /// lands if the task is still at that snapshot's version; a concurrent
    /// write surfaces as [`StoreError::Conflict`](crate::error::StoreError::Conflict).
    /// The audit record is emitted after the commit and only then.
    pub fn transition(
        &self,
        id: u64,
        target: TaskStatus,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<TransitionRecord, ServiceError> {
        let mut snapshot = self.store.task(id)?;
        let version = snapshot.version;

        let record = WorkflowEngine::apply(&mut snapshot, target, actor, reason).map_err(|e| {
            warn!(task_id = id, actor = %actor.id, error = %e, "transition rejected");
            e
        })?;

        self.store.commit_status(id, version, target)?;
        self.audit.record(&record);
        info!(
            task_id = id,
            from = %record.from,
            to = %record.to,
            actor = %actor.id,
            "task status changed"
        );
        Ok(record)
    }

    /// Open tasks whose due date is before `today`.
    pub fn overdue(&self, today: NaiveDate) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.store.tasks(&TaskFilter::default())?;
        Ok(tasks.into_iter().filter(|t| t.is_overdue(today)).collect())
    }

    /// Tasks assigned to `actor`.
    pub fn tasks_for(&self, actor: &Actor) -> Result<Vec<Task>, ServiceError> {
        self.tasks(&TaskFilter {
            assignee: Some(actor.id.clone()),
            ..Default::default()
        })
    }
}
