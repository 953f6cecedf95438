use std::fmt;

use thiserror::Error;

use crate::workflow::TaskStatus;

/// Rejections produced by the workflow engine. The task is untouched when
/// any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Invalid transition {from} -> {to}. Allowed from {from}: {}", join_statuses(.allowed))]
    InvalidTransition {
        from: TaskStatus,
        to: TaskStatus,
        allowed: &'static [TaskStatus],
    },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(Precondition),

    #[error("Permission denied: {actor} cannot move a task from {from} to {to}")]
    PermissionDenied {
        actor: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

/// Data requirement a target status imposes on the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Entering `EM_PROGRESSO` needs an assignee.
    AssigneeRequired,
    /// Entering `CONCLUIDA` needs a description of what was done.
    DescriptionRequired,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::AssigneeRequired => write!(f, "assignee required"),
            Precondition::DescriptionRequired => write!(f, "description required"),
        }
    }
}

fn join_statuses(statuses: &[TaskStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(|s| s.code())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status '{0}'. Options: PENDENTE, EM_PROGRESSO, CONCLUIDA, CANCELADA")]
pub struct ParseStatusError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    ProjectNotFound(u64),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Task {task_id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        task_id: u64,
        expected: u64,
        found: u64,
    },

    #[error(
        "Project {project_id} was modified concurrently (expected version {expected}, found {found})"
    )]
    ProjectConflict {
        project_id: u64,
        expected: u64,
        found: u64,
    },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in one input, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_fields(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
