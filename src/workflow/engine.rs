use crate::audit::AuditSink;
use crate::error::{Precondition, WorkflowError};

use super::status::TaskStatus;
use super::task::{Actor, Task, TransitionRecord};

/// Minimum description length, in characters, for a task to be concluded.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Validates and applies task status transitions.
///
/// The engine holds no state. Storage and audit delivery are supplied by the
/// caller, so every rule can be exercised against plain `Task` values.
pub struct WorkflowEngine;

impl WorkflowEngine {
    /// Targets reachable from `from`, straight from the rule table.
    pub fn allowed_targets(from: TaskStatus) -> &'static [TaskStatus] {
        from.allowed_targets()
    }

    /// Run every check for moving `task` to `target`, without touching it.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// 1. the transition table,
    /// 2. data preconditions of the target status,
    /// 3. actor permission.
    pub fn check(task: &Task, target: TaskStatus, actor: &Actor) -> Result<(), WorkflowError> {
        let from = task.status;

        if !from.can_transition_to(target) {
            return Err(WorkflowError::InvalidTransition {
                from,
                to: target,
                allowed: from.allowed_targets(),
            });
        }

        if let Some(missing) = Self::unmet_precondition(task, target) {
            return Err(WorkflowError::PreconditionFailed(missing));
        }

        if Self::requires_elevation(from, target) && !actor.is_staff {
            return Err(WorkflowError::PermissionDenied {
                actor: actor.id.clone(),
                from,
                to: target,
            });
        }

        Ok(())
    }

    /// Validate, then set the new status and build the audit record.
    ///
    /// On error the task is left exactly as it was.
    pub fn apply(
        task: &mut Task,
        target: TaskStatus,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<TransitionRecord, WorkflowError> {
        Self::check(task, target, actor)?;

        let record = TransitionRecord::new(task.id, task.status, target, actor, reason);
        task.status = target;
        Ok(record)
    }

    /// [`apply`](Self::apply) followed by a single emission to `sink`.
    pub fn attempt_transition(
        task: &mut Task,
        target: TaskStatus,
        actor: &Actor,
        reason: Option<String>,
        sink: &impl AuditSink,
    ) -> Result<TransitionRecord, WorkflowError> {
        let record = Self::apply(task, target, actor, reason)?;
        sink.record(&record);
        Ok(record)
    }

    fn unmet_precondition(task: &Task, target: TaskStatus) -> Option<Precondition> {
        match target {
            TaskStatus::InProgress if !task.has_assignee() => Some(Precondition::AssigneeRequired),
            TaskStatus::Done if task.description_len() < MIN_DESCRIPTION_LEN => {
                Some(Precondition::DescriptionRequired)
            }
            _ => None,
        }
    }

    // Cancelling active work needs staff; cancelling unstarted work does not.
    fn requires_elevation(from: TaskStatus, to: TaskStatus) -> bool {
        matches!((from, to), (TaskStatus::InProgress, TaskStatus::Cancelled))
    }
}
