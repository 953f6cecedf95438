use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::TaskStatus;

/// A project groups tasks and bounds their due dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Incremented by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl Project {
    /// Whether `date` falls inside the project window, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial edit of a project. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A unit of work inside a project. Its status is only ever changed by the
/// workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee: Option<String>,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Incremented by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl Task {
    pub fn new(id: u64, project_id: u64, title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            assignee: None,
            due_date,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn has_assignee(&self) -> bool {
        self.assignee.is_some()
    }

    /// Length of the description in characters. Input is normalized by
    /// `validation` before it reaches a task, so no trimming happens here.
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }

    /// Past its due date while work is still expected.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status.is_open()
    }

    /// Days left until the due date; negative once it has passed.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

/// Input for creating a task. There is no status field: tasks always start
/// as `PENDENTE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<String>,
    pub due_date: NaiveDate,
}

/// Partial edit of a task's title or due date. Status, assignee and
/// description have their own operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The identity requesting a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    /// Elevated privilege (administrator/staff).
    #[serde(default)]
    pub is_staff: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_staff: false,
        }
    }

    pub fn staff(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_staff: true,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_staff {
            write!(f, "{} (staff)", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}

/// Audit value produced once per successful status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: String,
    pub task_id: u64,
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionRecord {
    pub fn new(
        task_id: u64,
        from: TaskStatus,
        to: TaskStatus,
        actor: &Actor,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            from,
            to,
            actor_id: actor.id.clone(),
            timestamp: Utc::now(),
            reason,
        }
    }
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task #{}: {} -> {} by {} at {}",
            self.task_id,
            self.from,
            self.to,
            self.actor_id,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_creation_defaults() {
        let task = Task::new(1, 1, "Write the report", date(2026, 2, 1));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.assignee.is_none());
        assert!(task.description.is_empty());
        assert_eq!(task.version, 0);
    }

    #[test]
    fn any_assignee_counts() {
        let task = Task::new(1, 1, "Write the report", date(2026, 2, 1));
        assert!(!task.has_assignee());
        assert!(task.clone().with_assignee("  ").has_assignee());
        assert!(task.with_assignee("ana").has_assignee());
    }

    #[test]
    fn description_len_counts_characters() {
        let task = Task::new(1, 1, "Write the report", date(2026, 2, 1))
            .with_description("  concluída  ");
        assert_eq!(task.description_len(), 13);
    }

    #[test]
    fn overdue_only_while_open() {
        let today = date(2026, 3, 1);
        let mut task = Task::new(1, 1, "Write the report", date(2026, 2, 1));
        assert!(task.is_overdue(today));
        assert_eq!(task.days_until_due(today), -28);

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));
        task.status = TaskStatus::Cancelled;
        assert!(!task.is_overdue(today));
        task.status = TaskStatus::InProgress;
        assert!(!task.is_overdue(date(2026, 2, 1)));
    }

    #[test]
    fn project_window_is_inclusive() {
        let project = Project {
            id: 1,
            name: "Portal".into(),
            description: String::new(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
            version: 0,
        };
        assert!(project.contains(date(2026, 1, 1)));
        assert!(project.contains(date(2026, 12, 31)));
        assert!(!project.contains(date(2027, 1, 1)));
    }

    #[test]
    fn record_display_includes_reason() {
        let record = TransitionRecord::new(
            4,
            TaskStatus::InProgress,
            TaskStatus::Cancelled,
            &Actor::staff("admin"),
            Some("scope cut".into()),
        );
        let text = record.to_string();
        assert!(text.starts_with("task #4: EM_PROGRESSO -> CANCELADA by admin at "));
        assert!(text.ends_with("(scope cut)"));
    }

    #[test]
    fn record_omits_missing_reason_in_json() {
        let record = TransitionRecord::new(
            1,
            TaskStatus::Pending,
            TaskStatus::Cancelled,
            &Actor::new("dev"),
            None,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("reason"));
        let back: TransitionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
