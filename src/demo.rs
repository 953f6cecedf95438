//! Built-in walkthrough of the task workflow rules, run against an in-memory
//! store.

use chrono::{Days, NaiveDate};

use crate::audit::MemoryAuditSink;
use crate::error::ServiceError;
use crate::service::TaskService;
use crate::store::MemoryStore;
use crate::ui::Ui;
use crate::workflow::{Actor, NewProject, NewTask, TaskStatus, TransitionRecord};

/// Run the walkthrough, printing each step. Returns the audit trail it produced.
pub fn run(ui: &Ui, today: NaiveDate) -> Result<Vec<TransitionRecord>, ServiceError> {
    let service = TaskService::new(MemoryStore::new(), MemoryAuditSink::new());
    let dev = Actor::new("dev");
    let admin = Actor::staff("admin");

    let project = service.create_project(
        NewProject {
            name: "Demo project".into(),
            description: String::new(),
            start_date: today,
            end_date: today + Days::new(365),
        },
        today,
    )?;
    let new_task = |title: &str| NewTask {
        project_id: project.id,
        title: title.into(),
        description: String::new(),
        assignee: None,
        due_date: today + Days::new(30),
    };

    let task = service.create_task(new_task("Task without owner"), today)?;

    ui.heading("[1] Starting a task with no assignee");
    expect_rejection(ui, service.transition(task.id, TaskStatus::InProgress, &dev, None));

    ui.heading("[2] Assigning and starting again");
    service.assign(task.id, Some(dev.id.as_str()))?;
    let record = service.transition(task.id, TaskStatus::InProgress, &dev, None)?;
    ui.success(&format!("{} -> {}", record.from, record.to));

    ui.heading("[3] Concluding without describing the work");
    expect_rejection(ui, service.transition(task.id, TaskStatus::Done, &dev, None));

    ui.heading("[4] Describing and concluding");
    service.describe(task.id, "Implemented the page and reviewed it")?;
    let record = service.transition(task.id, TaskStatus::Done, &dev, None)?;
    ui.success(&format!("{} -> {}", record.from, record.to));

    ui.heading("[5] Reopening a concluded task");
    expect_rejection(ui, service.transition(task.id, TaskStatus::Pending, &admin, None));

    ui.heading("[6] Cancelling active work");
    let other = service.create_task(new_task("Second demo task"), today)?;
    service.assign(other.id, Some(dev.id.as_str()))?;
    service.transition(other.id, TaskStatus::InProgress, &dev, None)?;
    expect_rejection(ui, service.transition(other.id, TaskStatus::Cancelled, &dev, None));
    let record = service.transition(
        other.id,
        TaskStatus::Cancelled,
        &admin,
        Some("out of scope".into()),
    )?;
    ui.success(&format!("{} -> {} by {}", record.from, record.to, admin));

    let trail = service.audit().records();
    ui.heading("Audit trail");
    ui.print_history(&trail);
    Ok(trail)
}

fn expect_rejection<T>(ui: &Ui, result: Result<T, ServiceError>) {
    match result {
        Err(e) => ui.success(&format!("rejected as expected: {e}")),
        Ok(_) => ui.failure("transition was accepted but should have been rejected"),
    }
}
