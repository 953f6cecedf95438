//! Input validation for projects and tasks.
//!
//! Field checks (length, characters) and cross-field checks (date windows)
//! run before anything reaches the store. Every failing field is reported,
//! not just the first. Status rules are not checked here: status only
//! changes through [`WorkflowEngine`](crate::workflow::WorkflowEngine).

use chrono::NaiveDate;

use crate::error::ValidationErrors;
use crate::workflow::{
    MIN_DESCRIPTION_LEN, NewProject, NewTask, Project, ProjectUpdate, Task, TaskStatus, TaskUpdate,
};

pub const MIN_PROJECT_NAME_LEN: usize = 3;
pub const MIN_TASK_TITLE_LEN: usize = 5;

/// Check a new project and return it with its name trimmed.
pub fn validate_new_project(
    input: NewProject,
    today: NaiveDate,
) -> Result<NewProject, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = check_project_name(&mut errors, &input.name);
    check_project_period(&mut errors, input.start_date, input.end_date);

    if input.start_date < today {
        errors.push("start_date", "cannot be in the past");
    }

    errors.into_result()?;
    Ok(NewProject { name, ..input })
}

/// Check a new task against its project and return it normalized: title and
/// description trimmed, blank assignee dropped.
pub fn validate_new_task(
    input: NewTask,
    project: &Project,
    today: NaiveDate,
) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = check_task_title(&mut errors, &input.title);

    if input.due_date < today {
        errors.push("due_date", "must not be in the past for new tasks");
    } else {
        check_due_date(&mut errors, input.due_date, project);
    }

    errors.into_result()?;
    Ok(NewTask {
        title,
        description: input.description.trim().to_string(),
        assignee: normalize_assignee(input.assignee.as_deref()),
        ..input
    })
}

/// Check a new assignee for an existing task. An in-progress task cannot be
/// left without one.
pub fn validate_assignment(
    task: &Task,
    assignee: Option<&str>,
) -> Result<Option<String>, ValidationErrors> {
    let assignee = normalize_assignee(assignee);
    let mut errors = ValidationErrors::default();
    if assignee.is_none() && task.status == TaskStatus::InProgress {
        errors.push("assignee", "tasks in progress must have an assignee");
    }
    errors.into_result()?;
    Ok(assignee)
}

/// Check a new description for an existing task. A concluded task keeps a
/// description long enough to have been concluded.
pub fn validate_description(task: &Task, description: &str) -> Result<String, ValidationErrors> {
    let description = description.trim().to_string();
    let mut errors = ValidationErrors::default();
    if task.status == TaskStatus::Done && description.chars().count() < MIN_DESCRIPTION_LEN {
        errors.push(
            "description",
            format!("concluded tasks need at least {MIN_DESCRIPTION_LEN} characters"),
        );
    }
    errors.into_result()?;
    Ok(description)
}

/// Apply an edit to a project. Name and period rules are the creation
/// rules, except that a start date in the past is accepted: projects already
/// under way get edited too.
pub fn validate_project_update(
    project: &Project,
    update: ProjectUpdate,
) -> Result<Project, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = match update.name {
        Some(name) => check_project_name(&mut errors, &name),
        None => project.name.clone(),
    };
    let start_date = update.start_date.unwrap_or(project.start_date);
    let end_date = update.end_date.unwrap_or(project.end_date);
    check_project_period(&mut errors, start_date, end_date);

    errors.into_result()?;
    Ok(Project {
        name,
        description: update
            .description
            .map_or_else(|| project.description.clone(), |d| d.trim().to_string()),
        start_date,
        end_date,
        ..project.clone()
    })
}

/// Apply an edit to a task's title or due date. The due date must still fall
/// within the project period but may be in the past, so overdue work can be
/// rescheduled or recorded as it happened.
pub fn validate_task_update(
    task: &Task,
    update: TaskUpdate,
    project: &Project,
) -> Result<Task, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = match update.title {
        Some(title) => check_task_title(&mut errors, &title),
        None => task.title.clone(),
    };
    let due_date = update.due_date.unwrap_or(task.due_date);
    check_due_date(&mut errors, due_date, project);

    errors.into_result()?;
    Ok(Task {
        title,
        due_date,
        ..task.clone()
    })
}

fn check_project_name(errors: &mut ValidationErrors, name: &str) -> String {
    let name = name.trim();
    if name.chars().count() < MIN_PROJECT_NAME_LEN {
        errors.push(
            "name",
            format!("must have at least {MIN_PROJECT_NAME_LEN} characters"),
        );
    } else if name.chars().all(char::is_numeric) {
        errors.push("name", "cannot contain only digits");
    }
    name.to_string()
}

fn check_project_period(errors: &mut ValidationErrors, start: NaiveDate, end: NaiveDate) {
    if end <= start {
        errors.push("end_date", "must be after start_date");
    }
}

fn check_task_title(errors: &mut ValidationErrors, title: &str) -> String {
    let title = title.trim();
    if title.chars().count() < MIN_TASK_TITLE_LEN {
        errors.push(
            "title",
            format!("must have at least {MIN_TASK_TITLE_LEN} characters"),
        );
    } else if !title.chars().any(char::is_alphanumeric) {
        errors.push("title", "must contain at least one letter or digit");
    }
    title.to_string()
}

fn check_due_date(errors: &mut ValidationErrors, due_date: NaiveDate, project: &Project) {
    if !project.contains(due_date) {
        errors.push(
            "due_date",
            format!(
                "must fall within the project period ({} to {})",
                project.start_date, project.end_date
            ),
        );
    }
}

fn normalize_assignee(assignee: Option<&str>) -> Option<String> {
    assignee
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
