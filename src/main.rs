use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::Parser;

use taskflow::audit::{
    ChannelAuditSink, JsonlAuditSink, TracingAuditSink, read_history, spawn_audit_writer,
};
use taskflow::cli::{Cli, Command, ProjectCommand, TaskCommand};
use taskflow::config::TaskflowConfig;
use taskflow::service::TaskService;
use taskflow::store::{JsonFileStore, TaskFilter};
use taskflow::ui::Ui;
use taskflow::workflow::{Actor, NewProject, NewTask, ProjectUpdate, TaskUpdate};
use taskflow::{demo, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TaskflowConfig::load()?;
    if let Some(data) = cli.data.clone() {
        config.data_file = data;
    }
    telemetry::init_logging(&config.log_filter, cli.verbose);

    let ui = Ui::new();
    let today = Local::now().date_naive();
    let actor = Actor {
        id: cli.actor.clone().unwrap_or_else(|| config.default_actor.clone()),
        is_staff: cli.staff,
    };

    match cli.command {
        Command::Demo => {
            demo::run(&ui, today)?;
        }
        Command::History { task } => {
            let records = read_history(&config.audit_file)?;
            let records: Vec<_> = records
                .into_iter()
                .filter(|r| task.is_none_or(|id| r.task_id == id))
                .collect();
            ui.print_history(&records);
        }
        Command::Project(cmd) => {
            with_service(&config, |service| run_project(service, cmd, &ui, today)).await?;
        }
        Command::Task(cmd) => {
            with_service(&config, |service| run_task(service, cmd, &actor, &ui, today)).await?;
        }
    }

    Ok(())
}

type Service = TaskService<JsonFileStore, ChannelAuditSink>;

/// Open the data file, route audit records through a background writer
/// (JSON-lines file plus log) and run `f` against the service.
async fn with_service<F>(config: &TaskflowConfig, f: F) -> Result<()>
where
    F: FnOnce(&Service) -> Result<()>,
{
    let store = JsonFileStore::open(&config.data_file)?;
    let (channel, rx) = ChannelAuditSink::new();
    let writer = spawn_audit_writer(
        rx,
        (JsonlAuditSink::new(&config.audit_file), TracingAuditSink),
    );

    let service = TaskService::new(store, channel);
    let result = f(&service);
    // Closing the channel lets the writer drain and finish.
    drop(service);
    writer.await?;
    result
}

fn run_project(
    service: &Service,
    cmd: ProjectCommand,
    ui: &Ui,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ProjectCommand::Add {
            name,
            start,
            end,
            description,
        } => {
            let project = service.create_project(
                NewProject {
                    name,
                    description,
                    start_date: start,
                    end_date: end,
                },
                today,
            )?;
            ui.success(&format!("Project #{} created: {}", project.id, project.name));
        }
        ProjectCommand::List { name } => {
            ui.print_projects(&service.projects(name.as_deref())?);
        }
        ProjectCommand::Edit {
            id,
            name,
            start,
            end,
            description,
        } => {
            let update = ProjectUpdate {
                name,
                description,
                start_date: start,
                end_date: end,
            };
            if update.is_empty() {
                bail!("nothing to change: pass --name, --start, --end or --description");
            }
            let project = service.update_project(id, update)?;
            ui.success(&format!("Project #{id} updated: {}", project.name));
        }
        ProjectCommand::Delete { id } => {
            let removed = service.delete_project(id)?;
            ui.success(&format!("Project #{id} deleted with {removed} task(s)"));
        }
    }
    Ok(())
}

fn run_task(
    service: &Service,
    cmd: TaskCommand,
    actor: &Actor,
    ui: &Ui,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            project,
            title,
            due,
            description,
            assignee,
        } => {
            let task = service.create_task(
                NewTask {
                    project_id: project,
                    title,
                    description,
                    assignee,
                    due_date: due,
                },
                today,
            )?;
            ui.success(&format!("Task #{} created as {}", task.id, task.status));
        }
        TaskCommand::List {
            status,
            project,
            assignee,
        } => {
            let filter = TaskFilter {
                status,
                project_id: project,
                assignee,
            };
            ui.print_tasks(&service.tasks(&filter)?, today);
        }
        TaskCommand::Show { id } => {
            ui.print_task(&service.task(id)?, today);
        }
        TaskCommand::Edit { id, title, due } => {
            let update = TaskUpdate {
                title,
                due_date: due,
            };
            if update.is_empty() {
                bail!("nothing to change: pass --title or --due");
            }
            let task = service.update_task(id, update)?;
            ui.success(&format!("Task #{id} updated: {} (due {})", task.title, task.due_date));
        }
        TaskCommand::Delete { id } => {
            let task = service.delete_task(id)?;
            ui.success(&format!("Task #{id} deleted: {}", task.title));
        }
        TaskCommand::Assign { id, user } => {
            let task = service.assign(id, user.as_deref())?;
            match &task.assignee {
                Some(who) => ui.success(&format!("Task #{id} assigned to {who}")),
                None => ui.success(&format!("Task #{id} unassigned")),
            }
        }
        TaskCommand::Describe { id, text } => {
            service.describe(id, &text)?;
            ui.success(&format!("Task #{id} description updated"));
        }
        TaskCommand::Move { id, status, reason } => {
            match service.transition(id, status, actor, reason) {
                Ok(record) => ui.success(&format!(
                    "Task #{id}: {} -> {}",
                    record.from, record.to
                )),
                Err(e) => {
                    ui.failure(&e.to_string());
                    bail!("transition of task #{id} to {status} rejected");
                }
            }
        }
        TaskCommand::Overdue => {
            ui.print_tasks(&service.overdue(today)?, today);
        }
        TaskCommand::Mine => {
            ui.print_tasks(&service.tasks_for(actor)?, today);
        }
    }
    Ok(())
}
