//! Interface de terminal do TASKFLOW: saída colorida.
//!
//! Usa a crate `console` para estilização com cores. Cada status de tarefa
//! tem sua cor: pendente (amarelo), em progresso (ciano), concluída (verde)
//! e cancelada (vermelho).

use chrono::NaiveDate;
use console::Style;

use crate::service::ProjectSummary;
use crate::workflow::{Task, TaskStatus, TransitionRecord};

/// Formatação de projetos, tarefas e registros de auditoria no terminal.
pub struct Ui {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
    dim: Style,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
            dim: Style::new().dim(),
        }
    }

    fn status_style(&self, status: TaskStatus) -> &Style {
        match status {
            TaskStatus::Pending => &self.yellow,
            TaskStatus::InProgress => &self.cyan,
            TaskStatus::Done => &self.green,
            TaskStatus::Cancelled => &self.red,
        }
    }

    /// Código do status, colorido.
    pub fn status(&self, status: TaskStatus) -> String {
        self.status_style(status)
            .apply_to(format!("{:<12}", status.code()))
            .to_string()
    }

    /// Uma linha por tarefa: id, status, título, responsável e prazo.
    pub fn task_line(&self, task: &Task, today: NaiveDate) -> String {
        let assignee = task.assignee.as_deref().unwrap_or("-");
        let due = if task.is_overdue(today) {
            self.red
                .apply_to(format!("{} (atrasada)", task.due_date))
                .to_string()
        } else {
            task.due_date.to_string()
        };
        format!(
            "#{:<4} {} {}  @{}  {}",
            task.id,
            self.status(task.status),
            task.title,
            assignee,
            due
        )
    }

    pub fn print_tasks(&self, tasks: &[Task], today: NaiveDate) {
        if tasks.is_empty() {
            println!("  {}", self.dim.apply_to("nenhuma tarefa"));
            return;
        }
        for task in tasks {
            println!("  {}", self.task_line(task, today));
        }
    }

    /// Detalhes completos de uma tarefa.
    pub fn print_task(&self, task: &Task, today: NaiveDate) {
        println!("{}", self.task_line(task, today));
        println!("  projeto:    #{}", task.project_id);
        println!("  status:     {}", task.status.label());
        println!(
            "  descrição:  {}",
            if task.description.is_empty() {
                "-"
            } else {
                task.description.as_str()
            }
        );
        println!(
            "  entrega:    {} ({} dias)",
            task.due_date,
            task.days_until_due(today)
        );
        println!(
            "  criada em:  {}",
            task.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    pub fn print_projects(&self, projects: &[ProjectSummary]) {
        if projects.is_empty() {
            println!("  {}", self.dim.apply_to("nenhum projeto"));
            return;
        }
        for summary in projects {
            let p = &summary.project;
            println!(
                "  #{:<4} {}  {} → {}  {}",
                p.id,
                self.cyan.apply_to(&p.name),
                p.start_date,
                p.end_date,
                self.dim.apply_to(format!("{} tarefa(s)", summary.task_count))
            );
        }
    }

    /// Linha de auditoria de uma transição.
    pub fn record_line(&self, record: &TransitionRecord) -> String {
        let mut line = format!(
            "{}  #{:<4} {} → {}  por {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.task_id,
            self.status_style(record.from).apply_to(record.from.code()),
            self.status_style(record.to).apply_to(record.to.code()),
            record.actor_id
        );
        if let Some(reason) = &record.reason {
            line.push_str(&format!("  ({reason})"));
        }
        line
    }

    pub fn print_history(&self, records: &[TransitionRecord]) {
        println!("{}", self.cyan.apply_to("─── Audit Trail ───"));
        if records.is_empty() {
            println!("  {}", self.dim.apply_to("nenhuma transição registrada"));
        }
        for record in records {
            println!("  {}", self.record_line(record));
        }
    }

    /// Mensagem de sucesso com checkmark verde.
    pub fn success(&self, message: &str) {
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// Mensagem de falha com X vermelho.
    pub fn failure(&self, message: &str) {
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }

    pub fn heading(&self, title: &str) {
        println!();
        println!("{}", self.yellow.apply_to(title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Actor;

    fn plain() -> Ui {
        console::set_colors_enabled(false);
        Ui::new()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_line_marks_overdue() {
        let ui = plain();
        let task = Task::new(7, 1, "Landing page", date(2026, 2, 1)).with_assignee("ana");

        let line = ui.task_line(&task, date(2026, 1, 10));
        assert!(line.starts_with("#7    PENDENTE"));
        assert!(line.contains("Landing page  @ana  2026-02-01"));
        assert!(!line.contains("atrasada"));

        let late = ui.task_line(&task, date(2026, 3, 1));
        assert!(late.ends_with("2026-02-01 (atrasada)"));
    }

    #[test]
    fn record_line_shows_reason() {
        let ui = plain();
        let record = TransitionRecord::new(
            3,
            TaskStatus::InProgress,
            TaskStatus::Pending,
            &Actor::new("ana"),
            Some("blocked".into()),
        );
        let line = ui.record_line(&record);
        assert!(line.contains("#3    EM_PROGRESSO → PENDENTE  por ana"));
        assert!(line.ends_with("(blocked)"));
    }
}
