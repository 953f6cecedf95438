//! Interface de linha de comando do TASKFLOW baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (project, task,
//! history, demo) e flags globais (--actor, --staff, --data, --verbose).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::workflow::TaskStatus;

/// TASKFLOW: gestão de projetos e tarefas com workflow de status auditado.
#[derive(Debug, Parser)]
#[command(name = "taskflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Usuário que executa o comando (padrão: `default_actor` da configuração).
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Executa o comando com privilégio elevado (staff).
    #[arg(long, global = true, default_value_t = false)]
    pub staff: bool,

    /// Caminho do arquivo de dados, sobrepondo a configuração.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gerencia projetos.
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Gerencia tarefas.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Mostra a trilha de auditoria das transições de status.
    History {
        /// Mostra apenas as transições desta tarefa.
        #[arg(long)]
        task: Option<u64>,
    },

    /// Executa a demonstração embutida do workflow de tarefas.
    Demo,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Cria um projeto.
    Add {
        #[arg(long)]
        name: String,
        /// Data de início (AAAA-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// Data de fim (AAAA-MM-DD).
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Lista projetos com a contagem de tarefas.
    List {
        /// Filtra pelo nome (sem diferenciar maiúsculas).
        #[arg(long)]
        name: Option<String>,
    },

    /// Edita nome, descrição ou período de um projeto.
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove um projeto e todas as suas tarefas.
    Delete { id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Cria uma tarefa (sempre PENDENTE).
    Add {
        #[arg(long)]
        project: u64,
        #[arg(long)]
        title: String,
        /// Data de entrega (AAAA-MM-DD).
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Lista tarefas, opcionalmente filtradas.
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        project: Option<u64>,
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Mostra uma tarefa.
    Show { id: u64 },

    /// Edita título ou data de entrega de uma tarefa.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        /// Nova data de entrega (AAAA-MM-DD); pode estar no passado.
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Remove uma tarefa.
    Delete { id: u64 },

    /// Define o responsável; sem usuário, remove o responsável.
    Assign { id: u64, user: Option<String> },

    /// Substitui a descrição da tarefa.
    Describe { id: u64, text: String },

    /// Move a tarefa para outro status (PENDENTE, EM_PROGRESSO, CONCLUIDA, CANCELADA).
    Move {
        id: u64,
        status: TaskStatus,
        /// Motivo registrado na auditoria.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Lista tarefas atrasadas.
    Overdue,

    /// Lista as tarefas do usuário atual.
    Mine,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_move_subcommand() {
        let cli = Cli::parse_from([
            "taskflow",
            "task",
            "move",
            "3",
            "em_progresso",
            "--reason",
            "kickoff",
        ]);
        match cli.command {
            Command::Task(TaskCommand::Move { id, status, reason }) => {
                assert_eq!(id, 3);
                assert_eq!(status, TaskStatus::InProgress);
                assert_eq!(reason.as_deref(), Some("kickoff"));
            }
            _ => panic!("expected task move"),
        }
    }

    #[test]
    fn cli_rejects_unknown_status() {
        let result = Cli::try_parse_from(["taskflow", "task", "move", "3", "DONE"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "taskflow",
            "--actor",
            "ana",
            "--staff",
            "--data",
            "/tmp/db.json",
            "--verbose",
            "demo",
        ]);
        assert!(cli.verbose);
        assert!(cli.staff);
        assert_eq!(cli.actor.as_deref(), Some("ana"));
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/db.json")));
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn cli_parses_project_dates() {
        let cli = Cli::parse_from([
            "taskflow", "project", "add", "--name", "Portal", "--start", "2026-01-01", "--end",
            "2026-12-31",
        ]);
        match cli.command {
            Command::Project(ProjectCommand::Add { name, start, end, description }) => {
                assert_eq!(name, "Portal");
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
                assert!(description.is_empty());
            }
            _ => panic!("expected project add"),
        }
    }

    #[test]
    fn cli_assign_without_user_clears() {
        let cli = Cli::parse_from(["taskflow", "task", "assign", "7"]);
        assert!(matches!(
            cli.command,
            Command::Task(TaskCommand::Assign { id: 7, user: None })
        ));
    }

    #[test]
    fn cli_parses_edit_and_delete() {
        let cli = Cli::parse_from(["taskflow", "task", "edit", "4", "--due", "2026-03-01"]);
        match cli.command {
            Command::Task(TaskCommand::Edit { id, title, due }) => {
                assert_eq!(id, 4);
                assert!(title.is_none());
                assert_eq!(due, NaiveDate::from_ymd_opt(2026, 3, 1));
            }
            _ => panic!("expected task edit"),
        }

        let cli = Cli::parse_from(["taskflow", "project", "delete", "2"]);
        assert!(matches!(
            cli.command,
            Command::Project(ProjectCommand::Delete { id: 2 })
        ));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
