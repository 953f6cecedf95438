//! Configuração do TASKFLOW carregada a partir de `taskflow.toml`.
//!
//! A struct [`TaskflowConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `TASKFLOW_DATA` e `TASKFLOW_ACTOR` têm precedência
//! sobre o arquivo.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuração de nível superior carregada de `taskflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskflowConfig {
    /// Arquivo JSON com projetos e tarefas.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Arquivo JSON-lines onde as transições de status são auditadas.
    #[serde(default = "default_audit_file")]
    pub audit_file: PathBuf,

    /// Filtro de log no formato do `tracing-subscriber` (ex.: "info", "taskflow=debug").
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Usuário que executa os comandos quando `--actor` não é informado.
    #[serde(default = "default_actor")]
    pub default_actor: String,
}

// Valor padrão para o banco: "taskflow.json".
fn default_data_file() -> PathBuf {
    PathBuf::from("taskflow.json")
}

// Valor padrão para a trilha de auditoria: "taskflow-audit.jsonl".
fn default_audit_file() -> PathBuf {
    PathBuf::from("taskflow-audit.jsonl")
}

// Valor padrão para o filtro de log: "info".
fn default_log_filter() -> String {
    "info".to_string()
}

// Valor padrão para o usuário: "anonymous".
fn default_actor() -> String {
    "anonymous".to_string()
}

impl Default for TaskflowConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            audit_file: default_audit_file(),
            log_filter: default_log_filter(),
            default_actor: default_actor(),
        }
    }
}

impl TaskflowConfig {
    /// Carrega a configuração de `taskflow.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new("taskflow.toml"))?;
        config.apply_env();
        Ok(config)
    }

    /// Carrega a configuração de um caminho específico, sem consultar o ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<TaskflowConfig>(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(config)
    }

    // Variáveis de ambiente têm precedência sobre o arquivo de configuração.
    fn apply_env(&mut self) {
        if let Some(data) = non_empty_env("TASKFLOW_DATA") {
            self.data_file = PathBuf::from(data);
        }
        if let Some(actor) = non_empty_env("TASKFLOW_ACTOR") {
            self.default_actor = actor;
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = TaskflowConfig::default();
        assert_eq!(config.data_file, PathBuf::from("taskflow.json"));
        assert_eq!(config.audit_file, PathBuf::from("taskflow-audit.jsonl"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.default_actor, "anonymous");
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            data_file = "/var/lib/taskflow/db.json"
            default_actor = "ana"
        "#;
        let config: TaskflowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/var/lib/taskflow/db.json"));
        assert_eq!(config.default_actor, "ana");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.audit_file, PathBuf::from("taskflow-audit.jsonl"));
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = TaskflowConfig::load_from(&dir.path().join("taskflow.toml")).unwrap();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn load_from_reports_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskflow.toml");
        std::fs::write(&path, "log_filter = [").unwrap();
        let err = TaskflowConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("invalid config in "));
    }
}
