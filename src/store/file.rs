//! Armazenamento persistente em um arquivo JSON.
//!
//! O arquivo é a única fonte de verdade: cada leitura o relê e cada mutação
//! roda sob um lock exclusivo (arquivo `.lock` ao lado do banco), recarrega
//! as tabelas do disco, aplica a mudança e regrava tudo. Assim a checagem de
//! versão vale também entre processos distintos.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tracing::debug;

use super::tables::Tables;
use super::{TaskFilter, TaskStore};
use crate::error::StoreError;
use crate::workflow::{NewProject, NewTask, Project, Task, TaskStatus};

/// Store baseado em arquivo JSON.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Abre o banco no caminho fornecido. Um arquivo inexistente é um banco vazio.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let lock_path = path.with_extension("json.lock");
        let store = Self { path, lock_path };
        // Falha cedo se o arquivo existente estiver corrompido.
        store.load()?;
        debug!(path = %store.path.display(), "opened task database");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Tables, StoreError> {
        if !self.path.exists() {
            return Ok(Tables::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    // Lock exclusivo, releitura do disco, mudança e gravação.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        let mut lock = RwLock::new(file);
        let _guard = lock.write()?;

        let mut tables = self.load()?;
        let out = change(&mut tables)?;
        self.persist(&tables)?;
        Ok(out)
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    // Grava num arquivo temporário e renomeia, para nunca deixar JSON pela metade.
    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, tables)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        self.mutate(|tables| Ok(tables.insert_project(project)))
    }

    fn project(&self, id: u64) -> Result<Project, StoreError> {
        self.load()?.project(id)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.load()?.projects())
    }

    fn save_project(&self, project: &Project) -> Result<Project, StoreError> {
        self.mutate(|tables| tables.save_project(project))
    }

    fn delete_project(&self, id: u64, expected_version: u64) -> Result<Vec<Task>, StoreError> {
        self.mutate(|tables| tables.delete_project(id, expected_version))
    }

    fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        self.mutate(|tables| tables.insert_task(task))
    }

    fn task(&self, id: u64) -> Result<Task, StoreError> {
        self.load()?.task(id)
    }

    fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(self.load()?.tasks(filter))
    }

    fn save_task(&self, task: &Task) -> Result<Task, StoreError> {
        self.mutate(|tables| tables.save_task(task))
    }

    fn commit_status(
        &self,
        id: u64,
        expected_version: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        self.mutate(|tables| tables.commit_status(id, expected_version, status))
    }

    fn delete_task(&self, id: u64, expected_version: u64) -> Result<Task, StoreError> {
        self.mutate(|tables| tables.delete_task(id, expected_version))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_project() -> NewProject {
        NewProject {
            name: "Portal".into(),
            description: "Site institucional".into(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            project_id: 1,
            title: title.into(),
            description: String::new(),
            assignee: Some("ana".into()),
            due_date: date(2026, 2, 1),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).unwrap();
        assert!(store.projects().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.insert_project(new_project()).unwrap();
            let task = store.insert_task(new_task("Home page")).unwrap();
            store
                .commit_status(task.id, task.version, TaskStatus::InProgress)
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let task = reopened.task(1).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.version, 1);
        assert_eq!(reopened.project(1).unwrap().name, "Portal");

        // Counters are persisted too.
        let next = reopened.insert_task(new_task("Contact page")).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn failed_mutation_is_not_published() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).unwrap();
        store.insert_project(new_project()).unwrap();
        let task = store.insert_task(new_task("Home page")).unwrap();

        assert!(store.commit_status(task.id, 5, TaskStatus::Cancelled).is_err());

        let reopened = JsonFileStore::open(store.path()).unwrap();
        assert_eq!(reopened.task(task.id).unwrap().status, TaskStatus::Pending);
        assert_eq!(store.task(task.id).unwrap().version, 0);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn second_handle_sees_stale_snapshot_as_conflict() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let setup = JsonFileStore::open(&path).unwrap();
        setup.insert_project(new_project()).unwrap();
        setup.insert_task(new_task("Home page")).unwrap();

        // Two independent handles, as two CLI processes would have.
        let a = JsonFileStore::open(&path).unwrap();
        let b = JsonFileStore::open(&path).unwrap();
        let snapshot_a = a.task(1).unwrap();
        let snapshot_b = b.task(1).unwrap();
        assert_eq!(snapshot_a.version, snapshot_b.version);

        a.commit_status(1, snapshot_a.version, TaskStatus::InProgress)
            .unwrap();
        let err = b
            .commit_status(1, snapshot_b.version, TaskStatus::Cancelled)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                task_id: 1,
                expected: 0,
                found: 1
            }
        ));

        let on_disk = JsonFileStore::open(&path).unwrap().task(1).unwrap();
        assert_eq!(on_disk.status, TaskStatus::InProgress);
        assert_eq!(on_disk.version, 1);
        assert_eq!(b.task(1).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn deleting_a_project_persists_the_cascade() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json")).unwrap();
        let project = store.insert_project(new_project()).unwrap();
        store.insert_task(new_task("Home page")).unwrap();

        let removed = store.delete_project(project.id, project.version).unwrap();
        assert_eq!(removed.len(), 1);

        let reopened = JsonFileStore::open(store.path()).unwrap();
        assert!(reopened.projects().unwrap().is_empty());
        assert!(reopened.tasks(&TaskFilter::default()).unwrap().is_empty());
    }
}
