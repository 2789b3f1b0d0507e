use crate::env;
use crate::task::{Task, TaskKind, TaskListManager};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Version written to every save file
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// On-disk layout of the save file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub tasks: Vec<TaskRecord>,
}

/// One saved task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub description: String,
    #[serde(default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub done: bool,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            description: task.description().to_string(),
            kind: task.kind().clone(),
            done: task.is_done(),
        }
    }
}

/// Configuration for persistence operations
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Write the list back after every command that changed it. When off,
    /// changes are written once, when the session ends.
    pub autosave: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { autosave: true }
    }
}

/// Reads and writes the task list save file.
///
/// Loading is all-or-nothing: either every saved task comes back, or none
/// does. Saving goes through a temporary file that is renamed over the
/// target, so an interrupted save leaves the previous file intact.
pub struct Storage {
    path: PathBuf,
    config: StorageConfig,
    saved_revision: u64,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>, config: StorageConfig) -> Self {
        Self {
            path: path.into(),
            config,
            saved_revision: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved tasks, falling back to an empty list on any problem
    pub async fn load(&self) -> Vec<Task> {
        match self.try_load().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(
                    "Ignoring unreadable save file {}: {:#}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Load saved tasks, reporting why the file could not be used.
    ///
    /// A missing file is not an error and yields an empty list.
    pub async fn try_load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            debug!("No save file at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = async_fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read save file: {}", self.path.display()))?;

        let save: SaveFile =
            serde_json::from_slice(&content).context("Failed to deserialize save file")?;

        if save.version != SAVE_FORMAT_VERSION {
            bail!(
                "Unsupported save file version {} (expected {})",
                save.version,
                SAVE_FORMAT_VERSION
            );
        }

        let tasks = save
            .tasks
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                Task::restore(&record.description, record.kind, record.done)
                    .with_context(|| format!("Invalid saved task #{}", i + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} tasks from {} (saved {})",
            tasks.len(),
            self.path.display(),
            save.saved_at
        );
        Ok(tasks)
    }

    /// Write `tasks` atomically, returning the number of bytes written
    pub async fn save(&self, tasks: &[Task]) -> Result<u64> {
        let save = SaveFile {
            version: SAVE_FORMAT_VERSION,
            saved_at: Utc::now(),
            tasks: tasks.iter().map(TaskRecord::from).collect(),
        };
        let data = serde_json::to_vec_pretty(&save).context("Failed to serialize task list")?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            async_fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = env::temp_file_path(&self.path);
        if let Err(e) = self.write_temp(&temp_path, &data).await {
            let _ = async_fs::remove_file(&temp_path).await;
            return Err(e);
        }

        async_fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace save file: {}", self.path.display()))?;

        debug!("Saved {} tasks ({} bytes)", tasks.len(), data.len());
        Ok(data.len() as u64)
    }

    /// Save the manager's list after a command if autosave is on.
    ///
    /// Returns whether a write happened.
    pub async fn sync(&mut self, manager: &TaskListManager) -> Result<bool> {
        if !self.config.autosave {
            return Ok(false);
        }
        self.flush(manager).await
    }

    /// Save the manager's list if it changed since the last save.
    ///
    /// Used at the end of a session, so it ignores the autosave setting.
    pub async fn flush(&mut self, manager: &TaskListManager) -> Result<bool> {
        if manager.revision() == self.saved_revision {
            return Ok(false);
        }

        self.save(manager.tasks()).await?;
        self.saved_revision = manager.revision();
        Ok(true)
    }

    async fn write_temp(&self, temp_path: &Path, data: &[u8]) -> Result<()> {
        let mut file = async_fs::File::create(temp_path)
            .await
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(data)
            .await
            .context("Failed to write temp file")?;
        file.sync_all().await.context("Failed to sync temp file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::restore("read book", TaskKind::None, true).unwrap(),
            Task::new("write report", TaskKind::Todo).unwrap(),
            Task::new(
                "return book",
                TaskKind::Deadline {
                    by: "Sunday".to_string(),
                },
            )
            .unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(temp_dir.path().join("tasks.json"), StorageConfig::default());

        assert!(storage.try_load().await.unwrap().is_empty());
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order_and_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = env::tasks_file_path(temp_dir.path());
        let storage = Storage::new(&path, StorageConfig::default());

        let bytes = storage.save(&sample_tasks()).await.unwrap();
        assert!(bytes > 0);
        assert!(path.exists());
        assert!(!env::temp_file_path(&path).exists());

        assert_eq!(storage.load().await, sample_tasks());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = Storage::new(&path, StorageConfig::default());
        assert!(storage.try_load().await.is_err());
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_one_invalid_record_discards_everything() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let content = serde_json::json!({
            "version": 1,
            "saved_at": "2026-10-19T10:00:00Z",
            "tasks": [
                {"description": "read book", "kind": {"type": "todo"}, "done": false},
                {"description": "   ", "kind": {"type": "none"}, "done": true}
            ]
        });
        std::fs::write(&path, content.to_string()).unwrap();

        let storage = Storage::new(&path, StorageConfig::default());
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_version_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let content = serde_json::json!({
            "version": 99,
            "saved_at": "2026-10-19T10:00:00Z",
            "tasks": [{"description": "read book"}]
        });
        std::fs::write(&path, content.to_string()).unwrap();

        let storage = Storage::new(&path, StorageConfig::default());
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let content = serde_json::json!({
            "version": 1,
            "saved_at": "2026-10-19T10:00:00Z",
            "tasks": [{"description": "read book"}]
        });
        std::fs::write(&path, content.to_string()).unwrap();

        let storage = Storage::new(&path, StorageConfig::default());
        let tasks = storage.load().await;
        assert_eq!(tasks, vec![Task::new("read book", TaskKind::None).unwrap()]);
    }

    #[tokio::test]
    async fn test_sync_writes_only_after_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let mut storage = Storage::new(&path, StorageConfig::default());
        let mut manager = TaskListManager::new();

        assert!(!storage.sync(&manager).await.unwrap());
        assert!(!path.exists());

        manager.add("read book", TaskKind::None).unwrap();
        assert!(storage.sync(&manager).await.unwrap());
        assert!(!storage.sync(&manager).await.unwrap());

        let _ = manager.list_all();
        assert!(!storage.sync(&manager).await.unwrap());

        manager.mark_done(1).unwrap();
        assert!(storage.sync(&manager).await.unwrap());
        assert_eq!(storage.load().await, manager.tasks());
    }

    #[tokio::test]
    async fn test_sync_respects_autosave_off() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let mut storage = Storage::new(&path, StorageConfig { autosave: false });
        let mut manager = TaskListManager::new();

        manager.add("read book", TaskKind::None).unwrap();
        assert!(!storage.sync(&manager).await.unwrap());
        assert!(!path.exists());

        assert!(storage.flush(&manager).await.unwrap());
        assert!(!storage.flush(&manager).await.unwrap());
        assert_eq!(storage.load().await, manager.tasks());
    }
}
