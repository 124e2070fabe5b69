use crate::{
    domain::{board::Board, task::{Task, TaskId}},
    error::{KanvasError, Result},
    storage::Storage,
    store::TaskUpdate,
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::fs;

/// File-based storage implementation
///
/// Tasks live as one JSON file each under `.kanvas/tasks/`, the board
/// configuration as `.kanvas/board.json`.
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANVAS_DIR: &'static str = ".kanvas";
    const TASKS_DIR: &'static str = "tasks";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANVAS_DIR),
        }
    }

    fn tasks_dir(&self) -> PathBuf {
        self.root_path.join(Self::TASKS_DIR)
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn task_file(&self, id: &TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        // Create default board if it doesn't exist
        if !self.board_file().exists() {
            let board = Board::default();
            self.save_board(&board).await?;
        }

        // Create .gitignore
        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Local caches\n*.db\n*.db-*\n").await?;
        }

        tracing::debug!(root = %self.root_path.display(), "initialized file storage");
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        let json = serde_json::to_string_pretty(task)?;
        let file_path = self.task_file(&task.id);

        fs::write(file_path, json).await?;
        tracing::debug!(task = %task.id, "saved task");
        Ok(())
    }

    async fn load_task(&self, id: &TaskId) -> Result<Task> {
        let file_path = self.task_file(id);

        if !file_path.exists() {
            return Err(KanvasError::TaskNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let task: Task = serde_json::from_str(&contents)?;

        Ok(task)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks_dir = self.tasks_dir();

        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&tasks_dir).await?;
        let mut tasks: Vec<Task> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(id) = TaskId::from_str(stem) {
                        tasks.push(self.load_task(&id).await?);
                    }
                }
            }
        }

        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let tasks = self.list_tasks().await?;
        let query_lower = query.to_lowercase();

        let matching = tasks
            .into_iter()
            .filter(|task| {
                let title_matches = task.title.to_lowercase().contains(&query_lower);
                let description_matches = task
                    .description
                    .as_ref()
                    .map(|d| d.to_lowercase().contains(&query_lower))
                    .unwrap_or(false);
                title_matches || description_matches
            })
            .collect();

        Ok(matching)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let file_path = self.task_file(id);

        if !file_path.exists() {
            return Err(KanvasError::TaskNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        tracing::debug!(task = %id, "deleted task");
        Ok(())
    }

    async fn apply_updates(&self, updates: &[TaskUpdate]) -> Result<Vec<Task>> {
        // Validation pass: load every referenced task before touching disk,
        // so a missing id fails the whole batch with no partial writes
        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            let mut task = self.load_task(&update.id).await?;
            task.set_status(update.status);
            task.set_order(update.order);
            updated.push(task);
        }

        for task in &updated {
            self.save_task(task).await?;
        }

        tracing::debug!(count = updates.len(), "applied batch update");
        Ok(updated)
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(KanvasError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: Board = serde_json::from_str(&contents)?;

        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Status;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
        assert!(storage.tasks_dir().exists());
        assert!(storage.board_file().exists());
    }

    #[tokio::test]
    async fn test_task_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let mut task = Task::new("Test Task").unwrap();
        task.set_order(Some(1.5));
        storage.save_task(&task).await.unwrap();

        let loaded = storage.load_task(&task.id).await.unwrap();
        assert_eq!(loaded.id, task.id);
        assert_eq!(loaded.title, task.title);
        assert_eq!(loaded.order, Some(1.5));
    }

    #[tokio::test]
    async fn test_load_missing_task() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let result = storage.load_task(&TaskId::new()).await;
        assert!(matches!(result, Err(KanvasError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_tasks_oldest_first() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let first = Task::new("First").unwrap();
        let second = Task::new("Second").unwrap();
        storage.save_task(&second).await.unwrap();
        storage.save_task(&first).await.unwrap();

        let tasks = storage.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].created_at <= tasks[1].created_at);
    }

    #[tokio::test]
    async fn test_search_tasks_by_title_and_description() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let task1 = Task::new("Ship release").unwrap();
        let mut task2 = Task::new("Other work").unwrap();
        task2.set_description(Some("prepare the release notes".to_string()));
        let task3 = Task::new("Unrelated").unwrap();

        storage.save_task(&task1).await.unwrap();
        storage.save_task(&task2).await.unwrap();
        storage.save_task(&task3).await.unwrap();

        let results = storage.search_tasks("RELEASE").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|t| t.id == task1.id));
        assert!(results.iter().any(|t| t.id == task2.id));
    }

    #[tokio::test]
    async fn test_search_tasks_no_matches() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let task = Task::new("Test Task").unwrap();
        storage.save_task(&task).await.unwrap();

        let results = storage.search_tasks("nonexistent").await.unwrap();
        assert_eq!(results.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let task = Task::new("Doomed").unwrap();
        storage.save_task(&task).await.unwrap();
        storage.delete_task(&task.id).await.unwrap();

        assert!(storage.load_task(&task.id).await.is_err());
        assert!(storage.delete_task(&task.id).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_updates_batch() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let task1 = Task::new("One").unwrap();
        let task2 = Task::new("Two").unwrap();
        storage.save_task(&task1).await.unwrap();
        storage.save_task(&task2).await.unwrap();

        let updates = vec![
            TaskUpdate {
                id: task1.id,
                status: Status::Done,
                order: Some(0.0),
            },
            TaskUpdate {
                id: task2.id,
                status: Status::InProgress,
                order: Some(0.5),
            },
        ];

        let updated = storage.apply_updates(&updates).await.unwrap();
        assert_eq!(updated.len(), 2);

        let loaded = storage.load_task(&task1.id).await.unwrap();
        assert_eq!(loaded.status, Status::Done);
        assert!(loaded.completed);

        let loaded = storage.load_task(&task2.id).await.unwrap();
        assert_eq!(loaded.status, Status::InProgress);
        assert_eq!(loaded.order, Some(0.5));
    }

    #[tokio::test]
    async fn test_apply_updates_missing_id_fails_whole_batch() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let task = Task::new("Survivor").unwrap();
        storage.save_task(&task).await.unwrap();

        let updates = vec![
            TaskUpdate {
                id: task.id,
                status: Status::Done,
                order: Some(3.0),
            },
            TaskUpdate {
                id: TaskId::new(),
                status: Status::Done,
                order: None,
            },
        ];

        let result = storage.apply_updates(&updates).await;
        assert!(matches!(result, Err(KanvasError::TaskNotFound(_))));

        // The valid record was not written either
        let loaded = storage.load_task(&task.id).await.unwrap();
        assert_eq!(loaded.status, task.status);
        assert_eq!(loaded.order, task.order);
    }

    #[tokio::test]
    async fn test_board_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let board = storage.load_board().await.unwrap();
        assert_eq!(board.config.columns.len(), 4);
    }
}
