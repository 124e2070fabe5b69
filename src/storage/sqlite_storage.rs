use crate::{
    domain::{board::Board, task::{Task, TaskId}},
    error::{KanvasError, Result},
    storage::Storage,
    store::TaskUpdate,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

/// SQLite-based storage backend
///
/// Tasks and board state are stored as JSON rows. Batch updates run inside a
/// single transaction, so a move's `{id, status, order}` batch is applied
/// all-or-nothing.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a database file
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(database_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| KanvasError::StorageError("connection mutex poisoned".to_string()))
    }

    fn load_task_row(conn: &Connection, id: &TaskId) -> Result<Task> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM tasks WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(KanvasError::TaskNotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS board (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );",
        )?;

        let has_board: Option<i64> = conn
            .query_row("SELECT id FROM board WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        if has_board.is_none() {
            let json = serde_json::to_string(&Board::default())?;
            conn.execute("INSERT INTO board (id, data) VALUES (1, ?1)", params![json])?;
        }

        tracing::debug!("initialized sqlite storage");
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        let conn = self.lock()?;
        let json = serde_json::to_string(task)?;
        conn.execute(
            "INSERT OR REPLACE INTO tasks (id, data) VALUES (?1, ?2)",
            params![task.id.to_string(), json],
        )?;
        tracing::debug!(task = %task.id, "saved task");
        Ok(())
    }

    async fn load_task(&self, id: &TaskId) -> Result<Task> {
        let conn = self.lock()?;
        Self::load_task_row(&conn, id)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT data FROM tasks")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for row in rows {
            let task: Task = serde_json::from_str(&row?)?;
            tasks.push(task);
        }

        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let tasks = self.list_tasks().await?;
        let query_lower = query.to_lowercase();

        Ok(tasks
            .into_iter()
            .filter(|task| {
                task.title.to_lowercase().contains(&query_lower)
                    || task
                        .description
                        .as_ref()
                        .map(|d| d.to_lowercase().contains(&query_lower))
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(KanvasError::TaskNotFound(id.to_string()));
        }
        tracing::debug!(task = %id, "deleted task");
        Ok(())
    }

    async fn apply_updates(&self, updates: &[TaskUpdate]) -> Result<Vec<Task>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            let mut task = Self::load_task_row(&tx, &update.id)?;
            task.set_status(update.status);
            task.set_order(update.order);
            tx.execute(
                "UPDATE tasks SET data = ?2 WHERE id = ?1",
                params![update.id.to_string(), serde_json::to_string(&task)?],
            )?;
            updated.push(task);
        }

        tx.commit()?;
        tracing::debug!(count = updates.len(), "applied batch update");
        Ok(updated)
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let conn = self.lock()?;
        let json = serde_json::to_string(board)?;
        conn.execute(
            "INSERT OR REPLACE INTO board (id, data) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let conn = self.lock()?;
        let data: Option<String> = conn
            .query_row("SELECT data FROM board WHERE id = 1", [], |row| row.get(0))
            .optional()?;

        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(KanvasError::BoardNotInitialized),
        }
    }

    async fn is_initialized(&self) -> bool {
        let Ok(conn) = self.lock() else {
            return false;
        };
        conn.query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'board'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .ok()
        .flatten()
        .is_some()
    }
}
