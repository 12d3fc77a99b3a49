//! Persistence collaborator for the task collection.
//!
//! # Responsibility
//! - Serialize the full task collection into SQLite and read it back.
//! - Keep SQL details out of the engine and facade.
//!
//! # Invariants
//! - `save_tasks` replaces the stored collection atomically.
//! - Reads reject malformed rows instead of masking them.

use crate::db::DbError;
use crate::model::task::{Category, Task, TaskStatus, TaskValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    category,
    status,
    sort_order,
    is_executing,
    created_at,
    updated_at
FROM tasks
ORDER BY created_at ASC, id ASC";

pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot persistence errors.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Validation(TaskValidationError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Serializes and rehydrates the whole task collection.
pub trait SnapshotStore {
    fn load_tasks(&self) -> StoreResult<Vec<Task>>;
    fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()>;
}

/// SQLite-backed snapshot store.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn load_tasks(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(TASK_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        debug!(
            "event=snapshot_load module=store status=ok task_count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()> {
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO tasks (
                    id,
                    title,
                    category,
                    status,
                    sort_order,
                    is_executing,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for task in tasks {
                insert.execute(params![
                    task.id.to_string(),
                    task.title.as_str(),
                    task.category.as_str(),
                    task.status.as_str(),
                    task.order,
                    bool_to_int(task.is_executing),
                    task.created_at,
                    task.updated_at,
                ])?;
            }
        }
        if let Err(err) = tx.commit() {
            error!("event=snapshot_save module=store status=error error={err}");
            return Err(err.into());
        }

        debug!(
            "event=snapshot_save module=store status=ok task_count={}",
            tasks.len()
        );
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{id_text}` in tasks.id")))?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in tasks.category"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let is_executing = match row.get::<_, i64>("is_executing")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_executing value `{other}` in tasks.is_executing"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        category,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        order: row.get("sort_order")?,
        status,
        is_executing,
    };
    task.validate()?;
    Ok(task)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
