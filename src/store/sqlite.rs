use std::{future::Future, path::Path, str::FromStr};

use anyhow::Context;
use chrono::{DateTime, Utc};
use essentials::debug;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::runtime::Handle;

use super::{SeoChanges, SeoEntry, SeoStore, SettingStore, Todo, TodoChanges, TodoStore};
use crate::{Error, Result};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS seo (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL UNIQUE,
        title TEXT,
        description TEXT,
        keywords TEXT,
        og_image TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        \"key\" TEXT NOT NULL UNIQUE,
        value TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

const TODO_COLUMNS: &str = "id, title, completed, created_at, updated_at";
const SEO_COLUMNS: &str =
    "id, path, title, description, keywords, og_image, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id as u64,
            title: row.title,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeoRow {
    id: i64,
    path: String,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    og_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SeoRow> for SeoEntry {
    fn from(row: SeoRow) -> Self {
        Self {
            id: row.id as u64,
            path: row.path,
            title: row.title,
            description: row.description,
            keywords: row.keywords,
            og_image: row.og_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Todos, settings and SEO entries kept in one SQLite database.
///
/// The store traits are synchronous, so every call blocks on the runtime the
/// store was opened on. Call them from blocking threads such as
/// [tokio::task::spawn_blocking], never from inside an async task.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    handle: Handle,
}

impl SqliteStore {
    /// Opens the database file, creating it and its parent directory when missing.
    pub async fn connect(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory {parent:?}"))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {path:?}"))?;
        debug!("Opened database {:?}", path);
        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database that lives as long as the store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database options")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;
        Self::from_pool(pool).await
    }

    /// Wraps an open pool, creating the tables that do not exist yet.
    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .context("Failed to create database schema")?;
        }
        Ok(Self {
            pool,
            handle: Handle::current(),
        })
    }

    fn run<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        self.handle
            .block_on(query)
            .map_err(|err| Error::storage(err.to_string()))
    }

    fn find_todo(&self, id: i64) -> Result<Option<Todo>> {
        let row = self.run(
            sqlx::query_as::<_, TodoRow>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool),
        )?;
        Ok(row.map(Todo::from))
    }
}

impl TodoStore for SqliteStore {
    fn all(&self) -> Result<Vec<Todo>> {
        let rows = self.run(
            sqlx::query_as::<_, TodoRow>(&format!(
                "SELECT {TODO_COLUMNS} FROM todos ORDER BY id DESC"
            ))
            .fetch_all(&self.pool),
        )?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    fn find(&self, id: u64) -> Result<Option<Todo>> {
        match i64::try_from(id) {
            Ok(id) => self.find_todo(id),
            Err(_) => Ok(None),
        }
    }

    fn create(&self, title: String) -> Result<Todo> {
        let now = Utc::now();
        let row = self.run(
            sqlx::query_as::<_, TodoRow>(&format!(
                "INSERT INTO todos (title, completed, created_at, updated_at) \
                 VALUES (?, 0, ?, ?) RETURNING {TODO_COLUMNS}"
            ))
            .bind(title)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool),
        )?;
        Ok(row.into())
    }

    fn update(&self, id: u64, changes: TodoChanges) -> Result<Option<Todo>> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        if changes.is_empty() {
            return self.find_todo(id);
        }
        let row = self.run(
            sqlx::query_as::<_, TodoRow>(&format!(
                "UPDATE todos SET title = COALESCE(?, title), completed = COALESCE(?, completed), \
                 updated_at = ? WHERE id = ? RETURNING {TODO_COLUMNS}"
            ))
            .bind(changes.title)
            .bind(changes.completed)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool),
        )?;
        Ok(row.map(Todo::from))
    }

    fn delete(&self, id: u64) -> Result<bool> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(false);
        };
        let result = self.run(
            sqlx::query("DELETE FROM todos WHERE id = ?")
                .bind(id)
                .execute(&self.pool),
        )?;
        Ok(result.rows_affected() > 0)
    }
}

impl SettingStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.run(
            sqlx::query_scalar::<_, Option<String>>("SELECT value FROM settings WHERE \"key\" = ?")
                .bind(key)
                .fetch_optional(&self.pool),
        )?;
        Ok(value.flatten())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let now = Utc::now();
        self.run(
            sqlx::query(
                "INSERT INTO settings (\"key\", value, created_at, updated_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT (\"key\") DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .bind(now)
            .execute(&self.pool),
        )?;
        Ok(())
    }
}

impl SeoStore for SqliteStore {
    fn all(&self) -> Result<Vec<SeoEntry>> {
        let rows = self.run(
            sqlx::query_as::<_, SeoRow>(&format!("SELECT {SEO_COLUMNS} FROM seo ORDER BY id"))
                .fetch_all(&self.pool),
        )?;
        Ok(rows.into_iter().map(SeoEntry::from).collect())
    }

    fn find_by_path(&self, path: &str) -> Result<Option<SeoEntry>> {
        let row = self.run(
            sqlx::query_as::<_, SeoRow>(&format!("SELECT {SEO_COLUMNS} FROM seo WHERE path = ?"))
                .bind(path)
                .fetch_optional(&self.pool),
        )?;
        Ok(row.map(SeoEntry::from))
    }

    fn upsert(&self, changes: SeoChanges) -> Result<SeoEntry> {
        let now = Utc::now();
        let row = self.run(
            sqlx::query_as::<_, SeoRow>(&format!(
                "INSERT INTO seo (path, title, description, keywords, og_image, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (path) DO UPDATE SET title = excluded.title, \
                 description = excluded.description, keywords = excluded.keywords, \
                 og_image = excluded.og_image, updated_at = excluded.updated_at \
                 RETURNING {SEO_COLUMNS}"
            ))
            .bind(changes.path)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.keywords)
            .bind(changes.og_image)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool),
        )?;
        Ok(row.into())
    }
}
