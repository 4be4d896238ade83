use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{DROP_SCHEMA, SCHEMA, TABLES};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Applied to every pooled connection. SQLite leaves foreign keys off by default.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// An in-memory database is private to its connection, so memory pools
    /// hold exactly one connection and every caller shares it.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (manager, in_memory) = Self::create_connection_manager(path);
        let manager = manager.with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        let builder = if in_memory {
            Pool::builder().max_size(1)
        } else {
            Pool::builder()
        };
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;

        Ok(Self { pool })
    }

    /// Create appropriate connection manager based on path
    ///
    /// # Arguments
    /// * `path` - Database file path or ":memory:" for in-memory database
    ///
    /// # Returns
    /// * the manager and whether it targets memory
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> (SqliteConnectionManager, bool) {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            (SqliteConnectionManager::memory(), true)
        } else {
            (SqliteConnectionManager::file(trimmed_path), false)
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Create all tables. Safe to run repeatedly.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Drop all tables.
    pub fn drop_all(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DROP_SCHEMA)
            .context("Failed to drop database schema")?;
        Ok(())
    }

    /// Delete every row while keeping the tables.
    pub fn clear(&self) -> Result<()> {
        let conn = self.connection()?;
        // users cascades into everything else
        conn.execute_batch("DELETE FROM users; DELETE FROM sqlite_sequence;")
            .context("Failed to clear database")?;
        Ok(())
    }

    /// Row count for every table, in creation order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let conn = self.connection()?;
        TABLES
            .iter()
            .map(|table| {
                let count: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                    .with_context(|| format!("Failed to count rows in {table}"))?;
                Ok((*table, count))
            })
            .collect()
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
