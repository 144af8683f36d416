// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).
//!
//! Each store module exposes free functions generic over the sqlx executor,
//! so the same operation runs on the pool or inside a transaction:
//!
//! ```ignore
//! let mut tx = db.begin().await?;
//! let member = members::find_by_email(&mut *tx, email).await?;
//! tx.commit().await?;
//! ```
//!
//! Dropping an uncommitted transaction rolls it back.

pub mod categories;
pub mod external_details;
pub mod members;
pub mod oauth_tokens;
pub mod schedules;
pub mod subscriptions;

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default and maximum page sizes for paged queries.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Table names as constants.
pub mod tables {
    pub const MEMBERS: &str = "members";
    pub const CATEGORIES: &str = "categories";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const EXTERNAL_CATEGORY_DETAILS: &str = "external_category_details";
    pub const SCHEDULES: &str = "schedules";
    pub const OAUTH_TOKENS: &str = "oauth_tokens";
}

/// Offset/limit paging with a 0-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page).saturating_mul(i64::from(self.size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// SQLite connection pool wrapper.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect to the database and apply migrations.
    ///
    /// `sqlite::memory:` URLs get a single long-lived connection, since every
    /// SQLite connection would otherwise see its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        if database_url.contains(":memory:") {
            return Self::connect_in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", database_url, e)))?;

        tracing::info!(url = database_url, "Connected to SQLite");

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create a private in-memory database (tests, local experiments).
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        tracing::debug!("Connected to in-memory SQLite");

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction. Rolled back on drop unless committed.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    /// Open a transaction that takes the write lock up front (`BEGIN IMMEDIATE`).
    ///
    /// Required for check-then-write sequences on the WAL file database: reads
    /// inside it always see the latest committed data.
    pub async fn begin_immediate(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    async fn run_migrations(&self) -> Result<(), AppError> {
        tracing::info!("Running database migrations");
        execute_sql(&self.pool, include_str!("../../migrations/001_initial.sql")).await?;
        Ok(())
    }
}

/// Execute a SQL migration file statement by statement, skipping comment lines.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<(), AppError> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Whether a failed write lost to a concurrent writer: a UNIQUE violation,
/// or SQLite reporting the database busy / the read snapshot stale.
pub(crate) fn is_write_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || matches!(
                    db_err.code().as_deref(),
                    Some(SQLITE_BUSY) | Some(SQLITE_BUSY_SNAPSHOT)
                )
        }
        _ => false,
    }
}

const SQLITE_BUSY: &str = "5";
const SQLITE_BUSY_SNAPSHOT: &str = "517";

/// `DELETE FROM {table} WHERE {column} IN (ids...)`, returning rows affected.
pub(crate) async fn delete_where_in<'e, E>(
    executor: E,
    table: &str,
    column: &str,
    ids: &[i64],
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("DELETE FROM {} WHERE {} IN (", table, column));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let result = builder.build().execute(executor).await?;
    Ok(result.rows_affected())
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
///
/// Use together with `ESCAPE '\'`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
