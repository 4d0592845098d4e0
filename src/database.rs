use libsql::{Builder, Connection, Database};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::PersistenceError;

const CREATE_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL,
    description  TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT    NOT NULL,
    description  TEXT,
    amount       TEXT    NOT NULL,
    category_id  INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_EXPENSES_CATEGORY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_expenses_category_id ON expenses(category_id);";

/// Data store gateway.
///
/// Holds only the store location. The database file is opened on first use,
/// so an unreachable store surfaces as a [`PersistenceError`] from the first
/// operation instead of at construction. Every operation opens its own
/// connection and drops it before returning, whatever the outcome.
pub struct Gateway {
    db: OnceCell<Database>,
    location: PathBuf,
}

impl Gateway {
    /// Gateway for the database described by `config`. Never touches the disk.
    pub fn open(config: &Config) -> Self {
        Self::open_path(config.database_location())
    }

    pub fn open_path(path: impl AsRef<Path>) -> Self {
        Gateway {
            db: OnceCell::new(),
            location: path.as_ref().to_path_buf(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Builds the database handle on first use: creates the parent directory
    /// and the tables. A failed attempt is retried on the next call.
    async fn database(&self) -> Result<&Database, PersistenceError> {
        self.db
            .get_or_try_init(|| async {
                if let Some(dir) = self.location.parent().filter(|d| !d.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|e| PersistenceError::open(&self.location, e))?;
                }
                let db = Builder::new_local(&self.location)
                    .build()
                    .await
                    .map_err(|e| PersistenceError::open(&self.location, e))?;
                let conn = db.connect().map_err(PersistenceError::Connection)?;
                create_schema(&conn).await?;
                Ok::<Database, PersistenceError>(db)
            })
            .await
    }

    /// Fresh connection with foreign key enforcement switched on.
    pub(crate) async fn connect(&self) -> Result<Connection, PersistenceError> {
        let conn = self
            .database()
            .await?
            .connect()
            .map_err(PersistenceError::Connection)?;
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(PersistenceError::Connection)?;
        Ok(conn)
    }

    /// Idempotent table bootstrap. Also runs implicitly on first use.
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.connect().await?;
        create_schema(&conn).await
    }

    /// Round-trips a trivial query to prove the store is reachable.
    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        let conn = self.connect().await?;
        let mut rows = conn.query("SELECT 1", ()).await?;
        match rows.next().await? {
            Some(row) => {
                let one: i64 = row.get(0)?;
                if one == 1 {
                    Ok(())
                } else {
                    Err(PersistenceError::mapping("1", format!("expected 1, got {}", one)))
                }
            }
            None => Err(PersistenceError::mapping("1", "health check returned no row")),
        }
    }
}

async fn create_schema(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute(CREATE_CATEGORIES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_CATEGORY_INDEX, ()).await?;
    Ok(())
}

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub(crate) fn to_db_timestamp(value: OffsetDateTime) -> i64 {
    // Unix nanoseconds fit in i64 until the year 2262
    value.unix_timestamp_nanos() as i64
}

pub(crate) fn from_db_timestamp(
    column: &'static str,
    nanos: i64,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .map_err(|e| PersistenceError::mapping(column, e))
}

/// Shared handle passed to the HTTP handlers.
pub type Store = std::sync::Arc<Gateway>;
