//! SQLite connection factory for the endpoint store.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! for SQLite. Connections are cheap, so one is opened per operation.

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

use super::util::connection_error;

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Async SQLite connection using SyncConnectionWrapper.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

/// Tables backing [`crate::schema`].
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS endpoints (
    access_url TEXT PRIMARY KEY NOT NULL,
    status TEXT NOT NULL,
    triples_amount BIGINT,
    classes_amount BIGINT,
    signature TEXT,
    document TEXT NOT NULL,
    schema_version INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_endpoints_status ON endpoints(status);
CREATE INDEX IF NOT EXISTS idx_endpoints_signature ON endpoints(signature);
CREATE TABLE IF NOT EXISTS endpoint_domains (
    access_url TEXT NOT NULL REFERENCES endpoints(access_url) ON DELETE CASCADE,
    domain TEXT NOT NULL,
    PRIMARY KEY (access_url, domain)
);
CREATE INDEX IF NOT EXISTS idx_endpoint_domains_domain ON endpoint_domains(domain);
"#;

#[derive(Clone)]
pub struct AsyncSqlitePool {
    database_url: String,
}

impl AsyncSqlitePool {
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present for diesel
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    pub fn from_path(db_path: &Path) -> Self {
        Self::new(&db_path.display().to_string())
    }

    /// Open a connection with foreign keys enforced.
    pub async fn get(&self) -> Result<AsyncSqliteConnection, DieselError> {
        let mut conn = AsyncSqliteConnection::establish(&self.database_url)
            .await
            .map_err(|e| connection_error(&e, &self.database_url))?;
        conn.batch_execute("PRAGMA foreign_keys = ON;").await?;
        Ok(conn)
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.get().await?;
        conn.batch_execute(SCHEMA_SQL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};

    #[tokio::test]
    async fn test_open_failure_names_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("missing").join("census.db");
        let pool = AsyncSqlitePool::from_path(&db_path);

        match pool.get().await {
            Err(DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)) => {
                let expected = format!("database: {}", db_path.display());
                assert_eq!(info.details(), Some(expected.as_str()));
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("opened a database in a missing directory"),
        }
    }
}
