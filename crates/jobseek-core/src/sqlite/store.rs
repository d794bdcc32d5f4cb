use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{CoreError, CoreErrorKind};
use crate::persistence::{KeyValueStore, PersistenceResult};
use crate::sqlite::migrations::{latest_schema_version, schema_steps};

/// Slot storage in a single SQLite file. A fresh connection is opened per
/// call; callers run [`SqliteStore::migrate_to_latest`] once at startup.
pub struct SqliteStore {
    database_path: PathBuf,
}

impl SqliteStore {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    pub fn schema_version(&self) -> PersistenceResult<i64> {
        let connection = self.connect("schema_version")?;
        read_user_version(&connection).map_err(|error| storage_failure("schema_version", error))
    }

    /// Applies every pending step in one transaction. Running it on an
    /// up-to-date database is a no-op.
    pub fn migrate_to_latest(&self) -> PersistenceResult<()> {
        let mut connection = self.connect("migrate")?;
        let transaction = connection
            .transaction()
            .map_err(|error| storage_failure("migrate", error))?;

        let current = read_user_version(&transaction)
            .map_err(|error| storage_failure("migrate", error))?;
        if current > latest_schema_version() {
            return Err(storage_failure(
                "migrate",
                format!(
                    "database schema version {current} is newer than supported version {}",
                    latest_schema_version()
                ),
            ));
        }

        for step in schema_steps().iter().filter(|step| step.version > current) {
            transaction
                .execute_batch(step.sql)
                .and_then(|()| transaction.pragma_update(None, "user_version", step.version))
                .map_err(|error| storage_failure(step.name, error))?;
            tracing::debug!(
                version = step.version,
                name = step.name,
                database = %self.database_path.display(),
                "applied schema step"
            );
        }

        transaction
            .commit()
            .map_err(|error| storage_failure("migrate", error))
    }

    fn connect(&self, operation: &str) -> PersistenceResult<Connection> {
        if let Some(parent) = self
            .database_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|error| storage_failure(operation, error))?;
        }
        Connection::open(&self.database_path).map_err(|error| storage_failure(operation, error))
    }

    fn connect_ready(&self, operation: &str) -> PersistenceResult<Connection> {
        let connection = self.connect(operation)?;
        let version =
            read_user_version(&connection).map_err(|error| storage_failure(operation, error))?;
        if version < latest_schema_version() {
            return Err(storage_failure(
                operation,
                format!("schema is at version {version}; run migrate_to_latest first"),
            ));
        }
        Ok(connection)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        self.connect_ready("get")?
            .query_row(
                "SELECT slot_value FROM kv_slots WHERE slot_key = ?1",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|error| storage_failure("get", error))
    }

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        self.connect_ready("set")?
            .execute(
                "INSERT INTO kv_slots (slot_key, slot_value, updated_at_unix)
                 VALUES (?1, ?2, unixepoch())
                 ON CONFLICT(slot_key) DO UPDATE SET
                     slot_value = excluded.slot_value,
                     updated_at_unix = excluded.updated_at_unix",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|error| storage_failure("set", error))
    }
}

fn read_user_version(connection: &Connection) -> rusqlite::Result<i64> {
    connection.pragma_query_value(None, "user_version", |row| row.get(0))
}

fn storage_failure(operation: &str, detail: impl Display) -> CoreError {
    CoreError::new(
        CoreErrorKind::StorageFailure,
        format!("sqlite slot store {operation} failed: {detail}"),
    )
}
