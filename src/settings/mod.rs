//! Structured configuration store backed by SQLite.
//!
//! Keys are addressed by `(Scope, key)`. Every key must be declared in the
//! store's [`SchemaDefaults`]; reads of a key with no stored row return the
//! declared default. Writers that change a value notify the subscribers of
//! that exact key.

use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::Sender;
use tracing::debug;

mod error;
mod handle;
mod schema;

pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use handle::{SchemaCache, Settings};
pub use schema::{SchemaDefaults, Scope, SettingValue};

fn map_store_io(
    fallback: StoreErrorCode,
    context: impl FnOnce() -> String,
) -> impl FnOnce(std::io::Error) -> StoreError {
    move |error| StoreError::from_io_error(fallback, context(), error)
}

fn map_store_sqlite(
    fallback: StoreErrorCode,
    context: impl FnOnce() -> String,
) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |error| StoreError::from_sqlite_error(fallback, context(), error)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub scope: Scope,
    pub key: String,
}

type Subscribers = HashMap<(Scope, String), Vec<Sender<SettingChange>>>;

pub struct SettingsStore {
    conn: Connection,
    defaults: SchemaDefaults,
    subscribers: RefCell<Subscribers>,
}

impl SettingsStore {
    pub fn open(path: &Path, defaults: SchemaDefaults) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(map_store_io(
                StoreErrorCode::DataDirUnavailable,
                || "Failed to create data dir".to_string(),
            ))?;
        }
        let conn = Connection::open(path).map_err(map_store_sqlite(
            StoreErrorCode::OpenFailed,
            || format!("Failed to open settings db {}", path.display()),
        ))?;
        Self::with_connection(conn, defaults)
    }

    pub fn open_in_memory(defaults: SchemaDefaults) -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_store_sqlite(
            StoreErrorCode::OpenFailed,
            || "Failed to open in-memory settings db".to_string(),
        ))?;
        Self::with_connection(conn, defaults)
    }

    fn with_connection(conn: Connection, defaults: SchemaDefaults) -> StoreResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn,
            defaults,
            subscribers: RefCell::new(HashMap::new()),
        })
    }

    pub fn defaults(&self) -> &SchemaDefaults {
        &self.defaults
    }

    fn declared(&self, scope: &Scope, key: &str) -> StoreResult<&SettingValue> {
        self.defaults
            .default_for(scope.schema_id(), key)
            .ok_or_else(|| {
                StoreError::new(
                    StoreErrorCode::UnknownKey,
                    format!("Schema {} has no such key '{key}'", scope.schema_id()),
                )
            })
    }

    fn stored(&self, scope: &Scope, key: &str) -> StoreResult<Option<SettingValue>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE scope = ?1 AND key = ?2",
                params![scope.storage_key(), key],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_store_sqlite(StoreErrorCode::ReadFailed, || {
                format!("Failed to read setting {scope}/{key}")
            }))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|error| {
            StoreError::from_external_message(format!(
                "Failed to parse setting {scope}/{key}: {error}"
            ))
        })?;
        Ok(Some(value))
    }

    /// Current value, falling back to the schema default. `None` only for
    /// keys the schema does not declare.
    pub fn get(&self, scope: &Scope, key: &str) -> StoreResult<Option<SettingValue>> {
        let Some(default) = self.defaults.default_for(scope.schema_id(), key) else {
            return Ok(None);
        };
        match self.stored(scope, key)? {
            Some(value) => Ok(Some(value)),
            None => Ok(Some(default.clone())),
        }
    }

    pub fn set(&self, scope: &Scope, key: &str, value: SettingValue) -> StoreResult<()> {
        let declared = self.declared(scope, key)?;
        if !declared.same_type(&value) {
            return Err(StoreError::new(
                StoreErrorCode::TypeMismatch,
                format!(
                    "Key {scope}/{key} expects a value of type {}, got {}",
                    declared.type_name(),
                    value.type_name()
                ),
            ));
        }
        if self.get(scope, key)?.as_ref() == Some(&value) {
            return Ok(());
        }
        let payload = serde_json::to_string(&value).map_err(|error| {
            StoreError::from_external_message(format!(
                "Failed to serialize setting {scope}/{key}: {error}"
            ))
        })?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (scope, key, value) VALUES (?1, ?2, ?3)",
                params![scope.storage_key(), key, payload],
            )
            .map_err(map_store_sqlite(StoreErrorCode::WriteFailed, || {
                format!("Failed to store setting {scope}/{key}")
            }))?;
        self.notify(scope, key);
        Ok(())
    }

    /// Drops any stored value so reads see the schema default again.
    pub fn reset(&self, scope: &Scope, key: &str) -> StoreResult<()> {
        self.declared(scope, key)?;
        let removed = self
            .conn
            .execute(
                "DELETE FROM settings WHERE scope = ?1 AND key = ?2",
                params![scope.storage_key(), key],
            )
            .map_err(map_store_sqlite(StoreErrorCode::WriteFailed, || {
                format!("Failed to reset setting {scope}/{key}")
            }))?;
        if removed > 0 {
            self.notify(scope, key);
        }
        Ok(())
    }

    pub fn is_modified(&self, scope: &Scope, key: &str) -> StoreResult<bool> {
        Ok(self.stored(scope, key)?.is_some())
    }

    pub fn subscribe(&self, scope: &Scope, key: &str, tx: Sender<SettingChange>) {
        self.subscribers
            .borrow_mut()
            .entry((scope.clone(), key.to_string()))
            .or_default()
            .push(tx);
    }

    fn notify(&self, scope: &Scope, key: &str) {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(senders) = subscribers.get_mut(&(scope.clone(), key.to_string())) else {
            return;
        };
        senders.retain(|tx| {
            tx.send(SettingChange {
                scope: scope.clone(),
                key: key.to_string(),
            })
            .is_ok()
        });
        if senders.is_empty() {
            debug!("no live subscribers left for {scope}/{key}");
            subscribers.remove(&(scope.clone(), key.to_string()));
        }
    }

    pub fn get_string(&self, scope: &Scope, key: &str) -> StoreResult<String> {
        match self.get(scope, key)? {
            Some(SettingValue::String(value)) => Ok(value),
            Some(other) => Err(type_mismatch(scope, key, "string", &other)),
            None => Ok(String::new()),
        }
    }

    pub fn get_strv(&self, scope: &Scope, key: &str) -> StoreResult<Vec<String>> {
        match self.get(scope, key)? {
            Some(SettingValue::StringList(value)) => Ok(value),
            Some(other) => Err(type_mismatch(scope, key, "string list", &other)),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_int(&self, scope: &Scope, key: &str) -> StoreResult<i64> {
        match self.get(scope, key)? {
            Some(SettingValue::Int(value)) => Ok(value),
            Some(other) => Err(type_mismatch(scope, key, "int", &other)),
            None => Ok(0),
        }
    }

    pub fn get_bool(&self, scope: &Scope, key: &str) -> StoreResult<bool> {
        match self.get(scope, key)? {
            Some(SettingValue::Bool(value)) => Ok(value),
            Some(other) => Err(type_mismatch(scope, key, "bool", &other)),
            None => Ok(false),
        }
    }
}

fn type_mismatch(scope: &Scope, key: &str, wanted: &str, found: &SettingValue) -> StoreError {
    StoreError::new(
        StoreErrorCode::TypeMismatch,
        format!(
            "Key {scope}/{key} expects a value of type {wanted}, found {}",
            found.type_name()
        ),
    )
}

fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS settings (
            scope TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope, key)
        );",
    )
    .map_err(map_store_sqlite(StoreErrorCode::SchemaInitFailed, || {
        "Failed to init schema".to_string()
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const SCHEMA: &str = "org.example.test";

    fn store() -> SettingsStore {
        let mut defaults = SchemaDefaults::new();
        defaults
            .declare(SCHEMA, "names", SettingValue::strv(["a"]))
            .declare(SCHEMA, "title", SettingValue::String("untitled".into()))
            .declare(SCHEMA, "count", SettingValue::Int(3));
        SettingsStore::open_in_memory(defaults).unwrap()
    }

    #[test]
    fn reads_default_until_written() {
        let store = store();
        let scope = Scope::schema(SCHEMA);
        assert_eq!(store.get_strv(&scope, "names").unwrap(), vec!["a"]);
        store
            .set(&scope, "names", SettingValue::strv(["b", "c"]))
            .unwrap();
        assert_eq!(store.get_strv(&scope, "names").unwrap(), vec!["b", "c"]);
        assert!(store.is_modified(&scope, "names").unwrap());
        store.reset(&scope, "names").unwrap();
        assert_eq!(store.get_strv(&scope, "names").unwrap(), vec!["a"]);
    }

    #[test]
    fn path_scoped_instances_are_independent() {
        let store = store();
        let one = Scope::with_path(SCHEMA, "/one/");
        let two = Scope::with_path(SCHEMA, "/two/");
        store
            .set(&one, "title", SettingValue::String("first".into()))
            .unwrap();
        assert_eq!(store.get_string(&one, "title").unwrap(), "first");
        assert_eq!(store.get_string(&two, "title").unwrap(), "untitled");
    }

    #[test]
    fn rejects_undeclared_keys_and_wrong_types() {
        let store = store();
        let scope = Scope::schema(SCHEMA);
        let err = store
            .set(&scope, "missing", SettingValue::Bool(true))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::UnknownKey);
        let err = store
            .set(&scope, "count", SettingValue::String("x".into()))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::TypeMismatch);
        assert_eq!(store.get(&scope, "missing").unwrap(), None);
    }

    #[test]
    fn notifies_only_on_real_changes() {
        let store = store();
        let scope = Scope::schema(SCHEMA);
        let (tx, rx) = mpsc::channel();
        store.subscribe(&scope, "count", tx);

        store.set(&scope, "count", SettingValue::Int(3)).unwrap();
        assert!(rx.try_recv().is_err());

        store.set(&scope, "count", SettingValue::Int(4)).unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, "count");
        assert_eq!(change.scope, scope);

        store.reset(&scope, "count").unwrap();
        assert!(rx.try_recv().is_ok());
        store.reset(&scope, "count").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let store = store();
        let scope = Scope::schema(SCHEMA);
        let (tx, rx) = mpsc::channel();
        store.subscribe(&scope, "count", tx);
        drop(rx);
        store.set(&scope, "count", SettingValue::Int(9)).unwrap();
        assert!(store.subscribers.borrow().is_empty());
    }
}
