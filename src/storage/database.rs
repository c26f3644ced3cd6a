//! Document store on SQLite.
//!
//! Documents live in owner-scoped collections. Every committed write pushes a
//! fresh snapshot to the live queries open on the written collection, which
//! makes the database a [`CollectionSource`] for the data store.

use crate::observer::{lock, ListenerRegistry, Subscription};
use crate::storage::schema::{CURRENT_VERSION, MIGRATION_V1_TO_V2, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::store::collections::{Collection, Direction, OrderSpec};
use crate::store::source::{CollectionSource, Document, Snapshot, SnapshotListener, SourceError};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Result as SqliteResult};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

type ListenerKey = (String, Collection);

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    listeners: Arc<Mutex<HashMap<ListenerKey, ListenerRegistry<()>>>>,
}

/// A row of the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            listeners: Arc::new(Mutex::new(HashMap::new())),
        };
        db.initialize()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.conn)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn()
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn().query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        let conn = self.conn();

        if from_version < 1 {
            conn.execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            record_version(&conn, 1)?;
        }

        if from_version < 2 {
            conn.execute_batch(MIGRATION_V1_TO_V2)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            record_version(&conn, 2)?;
        }

        tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        Ok(())
    }

    // ========== Documents ==========

    /// Insert a document, generating an id when it has none. Returns the id.
    pub fn add_document(
        &self,
        owner: &str,
        collection: Collection,
        document: &Document,
    ) -> Result<String, DatabaseError> {
        let id = if document.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            document.id.clone()
        };
        let data_json = serde_json::to_string(&document.fields)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO documents (owner_id, collection, id, data_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![owner, collection.name(), id, data_json, now],
            )
            .map_err(map_write_error)?;

        self.publish(owner, collection);
        Ok(id)
    }

    /// Insert or replace a document by id.
    pub fn put_document(
        &self,
        owner: &str,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DatabaseError> {
        if document.id.is_empty() {
            return Err(DatabaseError::ConstraintViolation(
                "document id is required".to_string(),
            ));
        }
        let data_json = serde_json::to_string(&document.fields)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO documents (owner_id, collection, id, data_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(owner_id, collection, id)
                 DO UPDATE SET data_json = excluded.data_json, updated_at = excluded.updated_at",
                params![owner, collection.name(), document.id, data_json, now],
            )
            .map_err(map_write_error)?;

        self.publish(owner, collection);
        Ok(())
    }

    /// Replace an existing document. Fails with `NotFound` if it is absent.
    pub fn update_document(
        &self,
        owner: &str,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DatabaseError> {
        let data_json = serde_json::to_string(&document.fields)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        let rows_affected = self
            .conn()
            .execute(
                "UPDATE documents SET data_json = ?1, updated_at = ?2
                 WHERE owner_id = ?3 AND collection = ?4 AND id = ?5",
                params![
                    data_json,
                    Utc::now().to_rfc3339(),
                    owner,
                    collection.name(),
                    document.id
                ],
            )
            .map_err(map_write_error)?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("{} {}", collection, document.id)));
        }

        self.publish(owner, collection);
        Ok(())
    }

    /// Get a document by id.
    pub fn get_document(
        &self,
        owner: &str,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DatabaseError> {
        let data_json: Option<String> = self
            .conn()
            .query_row(
                "SELECT data_json FROM documents WHERE owner_id = ?1 AND collection = ?2 AND id = ?3",
                params![owner, collection.name(), id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        data_json
            .map(|json| parse_document(id.to_string(), &json))
            .transpose()
    }

    /// List a collection, optionally ordered by one field.
    ///
    /// Ties (and unordered lists) keep insertion order.
    pub fn list_documents(
        &self,
        owner: &str,
        collection: Collection,
        order: Option<&OrderSpec>,
    ) -> Result<Vec<Document>, DatabaseError> {
        query_documents(&self.conn(), owner, collection, order)
    }

    /// Documents whose string field `field` equals `value`.
    pub fn find_by_field(
        &self,
        owner: &str,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, DatabaseError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, data_json FROM documents
                 WHERE owner_id = ?1 AND collection = ?2 AND json_extract(data_json, ?3) = ?4
                 ORDER BY rowid ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows: Vec<(String, String)> = stmt
            .query_map(
                params![owner, collection.name(), json_path(field), value],
                id_and_json,
            )
            .and_then(|rows| rows.collect())
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|(id, json)| parse_document(id, &json))
            .collect()
    }

    /// Delete a document. Returns whether it existed.
    pub fn delete_document(
        &self,
        owner: &str,
        collection: Collection,
        id: &str,
    ) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM documents WHERE owner_id = ?1 AND collection = ?2 AND id = ?3",
                params![owner, collection.name(), id],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if deleted > 0 {
            self.publish(owner, collection);
        }
        Ok(deleted > 0)
    }

    /// Delete several documents in one transaction.
    ///
    /// Either every listed document is removed or none is. A busy database is
    /// retried once. Returns the number of rows removed.
    pub fn delete_batch(
        &self,
        owner: &str,
        targets: &[(Collection, String)],
    ) -> Result<usize, DatabaseError> {
        let deleted = match self.try_delete_batch(owner, targets) {
            Err(DatabaseError::Busy(message)) => {
                tracing::warn!("Batch delete hit a busy database ({}), retrying", message);
                self.try_delete_batch(owner, targets)?
            }
            other => other?,
        };

        let touched: BTreeSet<Collection> = targets.iter().map(|(c, _)| *c).collect();
        for collection in touched {
            self.publish(owner, collection);
        }
        Ok(deleted)
    }

    fn try_delete_batch(
        &self,
        owner: &str,
        targets: &[(Collection, String)],
    ) -> Result<usize, DatabaseError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(map_transaction_error)?;

        let mut deleted = 0;
        for (collection, id) in targets {
            deleted += tx
                .execute(
                    "DELETE FROM documents WHERE owner_id = ?1 AND collection = ?2 AND id = ?3",
                    params![owner, collection.name(), id],
                )
                .map_err(map_transaction_error)?;
        }

        tx.commit().map_err(map_transaction_error)?;
        Ok(deleted)
    }

    /// Replace every document and setting of `owner` in one transaction.
    ///
    /// Documents without an id get a fresh one. Each collection's live
    /// queries are refreshed once, after the commit. A busy database is
    /// retried once.
    pub fn replace_owner_data(
        &self,
        owner: &str,
        documents: &[(Collection, Document)],
        settings: &BTreeMap<String, String>,
    ) -> Result<(), DatabaseError> {
        match self.try_replace_owner_data(owner, documents, settings) {
            Err(DatabaseError::Busy(message)) => {
                tracing::warn!("Replace hit a busy database ({}), retrying", message);
                self.try_replace_owner_data(owner, documents, settings)?
            }
            other => other?,
        }

        for collection in Collection::ALL {
            self.publish(owner, collection);
        }
        Ok(())
    }

    fn try_replace_owner_data(
        &self,
        owner: &str,
        documents: &[(Collection, Document)],
        settings: &BTreeMap<String, String>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(map_transaction_error)?;

        tx.execute("DELETE FROM documents WHERE owner_id = ?1", params![owner])
            .map_err(map_transaction_error)?;
        tx.execute("DELETE FROM settings WHERE owner_id = ?1", params![owner])
            .map_err(map_transaction_error)?;

        for (collection, document) in documents {
            let id = if document.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                document.id.clone()
            };
            let data_json = serde_json::to_string(&document.fields)
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
            tx.execute(
                "INSERT INTO documents (owner_id, collection, id, data_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(owner_id, collection, id)
                 DO UPDATE SET data_json = excluded.data_json, updated_at = excluded.updated_at",
                params![owner, collection.name(), id, data_json, now],
            )
            .map_err(map_transaction_error)?;
        }

        for (key, value) in settings {
            tx.execute(
                "INSERT INTO settings (owner_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![owner, key, value, now],
            )
            .map_err(map_transaction_error)?;
        }

        tx.commit().map_err(map_transaction_error)?;
        Ok(())
    }

    /// Count documents in a collection.
    pub fn count_documents(&self, owner: &str, collection: Collection) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE owner_id = ?1 AND collection = ?2",
                params![owner, collection.name()],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    // ========== Settings ==========

    pub fn get_setting(&self, owner: &str, key: &str) -> Result<Option<String>, DatabaseError> {
        self.conn()
            .query_row(
                "SELECT value FROM settings WHERE owner_id = ?1 AND key = ?2",
                params![owner, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    pub fn set_setting(&self, owner: &str, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO settings (owner_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(owner_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![owner, key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    pub fn all_settings(&self, owner: &str) -> Result<BTreeMap<String, String>, DatabaseError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT key, value FROM settings WHERE owner_id = ?1")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let settings = rows
            .collect::<SqliteResult<BTreeMap<_, _>>>()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(settings)
    }

    // ========== Users ==========

    pub fn insert_user(&self, user: &UserRow) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO users (id, email, display_name, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.email,
                    user.display_name,
                    user.password_hash,
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(map_write_error)?;
        Ok(())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        self.query_user("SELECT id, email, display_name, password_hash FROM users WHERE email = ?1", email)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>, DatabaseError> {
        self.query_user("SELECT id, email, display_name, password_hash FROM users WHERE id = ?1", id)
    }

    fn query_user(&self, sql: &str, key: &str) -> Result<Option<UserRow>, DatabaseError> {
        self.conn()
            .query_row(sql, params![key], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                    password_hash: row.get(3)?,
                })
            })
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    pub fn update_user_display_name(&self, id: &str, display_name: &str) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn()
            .execute(
                "UPDATE users SET display_name = ?1 WHERE id = ?2",
                params![display_name, id],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    // ========== Live queries ==========

    /// Push fresh snapshots to every live query on (owner, collection).
    fn publish(&self, owner: &str, collection: Collection) {
        let registry = lock(&self.listeners)
            .get(&(owner.to_string(), collection))
            .cloned();
        if let Some(registry) = registry {
            registry.notify(&());
        }
    }

    /// Number of live queries open on (owner, collection).
    pub fn live_queries(&self, owner: &str, collection: Collection) -> usize {
        lock(&self.listeners)
            .get(&(owner.to_string(), collection))
            .map(ListenerRegistry::len)
            .unwrap_or(0)
    }
}

impl CollectionSource for Database {
    fn subscribe(
        &self,
        owner: &str,
        collection: Collection,
        order: Option<OrderSpec>,
        listener: SnapshotListener,
    ) -> Subscription {
        let conn = Arc::downgrade(&self.conn);
        let owner_id = owner.to_string();

        let deliver = Arc::new(move || {
            let Some(conn) = conn.upgrade() else {
                return;
            };
            let result = query_documents(&lock(&conn), &owner_id, collection, order.as_ref())
                .map(Snapshot::new)
                .map_err(|e| SourceError::ListenerFailed {
                    collection,
                    message: e.to_string(),
                });
            listener(result);
        });

        let key = (owner.to_string(), collection);
        let on_change = Arc::clone(&deliver);
        // Registered and pruned under the map lock.
        let mut registration = lock(&self.listeners)
            .entry(key.clone())
            .or_default()
            .add(move |_| on_change());

        deliver();

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            registration.unsubscribe();
            if let Some(listeners) = listeners.upgrade() {
                let mut listeners = lock(&listeners);
                if listeners.get(&key).is_some_and(ListenerRegistry::is_empty) {
                    listeners.remove(&key);
                }
            }
        })
    }
}

fn record_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
        [version],
    )
    .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    Ok(())
}

fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

fn query_documents(
    conn: &Connection,
    owner: &str,
    collection: Collection,
    order: Option<&OrderSpec>,
) -> Result<Vec<Document>, DatabaseError> {
    let sql = match order.map(|o| o.direction) {
        None => {
            "SELECT id, data_json FROM documents WHERE owner_id = ?1 AND collection = ?2
             ORDER BY rowid ASC"
        }
        Some(Direction::Ascending) => {
            "SELECT id, data_json FROM documents WHERE owner_id = ?1 AND collection = ?2
             ORDER BY json_extract(data_json, ?3) ASC, rowid ASC"
        }
        Some(Direction::Descending) => {
            "SELECT id, data_json FROM documents WHERE owner_id = ?1 AND collection = ?2
             ORDER BY json_extract(data_json, ?3) DESC, rowid ASC"
        }
    };

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

    let rows: Vec<(String, String)> = match order {
        None => stmt
            .query_map(params![owner, collection.name()], id_and_json)
            .and_then(|rows| rows.collect()),
        Some(order) => stmt
            .query_map(
                params![owner, collection.name(), json_path(&order.field)],
                id_and_json,
            )
            .and_then(|rows| rows.collect()),
    }
    .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

    rows.into_iter()
        .map(|(id, json)| parse_document(id, &json))
        .collect()
}

fn id_and_json(row: &rusqlite::Row<'_>) -> SqliteResult<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn parse_document(id: String, json: &str) -> Result<Document, DatabaseError> {
    let fields: Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| DatabaseError::DeserializationError(format!("Document {}: {}", id, e)))?;
    Ok(Document::new(id, fields))
}

fn map_write_error(e: rusqlite::Error) -> DatabaseError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => DatabaseError::ConstraintViolation(e.to_string()),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            DatabaseError::Busy(e.to_string())
        }
        _ => DatabaseError::QueryFailed(e.to_string()),
    }
}

fn map_transaction_error(e: rusqlite::Error) -> DatabaseError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            DatabaseError::Busy(e.to_string())
        }
        _ => DatabaseError::TransactionFailed(e.to_string()),
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(value: Value) -> Document {
        Document::new("", value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_create_in_memory_database() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let version = db.get_schema_version().expect("Failed to get version");
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let db = Database::open_in_memory().expect("Failed to create database");

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"settings".to_string()));
        assert!(tables.contains(&"users".to_string()));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let file = tempfile::NamedTempFile::new().unwrap();
        {
            let db = Database::open(file.path()).unwrap();
            db.add_document("u1", Collection::Routines, &doc(json!({"name": "Legs"})))
                .unwrap();
        }
        let db = Database::open(file.path()).unwrap();
        assert_eq!(db.count_documents("u1", Collection::Routines).unwrap(), 1);
        assert_eq!(db.get_schema_version().unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_add_get_update_delete() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .add_document("u1", Collection::Routines, &doc(json!({"name": "Push"})))
            .unwrap();

        let fetched = db.get_document("u1", Collection::Routines, &id).unwrap().unwrap();
        assert_eq!(fetched.field_str("name"), Some("Push"));

        let mut changed = fetched.clone();
        changed.fields.insert("name".to_string(), json!("Pull"));
        db.update_document("u1", Collection::Routines, &changed).unwrap();
        let fetched = db.get_document("u1", Collection::Routines, &id).unwrap().unwrap();
        assert_eq!(fetched.field_str("name"), Some("Pull"));

        assert!(db.delete_document("u1", Collection::Routines, &id).unwrap());
        assert!(!db.delete_document("u1", Collection::Routines, &id).unwrap());
        assert!(db.get_document("u1", Collection::Routines, &id).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_document_fails() {
        let db = Database::open_in_memory().unwrap();
        let missing = Document::new("nope", Map::new());
        let result = db.update_document("u1", Collection::Photos, &missing);
        assert!(matches!(result, Err(DatabaseError::NotFound(_))));
    }

    #[test]
    fn test_owner_scoping() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .add_document("u1", Collection::Photos, &doc(json!({"date": "2024-01-01"})))
            .unwrap();

        assert!(db.get_document("u2", Collection::Photos, &id).unwrap().is_none());
        assert!(db.list_documents("u2", Collection::Photos, None).unwrap().is_empty());
    }

    #[test]
    fn test_list_ordering() {
        let db = Database::open_in_memory().unwrap();
        for date in ["2024-01-03", "2024-01-01", "2024-01-02"] {
            db.add_document("u1", Collection::Workouts, &doc(json!({ "date": date })))
                .unwrap();
        }

        let dates: Vec<String> = db
            .list_documents("u1", Collection::Workouts, Some(&OrderSpec::desc("date")))
            .unwrap()
            .iter()
            .map(|d| d.field_str("date").unwrap_or_default().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    #[test]
    fn test_find_by_field() {
        let db = Database::open_in_memory().unwrap();
        db.add_document("u1", Collection::Exercises, &doc(json!({"workoutId": "w1"})))
            .unwrap();
        db.add_document("u1", Collection::Exercises, &doc(json!({"workoutId": "w2"})))
            .unwrap();

        let found = db
            .find_by_field("u1", Collection::Exercises, "workoutId", "w1")
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_delete_batch_is_atomic_per_call() {
        let db = Database::open_in_memory().unwrap();
        let a = db
            .add_document("u1", Collection::Exercises, &doc(json!({"workoutId": "w1"})))
            .unwrap();
        let w = db
            .add_document("u1", Collection::Workouts, &doc(json!({"date": "2024-01-01"})))
            .unwrap();

        let removed = db
            .delete_batch(
                "u1",
                &[(Collection::Exercises, a), (Collection::Workouts, w)],
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.count_documents("u1", Collection::Workouts).unwrap(), 0);
    }

    #[test]
    fn test_settings_per_owner() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("u1", "theme", "dark").unwrap();
        db.set_setting("u1", "theme", "light").unwrap();

        assert_eq!(db.get_setting("u1", "theme").unwrap().as_deref(), Some("light"));
        assert!(db.get_setting("u2", "theme").unwrap().is_none());
        assert_eq!(db.all_settings("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_live_query_receives_initial_and_updates() {
        let db = Database::open_in_memory().unwrap();
        let deliveries = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&deliveries);
        let mut sub = db.subscribe(
            "u1",
            Collection::Routines,
            Some(OrderSpec::asc("name")),
            Arc::new(move |result: Result<Snapshot, SourceError>| {
                sink.lock().unwrap().push(result.map(|s| s.len()).unwrap_or(usize::MAX));
            }),
        );

        db.add_document("u1", Collection::Routines, &doc(json!({"name": "B"})))
            .unwrap();
        // Other owners and other collections do not trigger this query.
        db.add_document("u2", Collection::Routines, &doc(json!({"name": "A"})))
            .unwrap();
        db.add_document("u1", Collection::Photos, &doc(json!({"date": "2024-01-01"})))
            .unwrap();

        assert_eq!(*deliveries.lock().unwrap(), vec![0, 1]);

        sub.unsubscribe();
        assert_eq!(db.live_queries("u1", Collection::Routines), 0);
        db.add_document("u1", Collection::Routines, &doc(json!({"name": "C"})))
            .unwrap();
        assert_eq!(deliveries.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_listener_may_read_database() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let reads = Arc::new(AtomicUsize::new(0));

        let inner_db = Arc::clone(&db);
        let counter = Arc::clone(&reads);
        let _sub = db.subscribe(
            "u1",
            Collection::Photos,
            None,
            Arc::new(move |_| {
                let n = inner_db.count_documents("u1", Collection::Photos).unwrap();
                counter.store(n, Ordering::SeqCst);
            }),
        );

        db.add_document("u1", Collection::Photos, &doc(json!({"date": "2024-01-01"})))
            .unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_unsubscribe_removes_listener_entry() {
        let db = Database::open_in_memory().unwrap();
        let listener: SnapshotListener = Arc::new(|_| {});

        let mut first = db.subscribe("u1", Collection::Workouts, None, Arc::clone(&listener));
        let mut second = db.subscribe("u1", Collection::Workouts, None, listener);
        assert_eq!(lock(&db.listeners).len(), 1);

        first.unsubscribe();
        assert_eq!(db.live_queries("u1", Collection::Workouts), 1);
        assert_eq!(lock(&db.listeners).len(), 1);

        second.unsubscribe();
        second.unsubscribe();
        assert!(lock(&db.listeners).is_empty());

        // Publishing to a pruned key is a no-op.
        db.add_document("u1", Collection::Workouts, &doc(json!({"date": "2024-01-01"})))
            .unwrap();
    }

    #[test]
    fn test_replace_owner_data_publishes_once_per_collection() {
        let db = Database::open_in_memory().unwrap();
        db.add_document("u1", Collection::Workouts, &doc(json!({"date": "2024-01-01"})))
            .unwrap();
        db.set_setting("u1", "theme", "dark").unwrap();
        db.add_document("u2", Collection::Workouts, &doc(json!({"date": "2024-01-09"})))
            .unwrap();

        let deliveries = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&deliveries);
        let _sub = db.subscribe(
            "u1",
            Collection::Workouts,
            None,
            Arc::new(move |result: Result<Snapshot, SourceError>| {
                sink.lock().unwrap().push(result.map(|s| s.len()).unwrap_or(usize::MAX));
            }),
        );

        let documents: Vec<(Collection, Document)> = (1..=20)
            .map(|day| {
                let date = format!("2024-02-{:02}", day);
                (Collection::Workouts, doc(json!({ "date": date })))
            })
            .chain(std::iter::once((
                Collection::Routines,
                Document::new("r1", json!({"name": "Push"}).as_object().cloned().unwrap()),
            )))
            .collect();
        let settings = BTreeMap::from([("units".to_string(), "imperial".to_string())]);

        db.replace_owner_data("u1", &documents, &settings).unwrap();

        // Initial snapshot, then a single refresh for the whole import.
        assert_eq!(*deliveries.lock().unwrap(), vec![1, 20]);
        assert_eq!(db.count_documents("u1", Collection::Routines).unwrap(), 1);
        assert_eq!(
            db.all_settings("u1").unwrap(),
            BTreeMap::from([("units".to_string(), "imperial".to_string())])
        );
        assert_eq!(db.count_documents("u2", Collection::Workouts).unwrap(), 1);
    }
}
