//! Contract for a document source that pushes live collection snapshots.

use super::collections::{Collection, OrderSpec};
use crate::observer::Subscription;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// A stored document: id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Serialize a record into a document, moving its `id` field out.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, serde_json::Error> {
        let mut fields = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };
        Ok(Self { id, fields })
    }

    /// Decode into a record, with the document id merged into the fields.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
    }

    /// Field value as a string, if present.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Where a snapshot's contents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotMetadata {
    /// Includes local writes the backend has not confirmed yet
    pub has_pending_writes: bool,
    /// Served from the offline cache
    pub from_cache: bool,
}

impl SnapshotMetadata {
    /// Label used in logs.
    pub fn source_label(&self) -> &'static str {
        if self.has_pending_writes {
            "local"
        } else {
            "server"
        }
    }
}

/// Full contents of one collection at a point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub docs: Vec<Document>,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            metadata: SnapshotMetadata::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Decode every document; the first failure aborts.
    pub fn decode_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.docs.iter().map(Document::decode).collect()
    }
}

/// Failure reported to a live subscription.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Listener failed for {collection}: {message}")]
    ListenerFailed {
        collection: Collection,
        message: String,
    },

    #[error("Permission denied for {0}")]
    PermissionDenied(Collection),

    #[error("Malformed snapshot for {collection}: {message}")]
    Malformed {
        collection: Collection,
        message: String,
    },
}

/// Callback receiving every snapshot (or failure) of a live query.
pub type SnapshotListener = Arc<dyn Fn(Result<Snapshot, SourceError>) + Send + Sync>;

/// A document store offering owner-scoped live queries.
pub trait CollectionSource: Send + Sync {
    /// Open a live query on `collection` for `owner`.
    ///
    /// The listener receives a full snapshot on every change. The returned
    /// handle closes the query.
    fn subscribe(
        &self,
        owner: &str,
        collection: Collection,
        order: Option<OrderSpec>,
        listener: SnapshotListener,
    ) -> Subscription;
}
