//! Reactive data store mirroring the signed-in identity's collections.

pub mod collections;
pub mod data_store;
pub mod source;
pub mod state;

pub use collections::{Collection, Direction, OrderSpec};
pub use data_store::{DataStore, StoreNotification};
pub use source::{
    CollectionSource, Document, Snapshot, SnapshotListener, SnapshotMetadata, SourceError,
};
pub use state::DataState;
