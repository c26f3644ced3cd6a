//! Test doubles for the collaborators of the auth session and data store.

#![allow(dead_code)]

use avance::observer::Subscription;
use avance::router::{NavigationIntent, Navigator};
use avance::store::{
    Collection, CollectionSource, Document, OrderSpec, Snapshot, SnapshotListener, SourceError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

struct OpenedQuery {
    owner: String,
    collection: Collection,
    order: Option<OrderSpec>,
    listener: SnapshotListener,
    active: Arc<AtomicBool>,
}

/// Collection source whose snapshots are pushed by hand.
///
/// Queries stay on record after they are closed so tests can simulate a
/// delivery that races with `cleanup`.
#[derive(Default)]
pub struct ManualCollectionSource {
    queries: Mutex<Vec<OpenedQuery>>,
}

impl ManualCollectionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries opened so far, closed ones included.
    pub fn opened(&self) -> usize {
        lock(&self.queries).len()
    }

    pub fn closed(&self) -> usize {
        self.opened() - self.active()
    }

    /// Queries still open.
    pub fn active(&self) -> usize {
        lock(&self.queries)
            .iter()
            .filter(|q| q.active.load(Ordering::SeqCst))
            .count()
    }

    /// Owners of the open queries, in opening order.
    pub fn active_owners(&self) -> Vec<String> {
        lock(&self.queries)
            .iter()
            .filter(|q| q.active.load(Ordering::SeqCst))
            .map(|q| q.owner.clone())
            .collect()
    }

    /// Ordering requested by the most recent query on `collection`.
    pub fn order_for(&self, collection: Collection) -> Option<OrderSpec> {
        lock(&self.queries)
            .iter()
            .rev()
            .find(|q| q.collection == collection)
            .and_then(|q| q.order.clone())
    }

    /// Deliver a snapshot to the open queries on `collection`.
    pub fn push(&self, collection: Collection, snapshot: Snapshot) {
        self.deliver(collection, true, Ok(snapshot));
    }

    pub fn push_docs(&self, collection: Collection, docs: Vec<Document>) {
        self.push(collection, Snapshot::new(docs));
    }

    /// Deliver a listener failure to the open queries on `collection`.
    pub fn push_error(&self, collection: Collection, error: SourceError) {
        self.deliver(collection, true, Err(error));
    }

    /// Deliver to every query ever opened on `collection`, closed ones too.
    pub fn push_late(&self, collection: Collection, snapshot: Snapshot) {
        self.deliver(collection, false, Ok(snapshot));
    }

    fn deliver(&self, collection: Collection, only_active: bool, result: Result<Snapshot, SourceError>) {
        let listeners: Vec<SnapshotListener> = lock(&self.queries)
            .iter()
            .filter(|q| q.collection == collection)
            .filter(|q| !only_active || q.active.load(Ordering::SeqCst))
            .map(|q| Arc::clone(&q.listener))
            .collect();

        for listener in listeners {
            listener(result.clone());
        }
    }
}

impl CollectionSource for ManualCollectionSource {
    fn subscribe(
        &self,
        owner: &str,
        collection: Collection,
        order: Option<OrderSpec>,
        listener: SnapshotListener,
    ) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        lock(&self.queries).push(OpenedQuery {
            owner: owner.to_string(),
            collection,
            order,
            listener,
            active: Arc::clone(&active),
        });

        Subscription::new(move || active.store(false, Ordering::SeqCst))
    }
}

/// Navigator that records every intent and moves to its path.
pub struct RecordingNavigator {
    path: Mutex<String>,
    intents: Mutex<Vec<NavigationIntent>>,
}

impl RecordingNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(path.into()),
            intents: Mutex::new(Vec::new()),
        }
    }

    /// Move without recording an intent, like a user following a link.
    pub fn set_path(&self, path: impl Into<String>) {
        *lock(&self.path) = path.into();
    }

    pub fn intents(&self) -> Vec<NavigationIntent> {
        lock(&self.intents).clone()
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        lock(&self.path).clone()
    }

    fn navigate(&self, intent: NavigationIntent) {
        *lock(&self.path) = intent.path.clone();
        lock(&self.intents).push(intent);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
