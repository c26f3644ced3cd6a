//! Reactive data store.
//!
//! Owns one live query per tracked collection for the signed-in identity,
//! mirrors their snapshots in a single [`DataState`], and broadcasts one
//! notification per change tagged with the collection that changed. The store
//! follows the auth session: an identity opens the queries, its absence closes
//! them and resets the state.

use super::collections::Collection;
use super::source::{CollectionSource, SnapshotListener, SnapshotMetadata, SourceError, Snapshot};
use super::state::DataState;
use crate::auth::{AuthSession, AuthState};
use crate::models::{BodyMetric, CustomExercise, PersonalRecord, Photo, Routine, Workout};
use crate::observer::{lock, ListenerRegistry, Subscription};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::broadcast;

/// Capacity of the async change feed.
const EVENT_CAPACITY: usize = 64;

/// What subscribers receive on every change.
#[derive(Debug, Clone)]
pub struct StoreNotification {
    /// State after the change
    pub state: Arc<DataState>,
    /// Collection whose snapshot changed; `None` for resets, lifecycle and
    /// settings updates
    pub changed: Option<Collection>,
}

impl StoreNotification {
    pub fn loading(&self) -> bool {
        self.state.loading
    }
}

struct Inner {
    state: Arc<DataState>,
    /// Identity the open queries belong to
    owner: Option<String>,
    /// Bumped by every init and cleanup; deliveries carry the value they were
    /// opened under
    generation: u64,
    initializing: bool,
    live: Vec<Subscription>,
}

/// Mirror of the signed-in identity's collections.
pub struct DataStore {
    source: Arc<dyn CollectionSource>,
    inner: Mutex<Inner>,
    listeners: ListenerRegistry<StoreNotification>,
    events: broadcast::Sender<StoreNotification>,
    auth_subscription: Mutex<Option<Subscription>>,
    weak_self: Weak<DataStore>,
}

impl DataStore {
    /// Create a store that is driven manually through `init` and `cleanup`.
    pub fn new(source: Arc<dyn CollectionSource>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Arc::new_cyclic(|weak_self| Self {
            source,
            inner: Mutex::new(Inner {
                state: Arc::new(DataState::default()),
                owner: None,
                generation: 0,
                initializing: false,
                live: Vec::new(),
            }),
            listeners: ListenerRegistry::new(),
            events,
            auth_subscription: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// Create a store that follows `auth`: an identity initializes it, no
    /// identity cleans it up.
    pub fn connect(source: Arc<dyn CollectionSource>, auth: &AuthSession) -> Arc<Self> {
        let store = Self::new(source);

        let weak = Arc::downgrade(&store);
        let subscription = auth.subscribe(move |auth_state| {
            if let Some(store) = weak.upgrade() {
                store.follow_auth(auth_state);
            }
        });
        *lock(&store.auth_subscription) = Some(subscription);

        store
    }

    fn follow_auth(&self, auth_state: &AuthState) {
        match &auth_state.user {
            Some(user) => {
                let switched = {
                    let inner = self.lock_inner();
                    matches!(&inner.owner, Some(owner) if owner != &user.uid)
                };
                if switched {
                    tracing::info!("Identity changed, closing previous listeners");
                    self.cleanup();
                }
                self.init(&user.uid);
            }
            None => self.cleanup(),
        }
    }

    /// Open one live query per tracked collection for `owner`.
    ///
    /// A no-op while already initialized (or initializing), so repeated auth
    /// events never open duplicate queries.
    pub fn init(&self, owner: &str) {
        let (generation, state) = {
            let mut inner = self.lock_inner();
            if inner.state.initialized || inner.initializing {
                tracing::debug!("Data store already initialized, ignoring init");
                return;
            }
            inner.initializing = true;
            inner.owner = Some(owner.to_string());
            inner.generation += 1;
            Arc::make_mut(&mut inner.state).loading = true;
            (inner.generation, Arc::clone(&inner.state))
        };

        tracing::info!("Initializing data store listeners");
        self.notify(state, None);

        let mut opened = Vec::with_capacity(Collection::TRACKED.len());
        for collection in Collection::TRACKED {
            let weak = self.weak_self.clone();
            let listener: SnapshotListener = Arc::new(move |result| {
                if let Some(store) = weak.upgrade() {
                    store.deliver(generation, collection, result);
                }
            });
            opened.push(
                self.source
                    .subscribe(owner, collection, collection.live_order(), listener),
            );
        }

        let state = {
            let mut inner = self.lock_inner();
            if inner.generation != generation {
                // cleanup() ran while the queries were being opened
                drop(inner);
                tracing::debug!("Init superseded by cleanup, closing {} listeners", opened.len());
                for mut subscription in opened {
                    subscription.unsubscribe();
                }
                return;
            }
            inner.live.extend(opened);
            inner.initializing = false;
            let state = Arc::make_mut(&mut inner.state);
            state.initialized = true;
            state.loading = false;
            Arc::clone(&inner.state)
        };

        tracing::info!("Data store initialized");
        self.notify(state, None);
    }

    fn deliver(&self, generation: u64, collection: Collection, result: Result<Snapshot, SourceError>) {
        let state = {
            let mut inner = self.lock_inner();
            if inner.generation != generation {
                tracing::debug!("Discarding stale {} snapshot", collection);
                return;
            }

            match result {
                Ok(snapshot) => {
                    tracing::debug!(
                        "{} snapshot received: {} docs (source: {})",
                        collection,
                        snapshot.len(),
                        snapshot.metadata.source_label()
                    );
                    if let Err(e) = Arc::make_mut(&mut inner.state).apply(collection, &snapshot) {
                        tracing::error!("Error in {} listener: {}", collection, e);
                        return;
                    }
                    Arc::clone(&inner.state)
                }
                Err(e) => {
                    // Keep the last-known snapshot so a transient failure does not blank views.
                    tracing::error!("Error in {} listener: {}", collection, e);
                    return;
                }
            }
        };

        self.notify(state, Some(collection));
    }

    /// Close every open query and reset the state to its empty default.
    ///
    /// Safe to call when nothing is open.
    pub fn cleanup(&self) {
        let (live, state) = {
            let mut inner = self.lock_inner();
            inner.generation += 1;
            inner.initializing = false;
            inner.owner = None;
            inner.state = Arc::new(DataState::default());
            (std::mem::take(&mut inner.live), Arc::clone(&inner.state))
        };

        tracing::info!("Cleaning up data store listeners ({} open)", live.len());
        for mut subscription in live {
            subscription.unsubscribe();
        }

        self.notify(state, None);
    }

    /// Register `callback` and invoke it once with the current state.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreNotification) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let registered = Arc::clone(&callback);
        let subscription = self.listeners.add(move |notification| registered(notification));

        let current = StoreNotification {
            state: self.state(),
            changed: None,
        };
        callback(&current);

        subscription
    }

    /// Async feed of every notification.
    pub fn events(&self) -> broadcast::Receiver<StoreNotification> {
        self.events.subscribe()
    }

    fn notify(&self, state: Arc<DataState>, changed: Option<Collection>) {
        let notification = StoreNotification { state, changed };
        self.listeners.notify(&notification);
        // No receivers is fine.
        let _ = self.events.send(notification);
    }

    /// Publish the settings of `owner`. Ignored when `owner` is not the
    /// identity the store is currently serving.
    pub fn set_settings(&self, owner: &str, settings: BTreeMap<String, String>) {
        let state = {
            let mut inner = self.lock_inner();
            if inner.owner.as_deref() != Some(owner) {
                tracing::debug!("Ignoring settings for an identity the store is not serving");
                return;
            }
            Arc::make_mut(&mut inner.state).settings = settings;
            Arc::clone(&inner.state)
        };
        self.notify(state, None);
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    // ========== Reads ==========

    /// Current state; a cheap shared handle.
    pub fn state(&self) -> Arc<DataState> {
        Arc::clone(&self.lock_inner().state)
    }

    pub fn is_loading(&self) -> bool {
        self.lock_inner().state.loading
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_inner().state.initialized
    }

    /// Identity the store is serving, if any.
    pub fn owner(&self) -> Option<String> {
        self.lock_inner().owner.clone()
    }

    /// Number of live queries currently open.
    pub fn open_subscriptions(&self) -> usize {
        self.lock_inner().live.len()
    }

    pub fn metadata(&self, collection: Collection) -> Option<SnapshotMetadata> {
        self.lock_inner().state.metadata.get(&collection).copied()
    }

    pub fn get_workouts(&self) -> Vec<Workout> {
        self.state().workouts.clone()
    }

    pub fn get_routines(&self) -> Vec<Routine> {
        self.state().routines.clone()
    }

    pub fn get_body_metrics(&self) -> Vec<BodyMetric> {
        self.state().body_metrics.clone()
    }

    /// Newest body metric entry.
    pub fn get_latest_body_metrics(&self) -> Option<BodyMetric> {
        self.state().body_metrics.first().cloned()
    }

    pub fn get_personal_records(&self) -> Vec<PersonalRecord> {
        self.state().personal_records.clone()
    }

    pub fn get_photos(&self) -> Vec<Photo> {
        self.state().photos.clone()
    }

    pub fn get_custom_exercises(&self) -> Vec<CustomExercise> {
        self.state().custom_exercises.clone()
    }

    pub fn get_settings(&self) -> BTreeMap<String, String> {
        self.state().settings.clone()
    }

    pub fn get_setting(&self, key: &str) -> Option<String> {
        self.state().settings.get(key).cloned()
    }
}

impl Drop for DataStore {
    fn drop(&mut self) {
        if let Some(mut subscription) = lock(&self.auth_subscription).take() {
            subscription.unsubscribe();
        }
        let live = std::mem::take(&mut lock(&self.inner).live);
        for mut subscription in live {
            subscription.unsubscribe();
        }
    }
}
