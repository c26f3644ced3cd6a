//! Observer registry shared by the auth session, the data store and the
//! database's live subscriptions.
//!
//! Callbacks are kept in registration order. Each registration hands back a
//! [`Subscription`] that removes exactly that callback. Notification walks a
//! copy of the list, so a callback may subscribe or unsubscribe (itself or
//! others) while a broadcast is in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Entry<T> {
    id: u64,
    callback: Callback<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Ordered list of callbacks notified with a `&T`.
pub struct ListenerRegistry<T> {
    entries: Arc<Mutex<Vec<Entry<T>>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl<T: 'static> ListenerRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. The returned handle removes it again.
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push(Entry {
            id,
            callback: Arc::new(callback),
        });

        let entries = Arc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                lock(&entries).retain(|entry| entry.id != id);
            }
        })
    }

    /// Invoke every registered callback with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Entry<T>> = lock(&self.entries).clone();
        for entry in snapshot {
            (entry.callback)(value);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered callback.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Disposer for a registered callback or an open live query.
///
/// Calling [`Subscription::unsubscribe`] more than once is a no-op. Dropping
/// the handle does not unsubscribe; ownership of the lifetime stays explicit.
#[must_use = "dropping a Subscription leaves the listener registered"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap a disposer closure.
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Remove the listener. Subsequent calls do nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    /// Whether the handle still has something to dispose.
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
