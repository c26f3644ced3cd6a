//! Hash-path routing and navigation intents.
//!
//! Components that need to move the user somewhere (the auth session's
//! redirects, logout) emit a [`NavigationIntent`] through the [`Navigator`]
//! trait instead of touching the route table. [`HashRouter`] is the in-process
//! implementation: a route table with `:param` segments, a pre-navigation
//! guard and a bounded log of the intents it was handed.

use crate::observer::{lock, ListenerRegistry, Subscription};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Why a navigation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationReason {
    /// No identity on a protected path
    AuthRequired,
    /// Identity present on a public-only path
    AlreadyAuthenticated,
    /// Explicit sign-out
    SignedOut,
    /// User-initiated
    User,
}

/// A request to move to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub path: String,
    pub reason: NavigationReason,
}

impl NavigationIntent {
    pub fn new(path: impl Into<String>, reason: NavigationReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// User-initiated navigation.
    pub fn user(path: impl Into<String>) -> Self {
        Self::new(path, NavigationReason::User)
    }
}

/// The routing collaborator seen by the rest of the app.
pub trait Navigator: Send + Sync {
    /// Current path without query string; `/` when empty.
    fn current_path(&self) -> String;

    /// Carry out a navigation intent.
    fn navigate(&self, intent: NavigationIntent);
}

/// Strip a leading `#` and any query string from a hash location.
pub fn normalize_path(location: &str) -> String {
    let path = location.trim_start_matches('#');
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Registered pattern, e.g. `/workout/:id`
    pub pattern: String,
    /// Concrete path that was matched
    pub path: String,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();
    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (expected, actual) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), actual.to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

type Guard = Arc<dyn Fn(&str, Option<&str>) -> bool + Send + Sync>;

/// Locations kept for [`HashRouter::back`].
pub const MAX_HISTORY: usize = 50;

/// Intents kept until [`HashRouter::take_intents`] drains them.
pub const MAX_INTENTS: usize = 50;

/// Append to a bounded log, dropping the oldest entry when full.
fn push_bounded<T>(log: &mut VecDeque<T>, value: T, cap: usize) {
    if log.len() == cap {
        log.pop_front();
    }
    log.push_back(value);
}

struct RouterState {
    /// Raw hash location, may carry a query string
    location: String,
    /// Path of the last route that was entered
    current_route: Option<String>,
    history: VecDeque<String>,
    intents: VecDeque<NavigationIntent>,
}

/// In-process hash router.
pub struct HashRouter {
    routes: Mutex<Vec<String>>,
    state: Mutex<RouterState>,
    guard: Mutex<Option<Guard>>,
    listeners: ListenerRegistry<RouteMatch>,
}

impl Default for HashRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRouter {
    pub fn new() -> Self {
        Self::starting_at("/")
    }

    /// Router whose location is already `location`.
    pub fn starting_at(location: &str) -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            state: Mutex::new(RouterState {
                location: location.to_string(),
                current_route: None,
                history: VecDeque::new(),
                intents: VecDeque::new(),
            }),
            guard: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Register a route pattern. Segments starting with `:` capture params.
    pub fn on(&self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        let mut routes = lock(&self.routes);
        if !routes.contains(&pattern) {
            routes.push(pattern);
        }
    }

    /// Install a guard run before every route change with `(to, from)`.
    /// Returning `false` vetoes the change.
    pub fn before_each<F>(&self, guard: F)
    where
        F: Fn(&str, Option<&str>) -> bool + Send + Sync + 'static,
    {
        *lock(&self.guard) = Some(Arc::new(guard));
    }

    /// Observe every route that is entered.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RouteMatch) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    /// Find the route for `path`: exact match first, then param patterns,
    /// then `/` as fallback.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let routes = lock(&self.routes);

        if routes.iter().any(|r| r == path) {
            return Some(RouteMatch {
                pattern: path.to_string(),
                path: path.to_string(),
                params: HashMap::new(),
            });
        }

        for pattern in routes.iter() {
            if let Some(params) = match_pattern(pattern, path) {
                return Some(RouteMatch {
                    pattern: pattern.clone(),
                    path: path.to_string(),
                    params,
                });
            }
        }

        if routes.iter().any(|r| r == "/") {
            return Some(RouteMatch {
                pattern: "/".to_string(),
                path: path.to_string(),
                params: HashMap::new(),
            });
        }

        tracing::warn!("No route found for: {}", path);
        None
    }

    /// Query parameters of the current location.
    pub fn query(&self) -> HashMap<String, String> {
        let location = lock(&self.state).location.clone();
        location
            .split_once('?')
            .map(|(_, query)| {
                query
                    .split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drain the intents received since the last call, oldest first.
    /// Only the latest [`MAX_INTENTS`] are kept.
    pub fn take_intents(&self) -> Vec<NavigationIntent> {
        lock(&self.state).intents.drain(..).collect()
    }

    /// Number of locations [`HashRouter::back`] can return to.
    pub fn history_len(&self) -> usize {
        lock(&self.state).history.len()
    }

    /// Return to the previous location, if any.
    pub fn back(&self) {
        let previous = {
            let mut state = lock(&self.state);
            state.history.pop_back()
        };
        if let Some(location) = previous {
            self.enter(location, false);
        }
    }

    fn enter(&self, location: String, push_history: bool) {
        let path = normalize_path(&location);
        let from = lock(&self.state).current_route.clone();

        let guard = lock(&self.guard).clone();
        if let Some(guard) = guard {
            if !guard(&path, from.as_deref()) {
                tracing::debug!("Navigation to {} vetoed by guard", path);
                return;
            }
        }

        {
            let mut state = lock(&self.state);
            if push_history {
                let previous = std::mem::replace(&mut state.location, location);
                push_bounded(&mut state.history, previous, MAX_HISTORY);
            } else {
                state.location = location;
            }
        }

        if let Some(route) = self.resolve(&path) {
            lock(&self.state).current_route = Some(path);
            self.listeners.notify(&route);
        }
    }
}

impl Navigator for HashRouter {
    fn current_path(&self) -> String {
        normalize_path(&lock(&self.state).location)
    }

    fn navigate(&self, intent: NavigationIntent) {
        tracing::debug!("Navigating to {} ({:?})", intent.path, intent.reason);
        let location = intent.path.clone();
        push_bounded(&mut lock(&self.state).intents, intent, MAX_INTENTS);
        self.enter(location, true);
    }
}
