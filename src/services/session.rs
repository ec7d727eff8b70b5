//! In-memory session store with idle expiry.
//!
//! # Responsibilities
//! - Issue session IDs (UUID v4) and hold per-session key/value data
//! - Reset sessions idle for longer than the configured timeout
//! - Attach the session to each request via [`SessionMiddleware`]
//!
//! # Design Decisions
//! - Expiry is silent: an expired session comes back empty with a fresh window
//! - Unknown client-supplied IDs are never adopted; a new ID is issued
//! - Values are JSON so handlers can store structured data

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::http::middleware::{Decision, Middleware};
use crate::http::{Request, Response};
use crate::routing::HandlerError;

struct SessionRecord {
    data: HashMap<String, Value>,
    last_activity: Instant,
}

impl SessionRecord {
    fn fresh(now: Instant) -> Self {
        Self {
            data: HashMap::new(),
            last_activity: now,
        }
    }
}

/// Process-wide session storage.
pub struct SessionStore {
    sessions: DashMap<String, SessionRecord>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resume the session `id`, or start a new one.
    pub fn start(self: &Arc<Self>, id: Option<&str>) -> Session {
        self.start_at(id, Instant::now())
    }

    pub(crate) fn start_at(self: &Arc<Self>, id: Option<&str>, now: Instant) -> Session {
        if let Some(id) = id {
            if let Some(mut record) = self.sessions.get_mut(id) {
                if now.saturating_duration_since(record.last_activity) > self.timeout {
                    tracing::debug!(session = id, "Session expired, resetting");
                    *record = SessionRecord::fresh(now);
                } else {
                    record.last_activity = now;
                }
                return Session::new(id.to_string(), Arc::clone(self));
            }
        }

        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), SessionRecord::fresh(now));
        Session::new(id, Arc::clone(self))
    }

    /// Drop every session idle for longer than the timeout.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, record| now.saturating_duration_since(record.last_activity) <= self.timeout);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Handle to one session in the store.
///
/// Clones share the session ID, so a regeneration through any clone is
/// seen by the request that carries the session.
#[derive(Clone)]
pub struct Session {
    id: Arc<RwLock<String>>,
    store: Arc<SessionStore>,
}

impl Session {
    fn new(id: String, store: Arc<SessionStore>) -> Self {
        Self {
            id: Arc::new(RwLock::new(id)),
            store,
        }
    }

    pub fn id(&self) -> String {
        self.id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store
            .sessions
            .get(&self.id())
            .and_then(|record| record.data.get(key).cloned())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.store
            .sessions
            .entry(self.id())
            .or_insert_with(|| SessionRecord::fresh(Instant::now()))
            .data
            .insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.store
            .sessions
            .get_mut(&self.id())
            .and_then(|mut record| record.data.remove(key))
    }

    /// Remove all data and forget the session.
    pub fn destroy(&self) {
        self.store.sessions.remove(&self.id());
    }

    /// Move the session's data under a new ID and return it.
    pub fn regenerate_id(&self) -> String {
        let mut id = self
            .id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let new_id = Uuid::new_v4().to_string();
        let record = self
            .store
            .sessions
            .remove(id.as_str())
            .map(|(_, record)| record)
            .unwrap_or_else(|| SessionRecord::fresh(Instant::now()));
        self.store.sessions.insert(new_id.clone(), record);
        *id = new_id.clone();
        new_id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id()).finish()
    }
}

/// Set the session cookie on `response` unless the request already
/// presented the session's current ID.
pub(crate) fn sync_cookie(request: &Request, response: &mut Response, cookie_name: &str) {
    let Some(session) = &request.session else {
        return;
    };
    let id = session.id();
    if request.cookie(cookie_name) != Some(id.as_str()) {
        response.set_header(
            "set-cookie",
            format!("{}={}; Path=/; HttpOnly", cookie_name, id),
        );
    }
}

/// Global middleware attaching a session to every request.
pub struct SessionMiddleware {
    store: Arc<SessionStore>,
    cookie_name: String,
}

impl SessionMiddleware {
    pub fn new(store: Arc<SessionStore>, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
        }
    }
}

impl Middleware for SessionMiddleware {
    fn name(&self) -> &str {
        "session"
    }

    fn handle(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<Decision, HandlerError> {
        let session = self.store.start(request.cookie(&self.cookie_name));
        request.session = Some(session);
        sync_cookie(request, response, &self.cookie_name);
        Ok(Decision::Continue)
    }
}
