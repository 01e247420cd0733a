//! Server-side session state, one entry per browser session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::FormDefaults;
use crate::input::FormState;
use crate::models::{RouteOutcome, WarehouseRow};
use crate::presenter::Rejection;
use crate::weights::WeightVector;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot message shown on the next render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub form: FormState,
    pub recalculation: bool,
    pub weights: WeightVector,
    pub rows: Vec<WarehouseRow>,
    pub query_attempted: bool,
    pub route: Option<RouteOutcome>,
    /// Store recorded as rejecting when a route was calculated in recalculation mode
    pub rejected_store: Option<i64>,
    /// Trace id the page scrolls to after a calculation
    pub scroll_to: Option<String>,
    pub notices: Vec<Notice>,
}

impl SessionState {
    pub fn new(defaults: &FormDefaults) -> Self {
        Self {
            form: FormState {
                sku: defaults.sku.clone(),
                cp: defaults.cp.clone(),
                qty: defaults.qty.to_string(),
                original_delivery: defaults.original_delivery.format("%Y-%m-%d").to_string(),
                rejecting_store: defaults.rejecting_store.to_string(),
            },
            recalculation: false,
            weights: WeightVector::LOW_SEASON,
            rows: Vec::new(),
            query_attempted: false,
            route: None,
            rejected_store: None,
            scroll_to: None,
            notices: Vec::new(),
        }
    }

    pub fn rejection(&self) -> Rejection {
        Rejection {
            recalculation: self.recalculation,
            store: self.rejected_store,
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn route_error(&self) -> Option<&str> {
        match &self.route {
            Some(RouteOutcome::Error(message)) => Some(message),
            _ => None,
        }
    }

    /// Remove and return the pending one-shot state for rendering.
    pub fn take_one_shot(&mut self) -> (Vec<Notice>, Option<String>) {
        (std::mem::take(&mut self.notices), self.scroll_to.take())
    }
}

/// Session looked up for a request. `is_new` sessions are not stored until
/// they are saved.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub id: String,
    pub state: SessionState,
    pub is_new: bool,
}

struct StoredSession {
    state: SessionState,
    last_seen: Instant,
}

/// In-memory session store keyed by session id. Sessions not saved within
/// `idle_timeout` are dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Look up the session for `id`, starting a fresh one when it is unknown
    /// or has been idle too long.
    pub async fn load_or_create(&self, id: Option<&str>, defaults: &FormDefaults) -> LoadedSession {
        if let Some(id) = id {
            let sessions = self.sessions.read().await;
            if let Some(stored) = sessions.get(id) {
                if stored.last_seen.elapsed() < self.idle_timeout {
                    return LoadedSession {
                        id: id.to_string(),
                        state: stored.state.clone(),
                        is_new: false,
                    };
                }
            }
        }

        LoadedSession {
            id: new_session_id(),
            state: SessionState::new(defaults),
            is_new: true,
        }
    }

    /// Store `state` under `id`, evicting idle sessions first.
    pub async fn save(&self, id: &str, state: SessionState) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let evicted = retain_active(&mut sessions, now, self.idle_timeout);
        if evicted > 0 {
            tracing::debug!("Evicted {} idle sessions", evicted);
        }
        sessions.insert(id.to_string(), StoredSession { state, last_seen: now });
    }

    /// Drop every session idle for longer than the timeout as of `now`.
    /// Returns how many were removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        retain_active(&mut sessions, now, self.idle_timeout)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn retain_active(sessions: &mut HashMap<String, StoredSession>, now: Instant, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) < idle_timeout);
    before - sessions.len()
}

fn new_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Extract the session id from a `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        assert_eq!(session_id_from_cookie("session_id=abc123"), Some("abc123"));
        assert_eq!(
            session_id_from_cookie("theme=dark; session_id=abc123; other=1"),
            Some("abc123")
        );
        assert_eq!(session_id_from_cookie("theme=dark"), None);
        assert_eq!(session_id_from_cookie("session_id="), None);
    }

    const IDLE: Duration = Duration::from_secs(30 * 60);

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(IDLE);
        let defaults = FormDefaults::default();

        let mut a = store.load_or_create(None, &defaults).await;
        let b = store.load_or_create(None, &defaults).await;
        assert_ne!(a.id, b.id);
        assert!(a.is_new && b.is_new);
        // nothing is stored until saved
        assert!(store.is_empty().await);

        a.state.recalculation = true;
        store.save(&a.id, a.state).await;
        store.save(&b.id, b.state.clone()).await;

        let reloaded_a = store.load_or_create(Some(&a.id), &defaults).await;
        let reloaded_b = store.load_or_create(Some(&b.id), &defaults).await;
        assert!(!reloaded_a.is_new);
        assert!(reloaded_a.state.recalculation);
        assert_eq!(reloaded_b.state, b.state);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_id_creates_new_session() {
        let store = SessionStore::new(IDLE);
        let loaded = store
            .load_or_create(Some("stale"), &FormDefaults::default())
            .await;
        assert_ne!(loaded.id, "stale");
        assert!(loaded.is_new);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new(IDLE);
        let defaults = FormDefaults::default();
        for _ in 0..3 {
            let loaded = store.load_or_create(None, &defaults).await;
            store.save(&loaded.id, loaded.state).await;
        }

        assert_eq!(store.evict_idle(Instant::now() + Duration::from_secs(60)).await, 0);
        assert_eq!(store.len().await, 3);

        assert_eq!(store.evict_idle(Instant::now() + IDLE * 2).await, 3);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_session_is_replaced_and_swept_on_save() {
        let store = SessionStore::new(Duration::from_millis(20));
        let defaults = FormDefaults::default();

        let old = store.load_or_create(None, &defaults).await;
        store.save(&old.id, old.state).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fresh = store.load_or_create(Some(&old.id), &defaults).await;
        assert!(fresh.is_new);
        assert_ne!(fresh.id, old.id);

        store.save(&fresh.id, fresh.state).await;
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_one_shot_state_is_cleared() {
        let mut state = SessionState::new(&FormDefaults::default());
        state.notify(NoticeLevel::Success, "Weights set to low season.");
        state.scroll_to = Some("t-1".to_string());

        let (notices, scroll) = state.take_one_shot();
        assert_eq!(notices.len(), 1);
        assert_eq!(scroll.as_deref(), Some("t-1"));
        assert!(state.notices.is_empty());
        assert!(state.scroll_to.is_none());
    }
}
