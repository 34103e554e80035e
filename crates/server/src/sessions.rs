use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use haggle_core::config::ServerConfig;
use haggle_core::{DomainError, NegotiationSession, SessionId};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Bounds on how many sessions are kept and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl SessionLimits {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            idle_ttl: Duration::from_secs(server.session_ttl_secs),
            max_sessions: server.max_sessions,
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { idle_ttl: Duration::from_secs(3600), max_sessions: 10_000 }
    }
}

struct Entry {
    session: Arc<Mutex<NegotiationSession>>,
    last_used: Instant,
}

/// Live negotiations keyed by id.
///
/// Each session sits behind its own mutex; callers hold it for the whole
/// read-modify-write (classifier calls included), so operations on one session are
/// serialised while different sessions proceed concurrently.
///
/// Sessions idle longer than `idle_ttl` are swept on every `replace` and `get`. When a
/// start would exceed `max_sessions`, the least recently used sessions are dropped.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new(limits: SessionLimits) -> Self {
        Self { sessions: Arc::default(), limits }
    }

    /// Stores `session` under `id`, discarding whatever negotiation was there before.
    pub async fn replace(&self, id: SessionId, session: NegotiationSession) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.sweep_expired(&mut sessions, now);
        sessions.remove(&id);

        while sessions.len() >= self.limits.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(
                event_name = "negotiation.session.evicted",
                session_id = %oldest,
                max_sessions = self.limits.max_sessions,
                "least recently used session dropped at capacity"
            );
        }

        sessions.insert(id, Entry { session: Arc::new(Mutex::new(session)), last_used: now });
    }

    pub async fn get(&self, id: &SessionId) -> Result<Arc<Mutex<NegotiationSession>>, DomainError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.sweep_expired(&mut sessions, now);

        let entry =
            sessions.get_mut(id).ok_or_else(|| DomainError::SessionNotStarted(id.clone()))?;
        entry.last_used = now;
        Ok(entry.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn sweep_expired(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < self.limits.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(
                event_name = "negotiation.session.expired",
                expired,
                remaining = sessions.len(),
                "idle sessions dropped"
            );
        }
    }
}
