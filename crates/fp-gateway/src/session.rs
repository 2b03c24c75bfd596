//! In-memory session store and the email-domain authorization gate.
//!
//! Sessions live only for the process lifetime. Expiry is lazy — an
//! expired session is removed when it is next read; there is no
//! background sweep.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// The authenticated identity attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
struct Session {
    user: UserInfo,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Process-wide session map behind an `RwLock`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    /// Create a session and return its opaque token.
    pub async fn create(&self, user: UserInfo) -> String {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let session = Session {
            user,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), session);
        tracing::debug!(session_id = %session_id, "session created");
        session_id
    }

    /// Resolve a session to its user, removing it if expired.
    pub async fn get(&self, session_id: &str) -> Option<UserInfo> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(session) if Utc::now() < session.expires_at => {
                    return Some(session.user.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired — drop it on this read.
        self.sessions.write().await.remove(session_id);
        None
    }

    /// Remove a session; true when one existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }
}

/// Whether an authenticated email belongs to the allow-listed domain.
/// Case-insensitive substring check, matching the identity provider's
/// mixed-case principal names.
pub fn email_domain_allowed(email: &str, allowed_domain: &str) -> bool {
    !email.is_empty() && email.to_lowercase().contains(&allowed_domain.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo {
            name: "Jane Doe".into(),
            email: "jane.doe@fleetpulse.co.uk".into(),
        }
    }

    #[tokio::test]
    async fn create_and_read_back() {
        let store = SessionStore::new(24);
        let id = store.create(user()).await;
        let read = store.get(&id).await.unwrap();
        assert_eq!(read.email, "jane.doe@fleetpulse.co.uk");
    }

    #[tokio::test]
    async fn unknown_session_is_none() {
        let store = SessionStore::new(24);
        assert!(store.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn expired_session_removed_on_read() {
        let store = SessionStore::new(0);
        let id = store.create(user()).await;
        assert!(store.get(&id).await.is_none());
        // Removed, not just hidden.
        assert!(!store.clear(&id).await);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = SessionStore::new(24);
        let id = store.create(user()).await;
        assert!(store.clear(&id).await);
        assert!(!store.clear(&id).await);
    }

    #[test]
    fn domain_check_case_insensitive() {
        assert!(email_domain_allowed(
            "Jane.Doe@FleetPulse.CO.UK",
            "@fleetpulse.co.uk"
        ));
        assert!(!email_domain_allowed("jane@other.com", "@fleetpulse.co.uk"));
        assert!(!email_domain_allowed("", "@fleetpulse.co.uk"));
    }
}
