//! Single-session store with lazy expiry
//!
//! Holds at most one session per client runtime; `set` overwrites, it never
//! appends. Only the authentication flow writes, everything else reads
//! `current()`. The store is an explicit value owned by the caller, not a
//! hidden global.

use crate::{
    models::user::Session,
    services::credentials::CredentialVerifier,
};

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    session: Session,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    active: Option<ActiveSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the session established by a successful credential
    /// verification, replacing any previous one
    pub fn set(&mut self, token: String, session: Session) {
        self.active = Some(ActiveSession { token, session });
    }

    /// Drop the session; a no-op on an empty store
    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn current(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn token(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.token.as_str())
    }

    /// Re-checks the stored credential. A credential the verifier no longer
    /// accepts (typically expired) auto-clears the store; there is no
    /// background timer.
    pub fn is_authenticated(&mut self, verifier: &CredentialVerifier) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let token = active.token.clone();
        match verifier.verify(&token, None) {
            Ok(fresh) => {
                active.session = fresh;
                true
            }
            Err(_) => {
                self.clear();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::AuthConfig;
    use crate::models::user::{Role, User};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn fixture() -> (CredentialVerifier, Arc<FixedClock>, User) {
        let clock = Arc::new(FixedClock::at(Utc.timestamp_opt(10_000, 0).unwrap()));
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 1,
        };
        let verifier = CredentialVerifier::new(&config, clock.clone());
        let user = User {
            id: 7,
            full_name: "Ana Weiss".to_string(),
            mail: "ana@example.org".to_string(),
            username: "ana".to_string(),
            password: String::new(),
            role: Role::Client,
            phone: None,
            address: None,
            joined_date: Utc.timestamp_opt(0, 0).unwrap(),
            avatar_url: None,
            availability: None,
        };
        (verifier, clock, user)
    }

    #[test]
    fn empty_store_is_unauthenticated() {
        let (verifier, _, _) = fixture();
        let mut store = SessionStore::new();
        assert!(store.current().is_none());
        assert!(!store.is_authenticated(&verifier));
    }

    #[test]
    fn set_overwrites_and_clear_is_idempotent() {
        let (verifier, _, user) = fixture();
        let token = verifier.issue(&user).unwrap();
        let session = verifier.verify(&token, None).unwrap();

        let mut store = SessionStore::new();
        store.set(token.clone(), session.clone());
        assert_eq!(store.current(), Some(&session));
        assert_eq!(store.token(), Some(token.as_str()));

        let mut replacement = session.clone();
        replacement.username = "ana2".to_string();
        store.set(token, replacement.clone());
        assert_eq!(store.current(), Some(&replacement));

        store.clear();
        assert!(store.current().is_none());
        store.clear(); // no-op on empty
        assert!(store.current().is_none());
    }

    #[test]
    fn expired_credential_auto_clears_on_recheck() {
        let (verifier, clock, user) = fixture();
        let token = verifier.issue(&user).unwrap();
        let session = verifier.verify(&token, None).unwrap();

        let mut store = SessionStore::new();
        store.set(token, session);
        assert!(store.is_authenticated(&verifier));

        clock.advance(Duration::hours(2));
        assert!(!store.is_authenticated(&verifier));
        // lazy expiry cleared the store, not just the answer
        assert!(store.current().is_none());
        assert!(store.token().is_none());
    }
}
