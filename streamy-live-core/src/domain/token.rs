use crate::domain::{Role, RoomId, SessionKey};
use instant::{Duration, Instant};
use std::fmt;

/// Who a token is requested for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Signed-in principal
    Authenticated(String),
    /// Session-scoped pseudo identity of an anonymous viewer
    Guest(String),
}

impl Subject {
    pub fn user_id(&self) -> &str {
        match self {
            Subject::Authenticated(id) | Subject::Guest(id) => id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Subject::Authenticated(_))
    }
}

/// Engine token issued by the backend for one (room, user, role)
///
/// The value is opaque and never parsed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    subject_user_id: String,
    role: Role,
    room_id: RoomId,
    issued_at: Instant,
    ttl: Duration,
}

impl SessionToken {
    pub fn new(
        value: impl Into<String>,
        subject_user_id: impl Into<String>,
        key: SessionKey,
        issued_at: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            value: value.into(),
            subject_user_id: subject_user_id.into(),
            role: key.role,
            room_id: key.room_id,
            issued_at,
            ttl,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn subject_user_id(&self) -> &str {
        &self.subject_user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.room_id, self.role)
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Whether the token may still be used for a new activation
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) < self.ttl
    }

    pub fn matches(&self, key: &SessionKey) -> bool {
        self.room_id == key.room_id && self.role == key.role
    }
}

// Keep the token value out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &redact(&self.value))
            .field("subject_user_id", &self.subject_user_id)
            .field("role", &self.role)
            .field("room_id", &self.room_id)
            .finish()
    }
}

fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(8).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_window() {
        let issued = Instant::now();
        let token = SessionToken::new(
            "tok-abc",
            "p1",
            SessionKey::host(42),
            issued,
            Duration::from_secs(300),
        );

        assert!(token.is_fresh(issued));
        assert!(token.is_fresh(issued + Duration::from_secs(299)));
        assert!(!token.is_fresh(issued + Duration::from_secs(300)));
    }

    #[test]
    fn test_token_matches_key() {
        let token = SessionToken::new(
            "tok",
            "p1",
            SessionKey::host(42),
            Instant::now(),
            Duration::from_secs(1),
        );

        assert!(token.matches(&SessionKey::host(42)));
        assert!(!token.matches(&SessionKey::audience(42)));
        assert!(!token.matches(&SessionKey::host(43)));
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = SessionToken::new(
            "04AAAAAGsecretsecret",
            "p1",
            SessionKey::host(1),
            Instant::now(),
            Duration::from_secs(1),
        );
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secretsecret"));
        assert!(debug.contains("04AAAAAG..."));
    }
}
