use crate::domain::{Role, RoomId, SessionKey, SessionToken, Subject};
use crate::error::TokenError;
use crate::infrastructure::{Clock, StreamyActor, SystemClock};
use instant::Duration;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    room_id: RoomId,
    user_id: String,
    role: Role,
}

/// Requests engine tokens from the backend actor
///
/// Successful tokens are cached per (room, user, role) for the freshness
/// window; failures are never cached and never retried here.
pub struct TokenProvider<A: StreamyActor> {
    actor: A,
    clock: Rc<dyn Clock>,
    ttl: Duration,
    cache: RefCell<HashMap<CacheKey, SessionToken>>,
}

impl<A: StreamyActor> TokenProvider<A> {
    pub fn new(actor: A, ttl: Duration) -> Self {
        Self::with_clock(actor, ttl, Rc::new(SystemClock))
    }

    pub fn with_clock(actor: A, ttl: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            actor,
            clock,
            ttl,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn actor(&self) -> &A {
        &self.actor
    }

    /// Fetch (or reuse) a token for `subject` in `room_id` as `role`.
    pub async fn fetch_token(
        &self,
        room_id: RoomId,
        role: Role,
        subject: &Subject,
    ) -> Result<SessionToken, TokenError> {
        if role.is_host() && !subject.is_authenticated() {
            tracing::warn!("🚫 Host token requested without a signed-in identity");
            return Err(TokenError::NotAuthenticated);
        }

        if let Some(token) = self.cached(room_id, role, subject.user_id()) {
            tracing::debug!("♻️  Reusing cached {} token for room {}", role, room_id);
            return Ok(token);
        }

        let user_id = subject.user_id();
        tracing::info!(
            "🎫 Requesting {} token for room {} (user {})",
            role,
            room_id,
            user_id
        );

        let result = match role {
            Role::Host => self.actor.generate_host_token(room_id.value(), user_id).await,
            Role::Audience => {
                self.actor
                    .generate_audience_token(room_id.value(), user_id)
                    .await
            }
        };

        match result {
            Ok(value) => {
                let token = SessionToken::new(
                    value,
                    user_id,
                    SessionKey::new(room_id, role),
                    self.clock.now(),
                    self.ttl,
                );
                tracing::info!("✅ Token received: {:?}", token);
                self.cache.borrow_mut().insert(
                    CacheKey {
                        room_id,
                        user_id: user_id.to_string(),
                        role,
                    },
                    token.clone(),
                );
                Ok(token)
            }
            Err(e) => {
                let error = TokenError::classify(&e.0);
                tracing::error!("❌ Failed to generate token: {} ({:?})", e, error);
                Err(error)
            }
        }
    }

    /// Cached token if it is still fresh
    pub fn cached(&self, room_id: RoomId, role: Role, user_id: &str) -> Option<SessionToken> {
        let key = CacheKey {
            room_id,
            user_id: user_id.to_string(),
            role,
        };
        let now = self.clock.now();
        let mut cache = self.cache.borrow_mut();
        match cache.get(&key) {
            Some(token) if token.is_fresh(now) => Some(token.clone()),
            Some(_) => {
                cache.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn invalidate(&self, room_id: RoomId, role: Role, user_id: &str) {
        self.cache.borrow_mut().remove(&CacheKey {
            room_id,
            user_id: user_id.to_string(),
            role,
        });
    }

    /// Drop every cached token (sign-out)
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ActorCall, ManualClock, MockActor};

    fn provider(actor: MockActor, clock: &ManualClock) -> TokenProvider<MockActor> {
        TokenProvider::with_clock(actor, Duration::from_secs(300), Rc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_host_token_for_authenticated_subject() {
        let clock = ManualClock::new();
        let tokens = provider(MockActor::new().with_host_token("tok-abc"), &clock);

        let token = tokens
            .fetch_token(
                RoomId::new(42),
                Role::Host,
                &Subject::Authenticated("p1".into()),
            )
            .await
            .unwrap();

        assert_eq!(token.value(), "tok-abc");
        assert_eq!(token.subject_user_id(), "p1");
        assert_eq!(token.key(), SessionKey::host(42));
        assert_eq!(
            tokens.actor().calls(),
            vec![ActorCall::HostToken {
                room_id: 42,
                user_id: "p1".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_host_token_requires_authentication() {
        let clock = ManualClock::new();
        let tokens = provider(MockActor::new().with_host_token("tok"), &clock);

        let err = tokens
            .fetch_token(RoomId::new(1), Role::Host, &Subject::Guest("guest_1".into()))
            .await
            .unwrap_err();

        assert_eq!(err, TokenError::NotAuthenticated);
        assert!(tokens.actor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_audience_token_accepts_guest() {
        let clock = ManualClock::new();
        let tokens = provider(MockActor::new().with_audience_token("tok-xyz"), &clock);

        let token = tokens
            .fetch_token(
                RoomId::new(7),
                Role::Audience,
                &Subject::Guest("guest_123".into()),
            )
            .await
            .unwrap();

        assert_eq!(token.value(), "tok-xyz");
        assert_eq!(
            tokens.actor().calls(),
            vec![ActorCall::AudienceToken {
                room_id: 7,
                user_id: "guest_123".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_cache_within_window_then_refetch() {
        let clock = ManualClock::new();
        let tokens = provider(MockActor::new().with_audience_token("tok"), &clock);
        let subject = Subject::Guest("g".into());

        tokens
            .fetch_token(RoomId::new(7), Role::Audience, &subject)
            .await
            .unwrap();
        clock.advance(Duration::from_secs(299));
        tokens
            .fetch_token(RoomId::new(7), Role::Audience, &subject)
            .await
            .unwrap();
        assert_eq!(tokens.actor().token_calls(), 1);

        clock.advance(Duration::from_secs(2));
        tokens
            .fetch_token(RoomId::new(7), Role::Audience, &subject)
            .await
            .unwrap();
        assert_eq!(tokens.actor().token_calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_role_and_user() {
        let clock = ManualClock::new();
        let actor = MockActor::new()
            .with_host_token("h")
            .with_audience_token("a");
        let tokens = provider(actor, &clock);
        let p1 = Subject::Authenticated("p1".into());

        tokens.fetch_token(RoomId::new(1), Role::Host, &p1).await.unwrap();
        tokens.fetch_token(RoomId::new(1), Role::Audience, &p1).await.unwrap();
        tokens
            .fetch_token(RoomId::new(1), Role::Audience, &Subject::Authenticated("p2".into()))
            .await
            .unwrap();

        assert_eq!(tokens.actor().token_calls(), 3);
    }

    #[tokio::test]
    async fn test_failures_are_classified_and_not_cached() {
        let clock = ManualClock::new();
        let tokens = provider(
            MockActor::new().rejecting("ZEGO credentials not configured"),
            &clock,
        );
        let subject = Subject::Guest("g".into());

        for _ in 0..2 {
            let err = tokens
                .fetch_token(RoomId::new(3), Role::Audience, &subject)
                .await
                .unwrap_err();
            assert_eq!(err, TokenError::NotConfigured);
        }
        assert_eq!(tokens.actor().token_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let clock = ManualClock::new();
        let tokens = provider(MockActor::new().with_audience_token("a"), &clock);
        let subject = Subject::Guest("g".into());

        tokens
            .fetch_token(RoomId::new(3), Role::Audience, &subject)
            .await
            .unwrap();
        tokens.invalidate(RoomId::new(3), Role::Audience, "g");
        assert!(tokens.cached(RoomId::new(3), Role::Audience, "g").is_none());

        tokens
            .fetch_token(RoomId::new(3), Role::Audience, &subject)
            .await
            .unwrap();
        tokens.clear();
        assert!(tokens.cached(RoomId::new(3), Role::Audience, "g").is_none());
        assert_eq!(tokens.actor().token_calls(), 2);
    }
}
