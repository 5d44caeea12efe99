use crate::hooks::use_subject;
use crate::providers::{use_actor, ActorContext};
use std::rc::Rc;
use std::time::Duration;
use streamy_live_core::application::TokenProvider;
use streamy_live_core::domain::{Role, RoomId, SessionToken, Subject};
use streamy_live_core::error::TokenError;
use streamy_live_core::infrastructure::StreamyActor;
use yew::prelude::*;

/// Token fetch as seen by a component
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    Loading,
    Ready(SessionToken),
    Failed(TokenError),
}

impl TokenState {
    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            TokenState::Ready(token) => Some(token),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TokenError> {
        match self {
            TokenState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TokenState::Loading)
    }
}

#[derive(Clone, PartialEq)]
pub struct SessionTokenHandle {
    pub state: TokenState,
    pub subject: Subject,
    /// Drop the cached token and fetch again
    pub refetch: Callback<()>,
}

type SharedProvider = Option<Rc<TokenProvider<Rc<dyn StreamyActor>>>>;

#[derive(Clone, PartialEq)]
struct FetchKey {
    room_id: RoomId,
    role: Role,
    subject: Subject,
    attempt: u32,
}

/// Fetch an engine token for the current subject whenever the target changes
#[hook]
pub fn use_session_token(room_id: RoomId, role: Role, ttl: Duration) -> SessionTokenHandle {
    let actor = use_actor();
    let subject = use_subject(actor.principal.clone());
    let state = use_state(|| TokenState::Loading);
    let attempt = use_state(|| 0u32);
    let request = use_mut_ref(|| 0u64);

    let provider: Rc<SharedProvider> = use_memo(actor.clone(), move |ctx: &ActorContext| {
        ctx.actor
            .clone()
            .map(|actor| Rc::new(TokenProvider::new(actor, ttl)))
    });

    {
        let state = state.setter();
        let provider = provider.clone();
        let request = request.clone();
        let key = FetchKey {
            room_id,
            role,
            subject: subject.clone(),
            attempt: *attempt,
        };
        use_effect_with(key, move |key| {
            let id = {
                let mut request = request.borrow_mut();
                *request += 1;
                *request
            };

            match (*provider).clone() {
                None => {
                    tracing::warn!("🚫 No backend actor, cannot request a token");
                    state.set(TokenState::Failed(TokenError::ActorUnavailable));
                }
                Some(provider) => {
                    state.set(TokenState::Loading);
                    let key = key.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = provider
                            .fetch_token(key.room_id, key.role, &key.subject)
                            .await;
                        // a newer target or refetch superseded this request
                        if *request.borrow() != id {
                            return;
                        }
                        state.set(match result {
                            Ok(token) => TokenState::Ready(token),
                            Err(e) => TokenState::Failed(e),
                        });
                    });
                }
            }
            || {}
        });
    }

    let refetch = {
        let provider = provider.clone();
        let attempt = attempt.clone();
        let subject = subject.clone();
        Callback::from(move |_: ()| {
            if let Some(provider) = (*provider).as_ref() {
                provider.invalidate(room_id, role, subject.user_id());
            }
            attempt.set(*attempt + 1);
        })
    };

    SessionTokenHandle {
        state: (*state).clone(),
        subject,
        refetch,
    }
}
