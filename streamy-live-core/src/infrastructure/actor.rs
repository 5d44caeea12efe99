use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Profile of the calling user as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Rejection returned by the backend actor (the raw trap/reject message)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ActorError(pub String);

/// Subset of the backend actor the live session needs
#[async_trait(?Send)]
pub trait StreamyActor {
    /// Fails if the caller is unauthenticated, the room is absent or the
    /// streaming credentials are unset.
    async fn generate_host_token(&self, room_id: u64, user_id: &str)
        -> Result<String, ActorError>;

    /// Like [`StreamyActor::generate_host_token`] but authentication is optional.
    async fn generate_audience_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError>;

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError>;
}

#[async_trait(?Send)]
impl<A: StreamyActor + ?Sized> StreamyActor for std::rc::Rc<A> {
    async fn generate_host_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        (**self).generate_host_token(room_id, user_id).await
    }

    async fn generate_audience_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        (**self).generate_audience_token(room_id, user_id).await
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError> {
        (**self).get_caller_user_profile().await
    }
}
