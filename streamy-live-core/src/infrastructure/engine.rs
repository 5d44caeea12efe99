use crate::application::EngineConfig;
use crate::domain::StreamId;
use crate::error::EngineError;
use async_trait::async_trait;
use std::fmt;

/// User as announced to the engine on login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineUser {
    pub user_id: String,
    pub user_name: String,
}

/// Kind of a `roomStreamUpdate` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamUpdateKind {
    Add,
    Delete,
}

/// One stream announced in a stream update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub stream_id: StreamId,
    pub user: EngineUser,
}

/// Remote stream list changed in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUpdate {
    pub room_id: String,
    pub kind: StreamUpdateKind,
    pub streams: Vec<RemoteStream>,
}

/// Room connection state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Room connection changed (diagnostic only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStateUpdate {
    pub room_id: String,
    pub state: RoomConnectionState,
    pub error_code: i32,
}

/// Capture request for `create_stream`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfig {
    pub audio: bool,
    pub video: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// Disposer for an event registration
///
/// Dropping a subscription disposes it as well.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn noop() -> Self {
        Self { dispose: None }
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// One live connection context to the real-time media service
#[async_trait(?Send)]
pub trait LiveEngine {
    /// Media stream handle (a `MediaStream` in browsers)
    type Media: Clone;

    fn on_stream_update(&self, handler: Box<dyn Fn(StreamUpdate)>) -> Subscription;

    fn on_room_state_update(&self, handler: Box<dyn Fn(RoomStateUpdate)>) -> Subscription;

    async fn login_room(
        &self,
        room_id: &str,
        token: &str,
        user: &EngineUser,
    ) -> Result<bool, EngineError>;

    async fn logout_room(&self, room_id: &str) -> Result<bool, EngineError>;

    async fn create_stream(&self, camera: CameraConfig) -> Result<Self::Media, EngineError>;

    fn destroy_stream(&self, media: &Self::Media) -> Result<(), EngineError>;

    async fn start_publishing_stream(
        &self,
        stream_id: &StreamId,
        media: &Self::Media,
    ) -> Result<bool, EngineError>;

    async fn stop_publishing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError>;

    async fn start_playing_stream(&self, stream_id: &StreamId) -> Result<Self::Media, EngineError>;

    async fn stop_playing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError>;

    /// Release the engine instance itself
    fn destroy(&self) -> Result<(), EngineError>;
}

/// Builds engine instances from a loaded SDK handle
pub trait EngineFactory {
    type Handle: Clone;
    type Engine: LiveEngine;

    fn create(
        &self,
        handle: &Self::Handle,
        config: &EngineConfig,
    ) -> Result<Self::Engine, EngineError>;
}

/// On-screen elements that render media
pub trait MediaSink {
    type Media;

    fn attach_local(&self, media: &Self::Media);

    fn detach_local(&self);

    /// Bind `media` to the slot of `stream_id`, replacing what was there.
    fn attach_remote(&self, stream_id: &StreamId, media: &Self::Media);

    fn detach_remote(&self, stream_id: &StreamId);

    /// Detach everything
    fn clear(&self);
}

impl<S: MediaSink + ?Sized> MediaSink for std::rc::Rc<S> {
    type Media = S::Media;

    fn attach_local(&self, media: &Self::Media) {
        (**self).attach_local(media)
    }

    fn detach_local(&self) {
        (**self).detach_local()
    }

    fn attach_remote(&self, stream_id: &StreamId, media: &Self::Media) {
        (**self).attach_remote(stream_id, media)
    }

    fn detach_remote(&self, stream_id: &StreamId) {
        (**self).detach_remote(stream_id)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscription_disposes_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = Subscription::new(move || c.set(c.get() + 1));

        sub.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscription_disposes_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let c = count.clone();
            let _sub = Subscription::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }
}
