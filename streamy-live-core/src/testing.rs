//! In-memory collaborators for driving the session bootstrap without a browser.
//!
//! Everything here records what it was asked to do so tests can assert on
//! call order across engine instances.

use crate::application::EngineConfig;
use crate::domain::StreamId;
use crate::error::EngineError;
use crate::infrastructure::{
    ActorError, CameraConfig, Clock, EngineFactory, EngineUser, LiveEngine, MediaSink,
    RemoteStream, RoomConnectionState, RoomStateUpdate, SdkProvider, StreamUpdate,
    StreamUpdateKind, StreamyActor, Subscription, Timer, UserProfile,
};
use async_trait::async_trait;
use futures::channel::oneshot;
use instant::{Duration, Instant};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

// ===== SDK provider / timer / clock =====

/// SDK global that appears on the n-th check (or never)
#[derive(Debug, Clone)]
pub struct ScriptedSdk {
    appears_at: Option<u32>,
    checks: Rc<Cell<u32>>,
}

impl ScriptedSdk {
    pub fn appears_at(attempt: u32) -> Self {
        Self {
            appears_at: Some(attempt),
            checks: Rc::new(Cell::new(0)),
        }
    }

    pub fn ready() -> Self {
        Self::appears_at(1)
    }

    pub fn never() -> Self {
        Self {
            appears_at: None,
            checks: Rc::new(Cell::new(0)),
        }
    }

    pub fn checks(&self) -> u32 {
        self.checks.get()
    }
}

impl SdkProvider for ScriptedSdk {
    type Handle = MockSdkHandle;

    fn try_get(&self) -> Option<MockSdkHandle> {
        let n = self.checks.get() + 1;
        self.checks.set(n);
        match self.appears_at {
            Some(at) if n >= at => Some(MockSdkHandle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSdkHandle;

type SleepHook = Rc<RefCell<Option<Box<dyn Fn(u32)>>>>;

/// Timer that returns immediately and records the requested durations
#[derive(Clone, Default)]
pub struct InstantTimer {
    slept: Rc<Cell<Duration>>,
    sleeps: Rc<Cell<u32>>,
    hook: SleepHook,
}

impl InstantTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }

    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }

    /// Run `hook` with the sleep count after every sleep
    pub fn on_sleep(&self, hook: impl Fn(u32) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }
}

#[async_trait(?Send)]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        let n = self.sleeps.get() + 1;
        self.sleeps.set(n);
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook(n);
        }
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

// ===== Backend actor =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorCall {
    HostToken { room_id: u64, user_id: String },
    AudienceToken { room_id: u64, user_id: String },
    CallerProfile,
}

/// Backend actor with canned answers
#[derive(Debug, Default)]
pub struct MockActor {
    host_token: RefCell<Option<Result<String, ActorError>>>,
    audience_token: RefCell<Option<Result<String, ActorError>>>,
    profile: RefCell<Option<UserProfile>>,
    profile_fails: Cell<bool>,
    calls: RefCell<Vec<ActorCall>>,
}

impl MockActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host_token(self, token: &str) -> Self {
        *self.host_token.borrow_mut() = Some(Ok(token.to_string()));
        self
    }

    pub fn with_audience_token(self, token: &str) -> Self {
        *self.audience_token.borrow_mut() = Some(Ok(token.to_string()));
        self
    }

    pub fn with_display_name(self, name: &str) -> Self {
        *self.profile.borrow_mut() = Some(UserProfile {
            display_name: name.to_string(),
            avatar_url: None,
        });
        self
    }

    /// Every token request rejects with `message`
    pub fn rejecting(self, message: &str) -> Self {
        self.reject_tokens(message);
        self
    }

    pub fn reject_tokens(&self, message: &str) {
        *self.host_token.borrow_mut() = Some(Err(ActorError(message.to_string())));
        *self.audience_token.borrow_mut() = Some(Err(ActorError(message.to_string())));
    }

    pub fn set_host_token(&self, token: &str) {
        *self.host_token.borrow_mut() = Some(Ok(token.to_string()));
    }

    pub fn set_audience_token(&self, token: &str) {
        *self.audience_token.borrow_mut() = Some(Ok(token.to_string()));
    }

    pub fn fail_profile(&self) {
        self.profile_fails.set(true);
    }

    pub fn calls(&self) -> Vec<ActorCall> {
        self.calls.borrow().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, ActorCall::CallerProfile))
            .count()
    }

    fn answer(slot: &RefCell<Option<Result<String, ActorError>>>) -> Result<String, ActorError> {
        slot.borrow()
            .clone()
            .unwrap_or_else(|| Err(ActorError("Room not found".to_string())))
    }
}

#[async_trait(?Send)]
impl StreamyActor for MockActor {
    async fn generate_host_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        self.calls.borrow_mut().push(ActorCall::HostToken {
            room_id,
            user_id: user_id.to_string(),
        });
        Self::answer(&self.host_token)
    }

    async fn generate_audience_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        self.calls.borrow_mut().push(ActorCall::AudienceToken {
            room_id,
            user_id: user_id.to_string(),
        });
        Self::answer(&self.audience_token)
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError> {
        self.calls.borrow_mut().push(ActorCall::CallerProfile);
        if self.profile_fails.get() {
            return Err(ActorError("profile lookup failed".to_string()));
        }
        Ok(self.profile.borrow().clone())
    }
}

// ===== Streaming engine =====

/// Media handle produced by the mock engine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockMedia {
    pub id: u32,
    pub label: String,
}

/// Every observable call made against a mock engine, tagged with the engine
/// instance number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Created { app_id: u32, server: String },
    Subscribe(&'static str),
    Unsubscribe(&'static str),
    LoginRoom { room_id: String, token: String, user_id: String, user_name: String },
    LogoutRoom { room_id: String },
    CreateStream,
    DestroyStream(u32),
    StartPublishing(String),
    StopPublishing(String),
    StartPlaying(String),
    StopPlaying(String),
    Destroy,
}

type StreamHandler = Rc<dyn Fn(StreamUpdate)>;
type RoomStateHandler = Rc<dyn Fn(RoomStateUpdate)>;

#[derive(Default)]
struct MockBackend {
    log: RefCell<Vec<(u32, EngineCall)>>,
    instances: Cell<u32>,
    next_media: Cell<u32>,
    next_handler: Cell<u64>,
    stream_handlers: RefCell<HashMap<u64, (u32, StreamHandler)>>,
    room_handlers: RefCell<HashMap<u64, (u32, RoomStateHandler)>>,
    login_gate: RefCell<Option<oneshot::Receiver<()>>>,
    capture_gate: RefCell<Option<oneshot::Receiver<()>>>,
    fail_create: RefCell<Option<EngineError>>,
    fail_login: RefCell<Option<EngineError>>,
    fail_create_stream: RefCell<Option<EngineError>>,
    fail_publish: RefCell<Option<EngineError>>,
    fail_logout: RefCell<Option<EngineError>>,
    fail_destroy_stream: RefCell<Option<EngineError>>,
    fail_play: RefCell<Option<EngineError>>,
}

impl MockBackend {
    fn record(&self, instance: u32, call: EngineCall) {
        self.log.borrow_mut().push((instance, call));
    }

    fn media(&self, label: &str) -> MockMedia {
        let id = self.next_media.get() + 1;
        self.next_media.set(id);
        MockMedia {
            id,
            label: label.to_string(),
        }
    }

    fn handler_id(&self) -> u64 {
        let id = self.next_handler.get() + 1;
        self.next_handler.set(id);
        id
    }
}

/// Factory whose engines share one call log and one set of behaviours
#[derive(Clone, Default)]
pub struct MockEngineFactory {
    backend: Rc<MockBackend>,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls in order, across all engine instances
    pub fn log(&self) -> Vec<(u32, EngineCall)> {
        self.backend.log.borrow().clone()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.log().into_iter().map(|(_, c)| c).collect()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&EngineCall) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    pub fn instances(&self) -> u32 {
        self.backend.instances.get()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.backend.stream_handlers.borrow().len() + self.backend.room_handlers.borrow().len()
    }

    /// Hold the next `login_room` until the returned sender fires
    pub fn gate_login(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.backend.login_gate.borrow_mut() = Some(rx);
        tx
    }

    /// Hold the next `create_stream` until the returned sender fires
    pub fn gate_capture(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.backend.capture_gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn fail_create(&self, message: &str) {
        *self.backend.fail_create.borrow_mut() = Some(EngineError::new("new", message));
    }

    pub fn fail_login(&self, message: &str) {
        *self.backend.fail_login.borrow_mut() = Some(EngineError::new("loginRoom", message));
    }

    /// Capture rejects with a DOMException of `name`
    pub fn fail_capture(&self, name: &str) {
        *self.backend.fail_create_stream.borrow_mut() =
            Some(EngineError::new("createStream", "capture failed").with_name(name));
    }

    pub fn fail_publish(&self, message: &str) {
        *self.backend.fail_publish.borrow_mut() =
            Some(EngineError::new("startPublishingStream", message));
    }

    pub fn fail_logout(&self, message: &str) {
        *self.backend.fail_logout.borrow_mut() = Some(EngineError::new("logoutRoom", message));
    }

    pub fn fail_destroy_stream(&self, message: &str) {
        *self.backend.fail_destroy_stream.borrow_mut() =
            Some(EngineError::new("destroyStream", message));
    }

    pub fn fail_play(&self, message: &str) {
        *self.backend.fail_play.borrow_mut() =
            Some(EngineError::new("startPlayingStream", message));
    }

    /// Deliver a `roomStreamUpdate` to the newest engine's handlers
    pub fn emit_streams(&self, kind: StreamUpdateKind, room_id: &str, streams: &[(&str, &str)]) {
        let newest = self.backend.instances.get();
        let update = StreamUpdate {
            room_id: room_id.to_string(),
            kind,
            streams: streams
                .iter()
                .map(|(stream_id, user_id)| RemoteStream {
                    stream_id: StreamId::new(*stream_id),
                    user: EngineUser {
                        user_id: user_id.to_string(),
                        user_name: user_id.to_string(),
                    },
                })
                .collect(),
        };
        let handlers: Vec<StreamHandler> = self
            .backend
            .stream_handlers
            .borrow()
            .values()
            .filter(|(instance, _)| *instance == newest)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(update.clone());
        }
    }

    /// Deliver a `roomStateUpdate` to the newest engine's handlers
    pub fn emit_room_state(&self, room_id: &str, state: RoomConnectionState) {
        let newest = self.backend.instances.get();
        let handlers: Vec<RoomStateHandler> = self
            .backend
            .room_handlers
            .borrow()
            .values()
            .filter(|(instance, _)| *instance == newest)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(RoomStateUpdate {
                room_id: room_id.to_string(),
                state,
                error_code: 0,
            });
        }
    }
}

impl EngineFactory for MockEngineFactory {
    type Handle = MockSdkHandle;
    type Engine = MockEngine;

    fn create(&self, _handle: &MockSdkHandle, config: &EngineConfig) -> Result<MockEngine, EngineError> {
        if let Some(err) = self.backend.fail_create.borrow().clone() {
            return Err(err);
        }
        let instance = self.backend.instances.get() + 1;
        self.backend.instances.set(instance);
        self.backend.record(
            instance,
            EngineCall::Created {
                app_id: config.app_id,
                server: config.server.clone(),
            },
        );
        Ok(MockEngine {
            instance,
            backend: self.backend.clone(),
        })
    }
}

/// Engine instance handed out by [`MockEngineFactory`]
pub struct MockEngine {
    instance: u32,
    backend: Rc<MockBackend>,
}

impl MockEngine {
    fn record(&self, call: EngineCall) {
        self.backend.record(self.instance, call);
    }
}

#[async_trait(?Send)]
impl LiveEngine for MockEngine {
    type Media = MockMedia;

    fn on_stream_update(&self, handler: Box<dyn Fn(StreamUpdate)>) -> Subscription {
        self.record(EngineCall::Subscribe("roomStreamUpdate"));
        let id = self.backend.handler_id();
        self.backend
            .stream_handlers
            .borrow_mut()
            .insert(id, (self.instance, Rc::from(handler)));
        let backend = self.backend.clone();
        let instance = self.instance;
        Subscription::new(move || {
            backend.stream_handlers.borrow_mut().remove(&id);
            backend.record(instance, EngineCall::Unsubscribe("roomStreamUpdate"));
        })
    }

    fn on_room_state_update(&self, handler: Box<dyn Fn(RoomStateUpdate)>) -> Subscription {
        self.record(EngineCall::Subscribe("roomStateUpdate"));
        let id = self.backend.handler_id();
        self.backend
            .room_handlers
            .borrow_mut()
            .insert(id, (self.instance, Rc::from(handler)));
        let backend = self.backend.clone();
        let instance = self.instance;
        Subscription::new(move || {
            backend.room_handlers.borrow_mut().remove(&id);
            backend.record(instance, EngineCall::Unsubscribe("roomStateUpdate"));
        })
    }

    async fn login_room(
        &self,
        room_id: &str,
        token: &str,
        user: &EngineUser,
    ) -> Result<bool, EngineError> {
        self.record(EngineCall::LoginRoom {
            room_id: room_id.to_string(),
            token: token.to_string(),
            user_id: user.user_id.clone(),
            user_name: user.user_name.clone(),
        });
        let gate = self.backend.login_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match self.backend.fail_login.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    async fn logout_room(&self, room_id: &str) -> Result<bool, EngineError> {
        self.record(EngineCall::LogoutRoom {
            room_id: room_id.to_string(),
        });
        match self.backend.fail_logout.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    async fn create_stream(&self, _camera: CameraConfig) -> Result<MockMedia, EngineError> {
        self.record(EngineCall::CreateStream);
        let gate = self.backend.capture_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.backend.fail_create_stream.borrow().clone() {
            return Err(err);
        }
        Ok(self.backend.media("local"))
    }

    fn destroy_stream(&self, media: &MockMedia) -> Result<(), EngineError> {
        self.record(EngineCall::DestroyStream(media.id));
        match self.backend.fail_destroy_stream.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn start_publishing_stream(
        &self,
        stream_id: &StreamId,
        _media: &MockMedia,
    ) -> Result<bool, EngineError> {
        self.record(EngineCall::StartPublishing(stream_id.to_string()));
        match self.backend.fail_publish.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    async fn stop_publishing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError> {
        self.record(EngineCall::StopPublishing(stream_id.to_string()));
        Ok(true)
    }

    async fn start_playing_stream(&self, stream_id: &StreamId) -> Result<MockMedia, EngineError> {
        self.record(EngineCall::StartPlaying(stream_id.to_string()));
        if let Some(err) = self.backend.fail_play.borrow().clone() {
            return Err(err);
        }
        Ok(self.backend.media(stream_id.as_str()))
    }

    async fn stop_playing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError> {
        self.record(EngineCall::StopPlaying(stream_id.to_string()));
        Ok(true)
    }

    fn destroy(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Destroy);
        Ok(())
    }
}

// ===== Media sink =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    AttachLocal(u32),
    DetachLocal,
    AttachRemote(String, u32),
    DetachRemote(String),
    Clear,
}

/// Sink that keeps bindings in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    local: RefCell<Option<MockMedia>>,
    remote: RefCell<BTreeMap<StreamId, MockMedia>>,
    calls: RefCell<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(&self) -> Option<MockMedia> {
        self.local.borrow().clone()
    }

    pub fn remote(&self, stream_id: &str) -> Option<MockMedia> {
        self.remote.borrow().get(&StreamId::new(stream_id)).cloned()
    }

    pub fn remote_count(&self) -> usize {
        self.remote.borrow().len()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.borrow().clone()
    }
}

impl MediaSink for RecordingSink {
    type Media = MockMedia;

    fn attach_local(&self, media: &MockMedia) {
        self.calls.borrow_mut().push(SinkCall::AttachLocal(media.id));
        *self.local.borrow_mut() = Some(media.clone());
    }

    fn detach_local(&self) {
        self.calls.borrow_mut().push(SinkCall::DetachLocal);
        *self.local.borrow_mut() = None;
    }

    fn attach_remote(&self, stream_id: &StreamId, media: &MockMedia) {
        self.calls
            .borrow_mut()
            .push(SinkCall::AttachRemote(stream_id.to_string(), media.id));
        self.remote
            .borrow_mut()
            .insert(stream_id.clone(), media.clone());
    }

    fn detach_remote(&self, stream_id: &StreamId) {
        self.calls
            .borrow_mut()
            .push(SinkCall::DetachRemote(stream_id.to_string()));
        self.remote.borrow_mut().remove(stream_id);
    }

    fn clear(&self) {
        self.calls.borrow_mut().push(SinkCall::Clear);
        *self.local.borrow_mut() = None;
        self.remote.borrow_mut().clear();
    }
}
