use crate::application::{LiveConfig, SdkReadiness};
use crate::domain::{Epoch, SessionKey, SessionPhase, SessionToken, StreamId};
use crate::error::{EngineError, LiveError};
use crate::infrastructure::{
    CameraConfig, Clock, EngineFactory, EngineUser, LiveEngine, MediaSink, RoomStateUpdate,
    StreamUpdate, StreamUpdateKind, Subscription, SystemClock,
};
use futures::lock::Mutex;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Everything the controller reconciles against
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInputs<H> {
    pub key: SessionKey,
    pub readiness: SdkReadiness<H>,
    pub token: Option<SessionToken>,
    /// Profile name; the configured placeholder is used when absent
    pub display_name: Option<String>,
}

/// Engine notification queued by a subscription
#[derive(Debug, Clone)]
enum EngineEvent {
    Streams(StreamUpdate),
    RoomState(RoomStateUpdate),
}

type EventQueue = Rc<RefCell<VecDeque<EngineEvent>>>;
type PhaseObserver = Rc<dyn Fn(&SessionPhase)>;

/// Resources owned by one activation epoch
struct LiveSession<E: LiveEngine> {
    key: SessionKey,
    epoch: Epoch,
    user_id: String,
    local_stream_id: StreamId,
    engine: Rc<E>,
    subscriptions: Vec<Subscription>,
    events: EventQueue,
    logged_in: bool,
    local_media: Option<E::Media>,
    publishing: Option<StreamId>,
    remote: HashMap<StreamId, E::Media>,
}

impl<E: LiveEngine> LiveSession<E> {
    fn room(&self) -> String {
        self.key.room_id.to_string()
    }

    fn is_local(&self, stream_id: &StreamId, user_id: &str) -> bool {
        *stream_id == self.local_stream_id || user_id == self.user_id
    }
}

struct ControllerState<E: LiveEngine> {
    phase: SessionPhase,
    epoch: Epoch,
    /// Target of the current session, or of the activation that failed
    key: Option<SessionKey>,
    session: Option<LiveSession<E>>,
}

/// Drives one engine lifecycle per (room, role) target
///
/// `Idle → Activating → Publishing (host) → Active → TearingDown → Idle`, with
/// `Error` reachable from Activating and Publishing. Every asynchronous step
/// re-checks the epoch it started under; a superseded continuation never
/// touches controller state.
pub struct SessionController<F, S>
where
    F: EngineFactory,
    S: MediaSink<Media = <F::Engine as LiveEngine>::Media>,
{
    factory: F,
    sink: S,
    config: LiveConfig,
    clock: Rc<dyn Clock>,
    state: RefCell<ControllerState<F::Engine>>,
    /// Serializes sync / teardown / pump so a teardown always finishes
    /// before the next login is issued
    op_lock: Mutex<()>,
    observer: Option<PhaseObserver>,
}

impl<F, S> SessionController<F, S>
where
    F: EngineFactory,
    F::Engine: 'static,
    S: MediaSink<Media = <F::Engine as LiveEngine>::Media>,
{
    pub fn new(factory: F, sink: S, config: LiveConfig) -> Self {
        Self {
            factory,
            sink,
            config,
            clock: Rc::new(SystemClock),
            state: RefCell::new(ControllerState {
                phase: SessionPhase::Idle,
                epoch: Epoch::default(),
                key: None,
                session: None,
            }),
            op_lock: Mutex::new(()),
            observer: None,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called after every phase transition
    pub fn with_observer(mut self, observer: impl Fn(&SessionPhase) + 'static) -> Self {
        self.observer = Some(Rc::new(observer));
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase.clone()
    }

    pub fn epoch(&self) -> Epoch {
        self.state.borrow().epoch
    }

    pub fn key(&self) -> Option<SessionKey> {
        self.state.borrow().key
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn has_session(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    pub fn is_publishing(&self) -> bool {
        self.state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|s| s.publishing.is_some())
    }

    /// Remote streams currently bound to a sink
    pub fn remote_streams(&self) -> Vec<StreamId> {
        let state = self.state.borrow();
        let mut ids: Vec<StreamId> = state
            .session
            .as_ref()
            .map(|s| s.remote.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Reconcile with the latest inputs.
    ///
    /// Tears down a session for a different target first, then activates when
    /// the controller is idle, the SDK is ready and a fresh token for the
    /// target is present. Anything else is a no-op.
    pub async fn sync(&self, inputs: SessionInputs<F::Handle>) -> Result<(), LiveError> {
        let _guard = self.op_lock.lock().await;

        let (current_key, tearing_down) = {
            let state = self.state.borrow();
            (
                state.key,
                matches!(state.phase, SessionPhase::TearingDown),
            )
        };

        if tearing_down || current_key.is_some_and(|k| k != inputs.key) {
            if let Some(old) = current_key {
                tracing::info!("🔄 Session target changed: {} -> {}", old, inputs.key);
            }
            self.teardown_locked().await;
        }

        if !self.state.borrow().phase.is_idle() {
            return Ok(());
        }

        let handle = match inputs.readiness {
            SdkReadiness::Ready(handle) => handle,
            _ => {
                tracing::debug!("⏳ Waiting for SDK before activating {}", inputs.key);
                return Ok(());
            }
        };

        let token = match inputs.token {
            Some(token) if token.matches(&inputs.key) && token.is_fresh(self.clock.now()) => token,
            Some(_) => {
                tracing::debug!("⏳ Token is stale or for another target, waiting for a fresh one");
                return Ok(());
            }
            None => {
                tracing::debug!("⏳ Waiting for token before activating {}", inputs.key);
                return Ok(());
            }
        };

        let display_name = inputs
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.config.default_display_name.clone());

        self.activate(inputs.key, handle, token, display_name).await
    }

    async fn activate(
        &self,
        key: SessionKey,
        handle: F::Handle,
        token: SessionToken,
        display_name: String,
    ) -> Result<(), LiveError> {
        let epoch = {
            let mut state = self.state.borrow_mut();
            state.epoch = state.epoch.next();
            state.key = Some(key);
            state.epoch
        };
        self.set_phase(SessionPhase::Activating);
        tracing::info!("🚀 Activating {} (epoch {})", key, epoch);

        if let Err(e) = self.config.engine.validate() {
            return self.fail(epoch, e.into()).await;
        }

        let engine = match self.factory.create(&handle, &self.config.engine) {
            Ok(engine) => Rc::new(engine),
            Err(e) => return self.fail(epoch, e.into()).await,
        };

        // Subscribe before login so no stream added during login is missed.
        let events: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let subscriptions = {
            let streams = events.clone();
            let room_state = events.clone();
            vec![
                engine.on_stream_update(Box::new(move |update| {
                    streams.borrow_mut().push_back(EngineEvent::Streams(update));
                })),
                engine.on_room_state_update(Box::new(move |update| {
                    room_state
                        .borrow_mut()
                        .push_back(EngineEvent::RoomState(update));
                })),
            ]
        };

        let user_id = token.subject_user_id().to_string();
        let room = key.room_id.to_string();
        self.state.borrow_mut().session = Some(LiveSession {
            key,
            epoch,
            user_id: user_id.clone(),
            local_stream_id: StreamId::for_publisher(key.room_id, &user_id),
            engine: engine.clone(),
            subscriptions,
            events,
            logged_in: false,
            local_media: None,
            publishing: None,
            remote: HashMap::new(),
        });

        let user = EngineUser {
            user_id: user_id.clone(),
            user_name: display_name,
        };
        tracing::info!("🔑 Logging into room {} as {}", room, user.user_name);
        let login = engine.login_room(&room, token.value(), &user).await;

        if !self.is_current(epoch) {
            tracing::debug!("⏹️  Login for epoch {} completed after it was superseded", epoch);
            if matches!(login, Ok(true)) {
                if let Err(e) = engine.logout_room(&room).await {
                    tracing::warn!("⚠️  Logout of superseded login failed: {}", e);
                }
            }
            return Ok(());
        }

        match login {
            Ok(true) => {
                self.with_session(epoch, |s| s.logged_in = true);
            }
            Ok(false) => {
                return self
                    .fail(epoch, EngineError::new("loginRoom", "login rejected").into())
                    .await;
            }
            Err(e) => return self.fail(epoch, e.into()).await,
        }

        if !key.role.is_host() {
            self.set_phase(SessionPhase::Active);
            tracing::info!("✅ Watching room {}", room);
            return Ok(());
        }

        self.publish(epoch, key, &engine, &user_id).await
    }

    async fn publish(
        &self,
        epoch: Epoch,
        key: SessionKey,
        engine: &Rc<F::Engine>,
        user_id: &str,
    ) -> Result<(), LiveError> {
        self.set_phase(SessionPhase::Publishing);
        tracing::info!("🎥 Requesting camera and microphone");

        let media = engine.create_stream(CameraConfig::default()).await;

        if !self.is_current(epoch) {
            tracing::debug!("⏹️  Capture for epoch {} completed after it was superseded", epoch);
            if let Ok(media) = media {
                if let Err(e) = engine.destroy_stream(&media) {
                    tracing::warn!("⚠️  Destroying superseded capture failed: {}", e);
                }
            }
            return Ok(());
        }

        let media = match media {
            Ok(media) => media,
            Err(e) => {
                let media_error = e.into_media_error();
                tracing::error!("❌ Media acquisition failed: {:?}", media_error.reason);
                return self.fail(epoch, media_error.into()).await;
            }
        };

        self.sink.attach_local(&media);
        self.with_session(epoch, |s| s.local_media = Some(media.clone()));

        let stream_id = StreamId::for_publisher(key.room_id, user_id);
        tracing::info!("📡 Publishing stream {}", stream_id);
        let published = engine.start_publishing_stream(&stream_id, &media).await;

        if !self.is_current(epoch) {
            tracing::debug!("⏹️  Publish for epoch {} completed after it was superseded", epoch);
            if matches!(published, Ok(true)) {
                if let Err(e) = engine.stop_publishing_stream(&stream_id).await {
                    tracing::warn!("⚠️  Stopping superseded publish failed: {}", e);
                }
            }
            return Ok(());
        }

        match published {
            Ok(true) => {
                self.with_session(epoch, |s| s.publishing = Some(stream_id.clone()));
                self.set_phase(SessionPhase::Active);
                tracing::info!("✅ Live in room {} as {}", key.room_id, stream_id);
                Ok(())
            }
            Ok(false) => {
                self.fail(
                    epoch,
                    EngineError::new("startPublishingStream", "publish rejected").into(),
                )
                .await
            }
            Err(e) => self.fail(epoch, e.into()).await,
        }
    }

    /// Release everything the failed epoch acquired, then surface `error`.
    async fn fail(&self, epoch: Epoch, error: LiveError) -> Result<(), LiveError> {
        if !self.is_current(epoch) {
            return Ok(());
        }
        tracing::error!("❌ Session initialization failed: {}", error);

        let session = self.state.borrow_mut().session.take();
        if let Some(session) = session {
            self.release(session).await;
        }

        if self.is_current(epoch) {
            self.set_phase(SessionPhase::Error(error.clone()));
        }
        Err(error)
    }

    /// Apply queued engine notifications.
    ///
    /// Returns the number of notifications handled.
    pub async fn pump_events(&self) -> usize {
        let _guard = self.op_lock.lock().await;

        let (epoch, engine, events) = {
            let state = self.state.borrow();
            match state.session.as_ref() {
                Some(session) => {
                    let drained: Vec<EngineEvent> =
                        session.events.borrow_mut().drain(..).collect();
                    (session.epoch, session.engine.clone(), drained)
                }
                None => return 0,
            }
        };

        let mut handled = 0;
        for event in events {
            if !self.is_current(epoch) {
                break;
            }
            handled += 1;

            match event {
                EngineEvent::RoomState(update) => {
                    tracing::info!(
                        "🛰️  Room {} state {:?} (code {})",
                        update.room_id,
                        update.state,
                        update.error_code
                    );
                }
                EngineEvent::Streams(update) => match update.kind {
                    StreamUpdateKind::Add => {
                        for stream in update.streams {
                            let local = self
                                .state
                                .borrow()
                                .session
                                .as_ref()
                                .is_some_and(|s| s.is_local(&stream.stream_id, &stream.user.user_id));
                            if local {
                                tracing::debug!("🙈 Skipping own stream {}", stream.stream_id);
                                continue;
                            }
                            self.play_remote(epoch, &engine, stream.stream_id).await;
                            if !self.is_current(epoch) {
                                break;
                            }
                        }
                    }
                    StreamUpdateKind::Delete => {
                        for stream in update.streams {
                            self.remove_remote(epoch, &engine, &stream.stream_id).await;
                        }
                    }
                },
            }
        }
        handled
    }

    async fn play_remote(&self, epoch: Epoch, engine: &Rc<F::Engine>, stream_id: StreamId) {
        tracing::info!("▶️  Playing remote stream {}", stream_id);
        let media = engine.start_playing_stream(&stream_id).await;

        if !self.is_current(epoch) {
            tracing::debug!("⏹️  Playback of {} resolved after teardown", stream_id);
            return;
        }

        match media {
            Ok(media) => {
                self.sink.attach_remote(&stream_id, &media);
                self.with_session(epoch, |s| {
                    s.remote.insert(stream_id.clone(), media.clone());
                });
            }
            Err(e) => tracing::warn!("⚠️  Could not play {}: {}", stream_id, e),
        }
    }

    async fn remove_remote(&self, epoch: Epoch, engine: &Rc<F::Engine>, stream_id: &StreamId) {
        let was_bound = self
            .with_session(epoch, |s| s.remote.remove(stream_id).is_some())
            .unwrap_or(false);
        if was_bound {
            tracing::info!("⏏️  Remote stream {} removed", stream_id);
            self.sink.detach_remote(stream_id);
            if let Err(e) = engine.stop_playing_stream(stream_id).await {
                tracing::warn!("⚠️  Stopping playback of {} failed: {}", stream_id, e);
            }
        }
    }

    /// Supersede whatever is in flight without waiting.
    ///
    /// Pending continuations of the current epoch become no-ops. Follow with
    /// [`SessionController::teardown`] to release resources.
    pub fn invalidate(&self) -> Epoch {
        let (epoch, changed) = {
            let mut state = self.state.borrow_mut();
            state.epoch = state.epoch.next();
            let changed = state.session.is_some() || state.phase.is_busy();
            if changed {
                state.phase = SessionPhase::TearingDown;
            }
            (state.epoch, changed)
        };
        if changed {
            tracing::debug!("⏹️  Invalidated session, now at epoch {}", epoch);
            self.notify(&SessionPhase::TearingDown);
        }
        epoch
    }

    /// Release the current session, if any, and return to `Idle`.
    ///
    /// Best effort and idempotent: step failures are logged, a second call
    /// finds nothing to release.
    pub async fn teardown(&self) {
        self.invalidate();
        let _guard = self.op_lock.lock().await;
        self.teardown_locked().await;
    }

    /// Clear an `Error` phase so the next sync may activate again.
    pub fn reset(&self) {
        let cleared = {
            let mut state = self.state.borrow_mut();
            if matches!(state.phase, SessionPhase::Error(_)) && state.session.is_none() {
                state.phase = SessionPhase::Idle;
                state.key = None;
                true
            } else {
                false
            }
        };
        if cleared {
            self.notify(&SessionPhase::Idle);
        }
    }

    async fn teardown_locked(&self) {
        let session = {
            let mut state = self.state.borrow_mut();
            state.key = None;
            state.session.take()
        };

        if let Some(session) = session {
            self.set_phase(SessionPhase::TearingDown);
            tracing::info!("🧹 Tearing down {} (epoch {})", session.key, session.epoch);
            self.release(session).await;
        }

        if !self.state.borrow().phase.is_idle() {
            self.set_phase(SessionPhase::Idle);
        }
    }

    async fn release(&self, mut session: LiveSession<F::Engine>) {
        let engine = session.engine.clone();
        let room = session.room();

        if let Some(stream_id) = session.publishing.take() {
            if let Err(e) = engine.stop_publishing_stream(&stream_id).await {
                tracing::warn!("⚠️  Teardown: stop publishing {} failed: {}", stream_id, e);
            }
        }

        if let Some(media) = session.local_media.take() {
            if let Err(e) = engine.destroy_stream(&media) {
                tracing::warn!("⚠️  Teardown: destroying local stream failed: {}", e);
            }
            self.sink.detach_local();
        }

        if session.logged_in {
            session.logged_in = false;
            if let Err(e) = engine.logout_room(&room).await {
                tracing::warn!("⚠️  Teardown: logout of room {} failed: {}", room, e);
            }
        }

        for stream_id in session.remote.keys() {
            self.sink.detach_remote(stream_id);
        }
        session.remote.clear();
        self.sink.clear();

        for subscription in session.subscriptions.drain(..) {
            subscription.dispose();
        }
        session.events.borrow_mut().clear();

        if let Err(e) = engine.destroy() {
            tracing::warn!("⚠️  Teardown: releasing engine failed: {}", e);
        }
        tracing::info!("👋 Left room {}", room);
    }

    fn is_current(&self, epoch: Epoch) -> bool {
        self.state.borrow().epoch == epoch
    }

    /// Mutate the session only if it still belongs to `epoch`
    fn with_session<R>(
        &self,
        epoch: Epoch,
        f: impl FnOnce(&mut LiveSession<F::Engine>) -> R,
    ) -> Option<R> {
        let mut state = self.state.borrow_mut();
        match state.session.as_mut() {
            Some(session) if session.epoch == epoch => Some(f(session)),
            _ => None,
        }
    }

    fn set_phase(&self, phase: SessionPhase) {
        {
            let mut state = self.state.borrow_mut();
            if state.phase == phase {
                return;
            }
            state.phase = phase.clone();
        }
        tracing::debug!("🔀 Session phase -> {}", phase);
        self.notify(&phase);
    }

    fn notify(&self, phase: &SessionPhase) {
        if let Some(observer) = &self.observer {
            observer(phase);
        }
    }
}
