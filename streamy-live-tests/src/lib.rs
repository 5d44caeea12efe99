use cucumber::World;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use streamy_live_core::application::{
    GuestIdentityStore, LiveConfig, SdkLoader, SdkLoaderConfig, SdkReadiness, SessionController,
    SessionInputs, TokenProvider,
};
use streamy_live_core::domain::{Role, RoomId, SessionKey, SessionToken, Subject};
use streamy_live_core::error::{LiveError, TokenError};
use streamy_live_core::infrastructure::MemoryStore;
use streamy_live_core::testing::{
    EngineCall, InstantTimer, ManualClock, MockActor, MockEngineFactory, MockSdkHandle,
    RecordingSink, ScriptedSdk,
};

pub type Controller = SessionController<MockEngineFactory, Rc<RecordingSink>>;
pub type Loader = SdkLoader<ScriptedSdk, InstantTimer>;

#[derive(World)]
#[world(init = Self::new)]
pub struct LiveWorld {
    /// Session controller (the system under test)
    pub controller: Controller,

    pub engines: MockEngineFactory,
    pub sink: Rc<RecordingSink>,
    pub clock: ManualClock,
    pub actor: Rc<MockActor>,
    pub tokens: TokenProvider<Rc<MockActor>>,
    pub storage: Rc<MemoryStore>,
    pub guests: GuestIdentityStore<Rc<MemoryStore>>,

    /// SDK loader built by a "Given the SDK ..." step
    pub loader: Option<Loader>,
    pub sdk: Option<ScriptedSdk>,
    pub timer: InstantTimer,

    /// Identity tokens are requested for
    pub subject: Option<Subject>,
    pub last_token: Option<SessionToken>,
    pub last_error: Option<LiveError>,

    /// Phase names in the order the controller entered them
    pub phases: Rc<RefCell<Vec<&'static str>>>,

    /// Guest ids handed out so far, in order
    pub guest_ids: Vec<String>,
}

impl LiveWorld {
    pub fn new() -> Self {
        let engines = MockEngineFactory::new();
        let sink = Rc::new(RecordingSink::new());
        let clock = ManualClock::new();
        let phases = Rc::new(RefCell::new(Vec::new()));
        let seen = phases.clone();
        let controller = SessionController::new(engines.clone(), sink.clone(), LiveConfig::default())
            .with_clock(Rc::new(clock.clone()))
            .with_observer(move |p| seen.borrow_mut().push(p.name()));

        let actor = Rc::new(MockActor::new());
        let tokens = TokenProvider::with_clock(
            actor.clone(),
            Duration::from_secs(300),
            Rc::new(clock.clone()),
        );
        let storage = Rc::new(MemoryStore::new());

        Self {
            controller,
            engines,
            sink,
            clock,
            actor,
            tokens,
            guests: GuestIdentityStore::new(storage.clone()),
            storage,
            loader: None,
            sdk: None,
            timer: InstantTimer::new(),
            subject: None,
            last_token: None,
            last_error: None,
            phases,
            guest_ids: Vec::new(),
        }
    }

    /// Build an SDK loader over a provider that behaves like `sdk`
    pub fn with_sdk(&mut self, sdk: ScriptedSdk) -> &Loader {
        self.timer = InstantTimer::new();
        self.sdk = Some(sdk.clone());
        self.loader
            .insert(SdkLoader::new(sdk, self.timer.clone(), SdkLoaderConfig::default()))
    }

    pub fn loader(&self) -> &Loader {
        self.loader.as_ref().expect("No SDK loader configured")
    }

    pub fn subject(&mut self) -> Subject {
        if let Some(subject) = &self.subject {
            return subject.clone();
        }
        let subject = self.guests.subject_for(None);
        self.subject = Some(subject.clone());
        subject
    }

    /// Fetch a token for `(room, role)` and reconcile the controller with it
    pub async fn open_room(&mut self, room_id: u64, role: Role) {
        let subject = self.subject();
        let key = SessionKey::new(RoomId::new(room_id), role);

        match self.tokens.fetch_token(key.room_id, role, &subject).await {
            Ok(token) => {
                self.last_token = Some(token.clone());
                let inputs = self.inputs(key, Some(token));
                if let Err(e) = self.controller.sync(inputs).await {
                    self.last_error = Some(e);
                }
            }
            Err(e) => {
                self.last_token = None;
                self.last_error = Some(e.into());
            }
        }
    }

    pub fn inputs(&self, key: SessionKey, token: Option<SessionToken>) -> SessionInputs<MockSdkHandle> {
        SessionInputs {
            key,
            readiness: SdkReadiness::Ready(MockSdkHandle),
            token,
            display_name: None,
        }
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.engines.count(pred)
    }

    pub fn token_error(&self) -> Option<TokenError> {
        match &self.last_error {
            Some(LiveError::TokenAuth(e)) | Some(LiveError::Token(e)) => Some(e.clone()),
            Some(LiveError::TokenConfig) => Some(TokenError::NotConfigured),
            Some(LiveError::TokenNotFound) => Some(TokenError::RoomNotFound),
            _ => None,
        }
    }
}

impl Default for LiveWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LiveWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveWorld")
            .field("phase", &self.controller.phase())
            .field("key", &self.controller.key())
            .field("engine_calls", &self.engines.calls())
            .field("subject", &self.subject)
            .field("last_error", &self.last_error)
            .finish()
    }
}
