pub mod actor;
pub mod clock;
pub mod engine;
pub mod sdk;
pub mod storage;
pub mod timer;

pub use actor::{ActorError, StreamyActor, UserProfile};
pub use clock::{Clock, SystemClock};
pub use engine::{
    CameraConfig, EngineFactory, EngineUser, LiveEngine, MediaSink, RemoteStream,
    RoomConnectionState, RoomStateUpdate, StreamUpdate, StreamUpdateKind, Subscription,
};
pub use sdk::SdkProvider;
pub use storage::{MemoryStore, SessionStore};
#[cfg(feature = "browser")]
pub use timer::GlooTimer;
pub use timer::Timer;
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use timer::TokioTimer;
