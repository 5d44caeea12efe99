pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use application::{
    resolve_display_name, EngineConfig, GuestIdentityStore, LiveConfig, SdkLoader,
    SdkLoaderConfig, SdkReadiness, SessionController, SessionInputs, TokenProvider,
};
pub use domain::{
    Epoch, GuestIdentity, Role, RoomId, SessionKey, SessionPhase, SessionToken, StreamId, Subject,
};
pub use error::{LiveError, Result};
