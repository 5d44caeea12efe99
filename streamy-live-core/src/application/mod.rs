pub mod config;
pub mod display_name;
pub mod guest_identity;
pub mod sdk_loader;
pub mod session_controller;
pub mod token_provider;

pub use config::{EngineConfig, LiveConfig, SdkLoaderConfig};
pub use display_name::resolve_display_name;
pub use guest_identity::{GuestIdentityStore, GUEST_USER_ID_KEY};
pub use sdk_loader::{is_retryable, SdkLoader, SdkReadiness};
pub use session_controller::{SessionController, SessionInputs};
pub use token_provider::TokenProvider;
