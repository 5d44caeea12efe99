mod use_display_name;
mod use_guest_id;
mod use_live_session;
mod use_sdk_loader;
mod use_session_token;

pub use use_display_name::use_display_name;
pub use use_guest_id::{clear_guest_id, use_subject};
pub use use_live_session::{use_live_session, LiveSessionHandle};
pub use use_sdk_loader::{use_sdk_loader, SdkLoaderHandle};
pub use use_session_token::{use_session_token, SessionTokenHandle, TokenState};
