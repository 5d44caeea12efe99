//! # Streamy Live Yew
//!
//! Browser shell for the live session bootstrap: adapters for the engine SDK,
//! backend actor and DOM, plus the hooks and components that drive them.

pub mod app;
pub mod components;
pub mod hooks;
pub mod infrastructure;
pub mod providers;

// Re-exports for convenience
pub use app::App;
pub use components::{EmptyState, ErrorState, LiveStream, LoadingState};
pub use hooks::{use_live_session, use_sdk_loader, use_session_token};
pub use providers::{ActorContext, ActorProvider};

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);
