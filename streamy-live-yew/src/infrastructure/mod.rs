//! Browser adapters for the core collaborator traits

pub mod browser_storage;
pub mod dom_sink;
pub mod js;
pub mod js_actor;
pub mod media_permissions;
pub mod window_sdk;
pub mod zego_engine;

pub use browser_storage::BrowserSessionStore;
pub use dom_sink::VideoSink;
pub use js_actor::JsActor;
pub use media_permissions::{check_media_permissions, request_camera_and_mic_permissions};
pub use window_sdk::{WindowSdk, ZegoSdk, ZEGO_GLOBAL};
pub use zego_engine::{ZegoEngine, ZegoEngineFactory};
