use super::js::{error_message, error_name, get, get_string, settle};
use super::window_sdk::ZegoSdk;
use async_trait::async_trait;
use js_sys::{Array, Function, Object, Reflect};
use streamy_live_core::application::EngineConfig;
use streamy_live_core::domain::StreamId;
use streamy_live_core::error::EngineError;
use streamy_live_core::infrastructure::{
    CameraConfig, EngineFactory, EngineUser, LiveEngine, RemoteStream, RoomConnectionState,
    RoomStateUpdate, StreamUpdate, StreamUpdateKind, Subscription,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MediaStream;

#[wasm_bindgen]
extern "C" {
    /// Instance of the CDN `ZegoExpressEngine` class
    #[derive(Debug, Clone)]
    pub type ZegoExpressEngine;

    #[wasm_bindgen(method)]
    fn on(this: &ZegoExpressEngine, event: &str, callback: &Function);

    #[wasm_bindgen(method)]
    fn off(this: &ZegoExpressEngine, event: &str, callback: &Function);

    #[wasm_bindgen(method, catch, js_name = loginRoom)]
    fn login_room(
        this: &ZegoExpressEngine,
        room_id: &str,
        token: &str,
        user: &JsValue,
        config: &JsValue,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = logoutRoom)]
    fn logout_room(this: &ZegoExpressEngine, room_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createStream)]
    fn create_stream(this: &ZegoExpressEngine, config: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = destroyStream)]
    fn destroy_stream(this: &ZegoExpressEngine, stream: &MediaStream) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = startPublishingStream)]
    fn start_publishing_stream(
        this: &ZegoExpressEngine,
        stream_id: &str,
        stream: &MediaStream,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = stopPublishingStream)]
    fn stop_publishing_stream(this: &ZegoExpressEngine, stream_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = startPlayingStream)]
    fn start_playing_stream(this: &ZegoExpressEngine, stream_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = stopPlayingStream)]
    fn stop_playing_stream(this: &ZegoExpressEngine, stream_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = destroyEngine)]
    fn destroy_engine(this: &ZegoExpressEngine) -> Result<(), JsValue>;
}

const STREAM_UPDATE: &str = "roomStreamUpdate";
const ROOM_STATE_UPDATE: &str = "roomStateUpdate";

fn js_engine_error(operation: &'static str, error: &JsValue) -> EngineError {
    let engine_error = EngineError::new(operation, error_message(error));
    match error_name(error) {
        Some(name) => engine_error.with_name(name),
        None => engine_error,
    }
}

/// `false` only when the SDK explicitly answered `false`
fn accepted(value: &JsValue) -> bool {
    value.as_bool() != Some(false)
}

fn set(target: &Object, key: &str, value: &JsValue) {
    // Reflect::set only fails on frozen objects; these are freshly built.
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

pub fn parse_update_kind(raw: &str) -> Option<StreamUpdateKind> {
    match raw {
        "ADD" => Some(StreamUpdateKind::Add),
        "DELETE" => Some(StreamUpdateKind::Delete),
        _ => None,
    }
}

pub fn parse_room_state(raw: &str) -> RoomConnectionState {
    match raw {
        "CONNECTED" => RoomConnectionState::Connected,
        "CONNECTING" => RoomConnectionState::Connecting,
        _ => RoomConnectionState::Disconnected,
    }
}

/// `[{ streamID, user: { userID, userName } }]`
pub fn parse_stream_list(list: &Array) -> Vec<RemoteStream> {
    list.iter()
        .filter_map(|entry| {
            let stream_id = get_string(&entry, "streamID")?;
            let user = get(&entry, "user").unwrap_or(JsValue::UNDEFINED);
            let user_id = get_string(&user, "userID").unwrap_or_default();
            let user_name = get_string(&user, "userName").unwrap_or_else(|| user_id.clone());
            Some(RemoteStream {
                stream_id: StreamId::new(stream_id),
                user: EngineUser { user_id, user_name },
            })
        })
        .collect()
}

/// Builds [`ZegoEngine`]s from the loaded SDK constructor
#[derive(Debug, Clone, Copy, Default)]
pub struct ZegoEngineFactory;

impl EngineFactory for ZegoEngineFactory {
    type Handle = ZegoSdk;
    type Engine = ZegoEngine;

    fn create(&self, sdk: &ZegoSdk, config: &EngineConfig) -> Result<ZegoEngine, EngineError> {
        let args = Array::of2(
            &JsValue::from(config.app_id),
            &JsValue::from_str(&config.server),
        );
        let instance = Reflect::construct(sdk.constructor(), &args)
            .map_err(|e| js_engine_error("new ZegoExpressEngine", &e))?;

        tracing::info!("🔧 Engine instance created (app {})", config.app_id);
        Ok(ZegoEngine {
            inner: instance.unchecked_into(),
        })
    }
}

/// [`LiveEngine`] over one `ZegoExpressEngine` instance
pub struct ZegoEngine {
    inner: ZegoExpressEngine,
}

impl ZegoEngine {
    fn listen<T>(&self, event: &'static str, closure: Closure<T>) -> Subscription
    where
        T: ?Sized + 'static,
        Closure<T>: AsRef<JsValue>,
    {
        let callback: Function = closure.as_ref().clone().unchecked_into();
        self.inner.on(event, &callback);

        let inner = self.inner.clone();
        Subscription::new(move || {
            inner.off(event, &callback);
            drop(closure);
        })
    }
}

#[async_trait(?Send)]
impl LiveEngine for ZegoEngine {
    type Media = MediaStream;

    fn on_stream_update(&self, handler: Box<dyn Fn(StreamUpdate)>) -> Subscription {
        let closure = Closure::<dyn Fn(String, String, Array)>::new(
            move |room_id: String, update_type: String, list: Array| {
                let Some(kind) = parse_update_kind(&update_type) else {
                    tracing::debug!("🤷 Ignoring stream update type {}", update_type);
                    return;
                };
                handler(StreamUpdate {
                    room_id,
                    kind,
                    streams: parse_stream_list(&list),
                });
            },
        );
        self.listen(STREAM_UPDATE, closure)
    }

    fn on_room_state_update(&self, handler: Box<dyn Fn(RoomStateUpdate)>) -> Subscription {
        let closure = Closure::<dyn Fn(String, String, f64, JsValue)>::new(
            move |room_id: String, state: String, error_code: f64, _extended: JsValue| {
                handler(RoomStateUpdate {
                    room_id,
                    state: parse_room_state(&state),
                    error_code: error_code as i32,
                });
            },
        );
        self.listen(ROOM_STATE_UPDATE, closure)
    }

    async fn login_room(
        &self,
        room_id: &str,
        token: &str,
        user: &EngineUser,
    ) -> Result<bool, EngineError> {
        let js_user = Object::new();
        set(&js_user, "userID", &JsValue::from_str(&user.user_id));
        set(&js_user, "userName", &JsValue::from_str(&user.user_name));
        let config = Object::new();
        set(&config, "userUpdate", &JsValue::TRUE);

        let pending = self
            .inner
            .login_room(room_id, token, &js_user, &config)
            .map_err(|e| js_engine_error("loginRoom", &e))?;
        let result = settle(pending)
            .await
            .map_err(|e| js_engine_error("loginRoom", &e))?;
        Ok(accepted(&result))
    }

    async fn logout_room(&self, room_id: &str) -> Result<bool, EngineError> {
        let pending = self
            .inner
            .logout_room(room_id)
            .map_err(|e| js_engine_error("logoutRoom", &e))?;
        let result = settle(pending)
            .await
            .map_err(|e| js_engine_error("logoutRoom", &e))?;
        Ok(accepted(&result))
    }

    async fn create_stream(&self, camera: CameraConfig) -> Result<MediaStream, EngineError> {
        let source = Object::new();
        set(&source, "audio", &JsValue::from_bool(camera.audio));
        set(&source, "video", &JsValue::from_bool(camera.video));
        let config = Object::new();
        set(&config, "camera", &source);

        let pending = self
            .inner
            .create_stream(&config)
            .map_err(|e| js_engine_error("createStream", &e))?;
        settle(pending)
            .await
            .map_err(|e| js_engine_error("createStream", &e))?
            .dyn_into::<MediaStream>()
            .map_err(|_| EngineError::new("createStream", "engine did not return a MediaStream"))
    }

    fn destroy_stream(&self, media: &MediaStream) -> Result<(), EngineError> {
        self.inner
            .destroy_stream(media)
            .map_err(|e| js_engine_error("destroyStream", &e))
    }

    async fn start_publishing_stream(
        &self,
        stream_id: &StreamId,
        media: &MediaStream,
    ) -> Result<bool, EngineError> {
        let pending = self
            .inner
            .start_publishing_stream(stream_id.as_str(), media)
            .map_err(|e| js_engine_error("startPublishingStream", &e))?;
        let result = settle(pending)
            .await
            .map_err(|e| js_engine_error("startPublishingStream", &e))?;
        Ok(accepted(&result))
    }

    async fn stop_publishing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError> {
        let pending = self
            .inner
            .stop_publishing_stream(stream_id.as_str())
            .map_err(|e| js_engine_error("stopPublishingStream", &e))?;
        let result = settle(pending)
            .await
            .map_err(|e| js_engine_error("stopPublishingStream", &e))?;
        Ok(accepted(&result))
    }

    async fn start_playing_stream(&self, stream_id: &StreamId) -> Result<MediaStream, EngineError> {
        let pending = self
            .inner
            .start_playing_stream(stream_id.as_str())
            .map_err(|e| js_engine_error("startPlayingStream", &e))?;
        settle(pending)
            .await
            .map_err(|e| js_engine_error("startPlayingStream", &e))?
            .dyn_into::<MediaStream>()
            .map_err(|_| {
                EngineError::new("startPlayingStream", "engine did not return a MediaStream")
            })
    }

    async fn stop_playing_stream(&self, stream_id: &StreamId) -> Result<bool, EngineError> {
        let pending = self
            .inner
            .stop_playing_stream(stream_id.as_str())
            .map_err(|e| js_engine_error("stopPlayingStream", &e))?;
        let result = settle(pending)
            .await
            .map_err(|e| js_engine_error("stopPlayingStream", &e))?;
        Ok(accepted(&result))
    }

    fn destroy(&self) -> Result<(), EngineError> {
        self.inner
            .destroy_engine()
            .map_err(|e| js_engine_error("destroyEngine", &e))
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_stream_list_parsing() {
        let user = Object::new();
        set(&user, "userID", &JsValue::from_str("p1"));
        set(&user, "userName", &JsValue::from_str("Alice"));
        let entry = Object::new();
        set(&entry, "streamID", &JsValue::from_str("42_p1_main"));
        set(&entry, "user", &user);
        let malformed = Object::new();

        let streams = parse_stream_list(&Array::of2(&entry, &malformed));

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].stream_id, StreamId::new("42_p1_main"));
        assert_eq!(streams[0].user.user_id, "p1");
        assert_eq!(streams[0].user.user_name, "Alice");
    }

    #[wasm_bindgen_test]
    fn test_explicit_false_is_rejection() {
        assert!(accepted(&JsValue::TRUE));
        assert!(accepted(&JsValue::UNDEFINED));
        assert!(!accepted(&JsValue::FALSE));
    }
}
