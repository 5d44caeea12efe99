use js_sys::{Function, Reflect};
use streamy_live_core::infrastructure::SdkProvider;
use wasm_bindgen::{JsCast, JsValue};

/// Name of the global the CDN script installs
pub const ZEGO_GLOBAL: &str = "ZegoExpressEngine";

/// Loaded engine SDK: the `ZegoExpressEngine` constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ZegoSdk {
    constructor: Function,
}

impl ZegoSdk {
    /// Accepts only callable values
    pub fn from_global(value: JsValue) -> Option<Self> {
        value
            .dyn_into::<Function>()
            .ok()
            .map(|constructor| Self { constructor })
    }

    pub fn constructor(&self) -> &Function {
        &self.constructor
    }
}

/// Looks the SDK up on `window`
#[derive(Debug, Clone)]
pub struct WindowSdk {
    global: &'static str,
}

impl WindowSdk {
    pub fn new(global: &'static str) -> Self {
        Self { global }
    }
}

impl Default for WindowSdk {
    fn default() -> Self {
        Self::new(ZEGO_GLOBAL)
    }
}

impl SdkProvider for WindowSdk {
    type Handle = ZegoSdk;

    fn try_get(&self) -> Option<ZegoSdk> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(self.global)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        ZegoSdk::from_global(value)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_only_functions_are_sdks() {
        assert!(ZegoSdk::from_global(JsValue::from_str("nope")).is_none());
        assert!(ZegoSdk::from_global(JsValue::UNDEFINED).is_none());

        let ctor = Function::new_no_args("");
        assert!(ZegoSdk::from_global(ctor.into()).is_some());
    }

    #[wasm_bindgen_test]
    fn test_missing_global_is_not_ready() {
        assert!(WindowSdk::new("__streamyMissingSdk").try_get().is_none());
    }
}
