//! Small helpers for talking to untyped JS objects.

use js_sys::{Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Await `value` if it is a promise, otherwise pass it through.
pub async fn settle(value: JsValue) -> Result<JsValue, JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

pub fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

pub fn get_string(target: &JsValue, key: &str) -> Option<String> {
    get(target, key).and_then(|v| v.as_string())
}

/// `error.name` (e.g. `NotAllowedError`) of a thrown value
pub fn error_name(error: &JsValue) -> Option<String> {
    get_string(error, "name")
}

/// Human readable text of a thrown value
pub fn error_message(error: &JsValue) -> String {
    get_string(error, "message")
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{:?}", error))
}
