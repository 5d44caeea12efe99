use super::js::{error_message, get, get_string, settle};
use async_trait::async_trait;
use js_sys::{Array, BigInt, Function, Reflect};
use streamy_live_core::infrastructure::{ActorError, StreamyActor, UserProfile};
use wasm_bindgen::{JsCast, JsValue};

/// Backend actor reached through its generated JS client
#[derive(Debug, Clone, PartialEq)]
pub struct JsActor {
    actor: JsValue,
}

impl JsActor {
    pub fn new(actor: JsValue) -> Self {
        Self { actor }
    }

    /// Actor client exposed on `window` under `global`, if any
    pub fn from_window(global: &str) -> Option<Self> {
        let window = web_sys::window()?;
        let actor = Reflect::get(&window, &JsValue::from_str(global)).ok()?;
        if actor.is_object() {
            Some(Self::new(actor))
        } else {
            None
        }
    }

    async fn call(&self, method: &str, args: &Array) -> Result<JsValue, ActorError> {
        let function = get(&self.actor, method)
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ActorError(format!("Actor method {} not available", method)))?;

        let pending = function
            .apply(&self.actor, args)
            .map_err(|e| ActorError(error_message(&e)))?;
        settle(pending)
            .await
            .map_err(|e| ActorError(error_message(&e)))
    }

    async fn token(&self, method: &str, room_id: u64, user_id: &str) -> Result<String, ActorError> {
        let args = Array::of2(&BigInt::from(room_id).into(), &JsValue::from_str(user_id));
        self.call(method, &args)
            .await?
            .as_string()
            .ok_or_else(|| ActorError(format!("{} returned a non-string token", method)))
    }
}

/// `UserProfile | null` as returned by the JS client
pub fn parse_profile(value: &JsValue) -> Option<UserProfile> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    Some(UserProfile {
        display_name: get_string(value, "displayName").unwrap_or_default(),
        avatar_url: get_string(value, "avatarUrl"),
    })
}

#[async_trait(?Send)]
impl StreamyActor for JsActor {
    async fn generate_host_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        self.token("generateHostToken", room_id, user_id).await
    }

    async fn generate_audience_token(
        &self,
        room_id: u64,
        user_id: &str,
    ) -> Result<String, ActorError> {
        self.token("generateAudienceToken", room_id, user_id).await
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError> {
        let profile = self.call("getCallerUserProfile", &Array::new()).await?;
        Ok(parse_profile(&profile))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use js_sys::Object;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_profile_parsing() {
        assert_eq!(parse_profile(&JsValue::NULL), None);

        let profile = Object::new();
        Reflect::set(&profile, &"displayName".into(), &"Alice".into()).unwrap();

        let parsed = parse_profile(&profile).unwrap();
        assert_eq!(parsed.display_name, "Alice");
        assert_eq!(parsed.avatar_url, None);
    }

    #[wasm_bindgen_test]
    async fn test_missing_method_is_an_actor_error() {
        let actor = JsActor::new(Object::new().into());

        let err = actor.generate_audience_token(7, "guest_1").await.unwrap_err();

        assert!(err.0.contains("generateAudienceToken"));
    }
}
