use super::js::{error_message, error_name};
use js_sys::{Object, Reflect};
use streamy_live_core::error::{MediaError, MediaErrorReason};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamConstraints, MediaStreamTrack, PermissionState, PermissionStatus};

fn media_error(error: &JsValue) -> MediaError {
    let reason = error_name(error)
        .map(|name| MediaErrorReason::from_dom_name(&name))
        .unwrap_or(MediaErrorReason::Other);
    MediaError::new(reason, error_message(error))
}

/// Ask for camera and microphone access, then release the devices again.
pub async fn request_camera_and_mic_permissions() -> Result<(), MediaError> {
    let unavailable = || MediaError::new(MediaErrorReason::NoDevice, "mediaDevices unavailable");
    let window = web_sys::window().ok_or_else(unavailable)?;
    let devices = window.navigator().media_devices().map_err(|_| unavailable())?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    constraints.set_video(&JsValue::TRUE);

    let pending = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| media_error(&e))?;
    let stream = JsFuture::from(pending)
        .await
        .map_err(|e| {
            let error = media_error(&e);
            tracing::error!("❌ Media permission error: {:?} ({})", error.reason, error.detail);
            error
        })?
        .dyn_into::<MediaStream>()
        .map_err(|_| MediaError::new(MediaErrorReason::Other, "getUserMedia returned no stream"))?;

    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
    tracing::info!("✅ Camera and microphone access granted");
    Ok(())
}

async fn is_granted(permissions: &web_sys::Permissions, name: &str) -> bool {
    let descriptor = Object::new();
    if Reflect::set(&descriptor, &"name".into(), &JsValue::from_str(name)).is_err() {
        return false;
    }
    let Ok(pending) = permissions.query(&descriptor) else {
        return false;
    };
    match JsFuture::from(pending).await {
        Ok(status) => status
            .dyn_into::<PermissionStatus>()
            .map(|s| s.state() == PermissionState::Granted)
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Whether camera and microphone are both already granted.
///
/// Browsers without the Permissions API (or without these permission names)
/// report `false`.
pub async fn check_media_permissions() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(permissions) = window.navigator().permissions() else {
        return false;
    };
    is_granted(&permissions, "camera").await && is_granted(&permissions, "microphone").await
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_dom_errors_are_classified() {
        let err = js_sys::Error::new("Permission denied");
        err.set_name("NotAllowedError");
        assert_eq!(media_error(&err).reason, MediaErrorReason::PermissionDenied);

        let err = js_sys::Error::new("busy");
        err.set_name("NotReadableError");
        assert_eq!(media_error(&err).reason, MediaErrorReason::DeviceInUse);

        assert_eq!(
            media_error(&JsValue::from_str("weird")).reason,
            MediaErrorReason::Other
        );
    }
}
