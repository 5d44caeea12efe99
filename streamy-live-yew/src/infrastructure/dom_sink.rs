use super::js::error_message;
use std::cell::RefCell;
use std::collections::BTreeMap;
use streamy_live_core::domain::StreamId;
use streamy_live_core::infrastructure::MediaSink;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, HtmlVideoElement, MediaStream};
use yew::NodeRef;

/// Renders media into `<video>` elements owned by a component
///
/// The local preview goes into a fixed element; every remote stream gets its
/// own element appended to the remote container.
pub struct VideoSink {
    local: NodeRef,
    remote_container: NodeRef,
    remote: RefCell<BTreeMap<StreamId, HtmlVideoElement>>,
}

impl VideoSink {
    pub fn new(local: NodeRef, remote_container: NodeRef) -> Self {
        Self {
            local,
            remote_container,
            remote: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn remote_count(&self) -> usize {
        self.remote.borrow().len()
    }

    fn remote_element(&self, stream_id: &StreamId) -> Option<HtmlVideoElement> {
        let container = self.remote_container.cast::<Element>()?;
        let document = web_sys::window()?.document()?;
        let video = document
            .create_element("video")
            .ok()?
            .dyn_into::<HtmlVideoElement>()
            .ok()?;
        video.set_autoplay(true);
        video.set_class_name("streamy-live__video streamy-live__video--remote");
        let _ = video.set_attribute("playsinline", "");
        let _ = video.set_attribute("data-stream-id", stream_id.as_str());
        container.append_child(&video).ok()?;
        Some(video)
    }
}

fn play(video: &HtmlVideoElement, media: Option<&MediaStream>) {
    video.set_src_object(media);
    if media.is_none() {
        return;
    }

    // autoplay policies may reject; the element keeps its source either way
    match video.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                tracing::debug!("🔇 Playback not started: {}", error_message(&e));
            }
        }),
        Err(e) => tracing::debug!("🔇 Playback not started: {}", error_message(&e)),
    }
}

impl MediaSink for VideoSink {
    type Media = MediaStream;

    fn attach_local(&self, media: &MediaStream) {
        match self.local.cast::<HtmlVideoElement>() {
            Some(video) => {
                video.set_muted(true);
                play(&video, Some(media));
            }
            None => tracing::warn!("⚠️  Local video element not mounted"),
        }
    }

    fn detach_local(&self) {
        if let Some(video) = self.local.cast::<HtmlVideoElement>() {
            play(&video, None);
        }
    }

    fn attach_remote(&self, stream_id: &StreamId, media: &MediaStream) {
        let existing = self.remote.borrow().get(stream_id).cloned();
        let video = match existing {
            Some(video) => Some(video),
            None => self.remote_element(stream_id),
        };

        match video {
            Some(video) => {
                play(&video, Some(media));
                self.remote.borrow_mut().insert(stream_id.clone(), video);
            }
            None => tracing::warn!("⚠️  No surface for remote stream {}", stream_id),
        }
    }

    fn detach_remote(&self, stream_id: &StreamId) {
        if let Some(video) = self.remote.borrow_mut().remove(stream_id) {
            play(&video, None);
            video.remove();
        }
    }

    fn clear(&self) {
        self.detach_local();
        let remote = std::mem::take(&mut *self.remote.borrow_mut());
        for video in remote.into_values() {
            play(&video, None);
            video.remove();
        }
        if let Some(container) = self.remote_container.cast::<Element>() {
            container.set_inner_html("");
        }
    }
}
