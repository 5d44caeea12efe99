use crate::infrastructure::{VideoSink, ZegoEngineFactory, ZegoSdk};
use futures::StreamExt;
use std::rc::Rc;
use streamy_live_core::application::{LiveConfig, SessionController, SessionInputs};
use streamy_live_core::domain::{SessionKey, SessionPhase};
use yew::prelude::*;

/// Phase of the live session plus the surfaces it renders into
#[derive(Clone, PartialEq)]
pub struct LiveSessionHandle {
    pub phase: SessionPhase,
    /// `<video>` for the local preview (hosts only)
    pub local_video: NodeRef,
    /// Container remote `<video>` elements are appended to
    pub remote_videos: NodeRef,
}

struct DriverState<H> {
    /// Latest inputs not yet handed to the controller
    pending: Option<SessionInputs<H>>,
    mounted: bool,
}

impl<H> Default for DriverState<H> {
    fn default() -> Self {
        Self {
            pending: None,
            mounted: false,
        }
    }
}

impl<H> DriverState<H> {
    /// Replace whatever the next tick would have applied
    fn queue(&mut self, inputs: SessionInputs<H>) {
        self.pending = Some(inputs);
    }

    fn take_pending(&mut self) -> Option<SessionInputs<H>> {
        self.pending.take()
    }
}

/// In-flight work for `current` must stop before `next` is applied
fn supersedes(current: Option<SessionKey>, next: &SessionKey) -> bool {
    current.is_some_and(|key| key != *next)
}

/// Drive one [`SessionController`] for the lifetime of the component.
///
/// Input changes are coalesced and applied on the next tick; engine events
/// are pumped every tick. Unmounting invalidates whatever is in flight and
/// tears the session down.
#[hook]
pub fn use_live_session(config: LiveConfig, inputs: SessionInputs<ZegoSdk>) -> LiveSessionHandle {
    let phase = use_state(|| SessionPhase::Idle);
    let local_video = use_node_ref();
    let remote_videos = use_node_ref();
    let driver = use_mut_ref(DriverState::<ZegoSdk>::default);

    let controller = {
        let setter = phase.setter();
        let sink = (local_video.clone(), remote_videos.clone());
        use_memo((), move |_| {
            let sink = Rc::new(VideoSink::new(sink.0, sink.1));
            SessionController::new(ZegoEngineFactory, sink, config)
                .with_observer(move |p| setter.set(p.clone()))
        })
    };

    {
        let controller = controller.clone();
        let driver = driver.clone();
        use_effect_with(inputs, move |inputs| {
            if supersedes(controller.key(), &inputs.key) {
                // stop an in-flight login for the old target right away
                controller.invalidate();
            }
            driver.borrow_mut().queue(inputs.clone());
            || {}
        });
    }

    {
        let controller = controller.clone();
        let driver = driver.clone();
        use_effect_with((), move |_| {
            driver.borrow_mut().mounted = true;

            let running = controller.clone();
            let state = driver.clone();
            wasm_bindgen_futures::spawn_local(async move {
                tracing::info!("▶️  Live session driver started");
                let mut interval = gloo_timers::future::IntervalStream::new(100);

                while interval.next().await.is_some() {
                    if !state.borrow().mounted {
                        break;
                    }

                    // 1. Apply the latest inputs
                    let pending = state.borrow_mut().take_pending();
                    if let Some(inputs) = pending {
                        if let Err(e) = running.sync(inputs).await {
                            tracing::error!("❌ Live session failed: {}", e);
                        }
                    }

                    // 2. Engine notifications
                    running.pump_events().await;
                }
                tracing::info!("⏹️  Live session driver stopped");
            });

            move || {
                driver.borrow_mut().mounted = false;
                controller.invalidate();
                wasm_bindgen_futures::spawn_local(async move {
                    controller.teardown().await;
                });
            }
        });
    }

    LiveSessionHandle {
        phase: (*phase).clone(),
        local_video,
        remote_videos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamy_live_core::application::SdkReadiness;
    use streamy_live_core::domain::RoomId;

    fn inputs(key: SessionKey) -> SessionInputs<()> {
        SessionInputs {
            key,
            readiness: SdkReadiness::Loading,
            token: None,
            display_name: None,
        }
    }

    #[test]
    fn test_only_a_different_target_supersedes() {
        let host = SessionKey::host(RoomId::new(42));

        assert!(!supersedes(None, &host));
        assert!(!supersedes(Some(host), &host));
        assert!(supersedes(Some(host), &SessionKey::host(RoomId::new(43))));
        assert!(supersedes(Some(host), &SessionKey::audience(RoomId::new(42))));
    }

    #[test]
    fn test_latest_inputs_win_until_taken() {
        let mut driver = DriverState::<()>::default();
        let first = SessionKey::audience(RoomId::new(7));
        let second = SessionKey::audience(RoomId::new(8));

        driver.queue(inputs(first));
        driver.queue(inputs(second));

        assert_eq!(driver.take_pending().map(|i| i.key), Some(second));
        assert!(driver.take_pending().is_none());
        assert!(!driver.mounted);
    }
}
