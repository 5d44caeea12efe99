use super::live_alert::{AlertAction, LiveAlert};
use super::query_states::LoadingState;
use crate::hooks::{
    use_display_name, use_live_session, use_sdk_loader, use_session_token, TokenState,
};
use streamy_live_core::application::{is_retryable, LiveConfig, SdkReadiness, SessionInputs};
use instant::Instant;
use streamy_live_core::domain::{Role, RoomId, SessionKey, SessionPhase};
use streamy_live_core::error::{LiveError, Remediation};
use streamy_live_core::infrastructure::{Clock, SystemClock};
use yew::prelude::*;

/// What the live view shows above its video surfaces
#[derive(Debug, Clone, PartialEq)]
pub enum LiveStatus {
    /// SDK or token still pending
    Loading,
    /// Engine work in progress
    Connecting(&'static str),
    Failed {
        error: LiveError,
        remediation: Remediation,
    },
    Live,
}

/// SDK failures win over token failures, which win over engine failures.
pub fn live_status<H>(
    sdk: &SdkReadiness<H>,
    sdk_retries_left: bool,
    token: &TokenState,
    phase: &SessionPhase,
) -> LiveStatus {
    if let SdkReadiness::Failed(e) = sdk {
        let remediation = if is_retryable(e) && sdk_retries_left {
            Remediation::RetrySdkLoad
        } else {
            Remediation::Reload
        };
        return LiveStatus::Failed {
            error: LiveError::from(e.clone()),
            remediation,
        };
    }

    if let TokenState::Failed(e) = token {
        let error = LiveError::from(e.clone());
        let remediation = error.remediation();
        return LiveStatus::Failed { error, remediation };
    }

    if sdk.is_loading() || token.is_loading() {
        return LiveStatus::Loading;
    }

    match phase {
        SessionPhase::Error(error) => LiveStatus::Failed {
            error: error.clone(),
            remediation: Remediation::Reload,
        },
        SessionPhase::Active => LiveStatus::Live,
        SessionPhase::Publishing => LiveStatus::Connecting("Starting your camera..."),
        SessionPhase::TearingDown => LiveStatus::Connecting("Leaving live room..."),
        SessionPhase::Idle | SessionPhase::Activating => {
            LiveStatus::Connecting("Joining live room...")
        }
    }
}

/// A token that expired while activation was still waiting on something
/// else must be replaced, the controller will never log in with it.
pub fn needs_token_refetch<H>(
    sdk: &SdkReadiness<H>,
    token: &TokenState,
    phase: &SessionPhase,
    now: Instant,
) -> bool {
    sdk.is_ready()
        && phase.is_idle()
        && token.token().is_some_and(|token| !token.is_fresh(now))
}

#[derive(Properties, PartialEq)]
pub struct LiveStreamProps {
    pub room_id: RoomId,
    #[prop_or_default]
    pub is_host: bool,
    #[prop_or_else(LiveConfig::from_env)]
    pub config: LiveConfig,
}

/// Live video for one room: publishes the camera for hosts, plays every
/// remote stream for everyone
#[function_component(LiveStream)]
pub fn live_stream(props: &LiveStreamProps) -> Html {
    let role = Role::from_is_host(props.is_host);
    let key = SessionKey::new(props.room_id, role);

    let sdk = use_sdk_loader(props.config.sdk.clone());
    let token = use_session_token(props.room_id, role, props.config.token_ttl());
    let display_name = use_display_name(props.config.default_display_name.clone());

    // hold activation until the profile name is known
    let inputs = SessionInputs {
        key,
        readiness: sdk.readiness.clone(),
        token: display_name
            .as_ref()
            .and_then(|_| token.state.token().cloned()),
        display_name: display_name.clone(),
    };
    let session = use_live_session(props.config.clone(), inputs);

    {
        let refetch = token.refetch.clone();
        let deps = (
            sdk.readiness.is_ready(),
            token.state.clone(),
            display_name.is_some(),
            session.phase.clone(),
        );
        let readiness = sdk.readiness.clone();
        use_effect_with(deps, move |(_, token, _, phase)| {
            if needs_token_refetch(&readiness, token, phase, SystemClock.now()) {
                tracing::info!("🔁 Session token expired before activation, fetching a new one");
                refetch.emit(());
            }
            || {}
        });
    }

    let status = live_status(
        &sdk.readiness,
        sdk.retries_used < sdk.max_retries,
        &token.state,
        &session.phase,
    );
    let live = status == LiveStatus::Live;

    let banner = match status {
        LiveStatus::Loading => html! {
            <div class="streamy-live__skeleton" aria-busy="true">
                <div class="streamy-skeleton streamy-skeleton--bar" />
                <div class="streamy-skeleton streamy-skeleton--video" />
                <div class="streamy-skeleton streamy-skeleton--controls" />
            </div>
        },
        LiveStatus::Connecting(message) => html! {
            <LoadingState message={message} />
        },
        LiveStatus::Failed { error, remediation } => {
            let action = match remediation {
                Remediation::RetrySdkLoad => AlertAction::Retry(sdk.retry.clone()),
                Remediation::RetryToken => AlertAction::Retry(token.refetch.clone()),
                Remediation::Reload => AlertAction::Reload,
                Remediation::ContactAdministrator => AlertAction::None,
            };
            html! { <LiveAlert {error} {action} /> }
        }
        LiveStatus::Live => html! {},
    };

    html! {
        <div class="streamy-live">
            {banner}
            <div class={classes!("streamy-live__stage", (!live).then_some("streamy-live__stage--hidden"))}>
                if props.is_host {
                    <video
                        ref={session.local_video.clone()}
                        class="streamy-live__video streamy-live__video--local"
                    />
                }
                <div ref={session.remote_videos.clone()} class="streamy-live__remote" />
            </div>
        </div>
    }
}
