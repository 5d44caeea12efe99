use crate::components::{EmptyState, ErrorState, LiveStream};
use crate::infrastructure::JsActor;
use crate::providers::{ActorContext, ActorProvider};
use std::rc::Rc;
use streamy_live_core::application::LiveConfig;
use streamy_live_core::domain::{InvalidRoomId, RoomId};
use yew::prelude::*;

/// Global the page installs the backend client under
const ACTOR_GLOBAL: &str = "streamyActor";
/// Global holding the signed-in principal, if any
const PRINCIPAL_GLOBAL: &str = "streamyPrincipal";

#[derive(Debug, Clone, PartialEq)]
enum RoomTarget {
    Missing,
    Invalid(InvalidRoomId),
    Room { room_id: RoomId, is_host: bool },
}

fn room_target(room: Option<String>, host: Option<String>) -> RoomTarget {
    let Some(room) = room else {
        return RoomTarget::Missing;
    };
    match room.parse::<RoomId>() {
        Ok(room_id) => RoomTarget::Room {
            room_id,
            is_host: matches!(host.as_deref(), Some("true") | Some("1")),
        },
        Err(e) => RoomTarget::Invalid(e),
    }
}

/// Read `room` and `host` from the URL query
fn get_room_target_from_url() -> RoomTarget {
    let params = web_sys::window()
        .and_then(|window| window.location().href().ok())
        .and_then(|href| web_sys::Url::new(&href).ok())
        .map(|url| url.search_params());

    match params {
        Some(params) => room_target(params.get("room"), params.get("host")),
        None => RoomTarget::Missing,
    }
}

fn actor_context_from_window() -> ActorContext {
    let principal = web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &PRINCIPAL_GLOBAL.into()).ok())
        .and_then(|p| p.as_string())
        .filter(|p| !p.is_empty());

    match JsActor::from_window(ACTOR_GLOBAL) {
        Some(actor) => ActorContext::new(Rc::new(actor), principal),
        None => {
            tracing::warn!("⚠️  No backend actor found on window.{}", ACTOR_GLOBAL);
            ActorContext {
                actor: None,
                principal,
            }
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let target = use_state(get_room_target_from_url);
    let actor = use_state(actor_context_from_window);
    let config = use_memo((), |_| LiveConfig::from_env());

    html! {
        <div class="app">
            {match &*target {
                RoomTarget::Missing => html! {
                    <EmptyState message="Open a room with ?room=<id> to start watching." />
                },
                RoomTarget::Invalid(e) => html! {
                    <ErrorState message={e.to_string()} />
                },
                RoomTarget::Room { room_id, is_host } => html! {
                    <ActorProvider context={(*actor).clone()}>
                        <LiveStream
                            room_id={*room_id}
                            is_host={*is_host}
                            config={(*config).clone()}
                        />
                    </ActorProvider>
                },
            }}
        </div>
    }
}
