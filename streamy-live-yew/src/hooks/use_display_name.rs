use crate::providers::use_actor;
use streamy_live_core::application::resolve_display_name;
use yew::prelude::*;

/// Caller's profile name once resolved, falling back to `fallback`
#[hook]
pub fn use_display_name(fallback: String) -> Option<String> {
    let actor = use_actor();
    let name = use_state(|| None::<String>);

    {
        let name = name.setter();
        use_effect_with(actor, move |actor| {
            match actor.actor.clone() {
                Some(actor) => wasm_bindgen_futures::spawn_local(async move {
                    name.set(Some(resolve_display_name(&*actor, &fallback).await));
                }),
                None => name.set(Some(fallback)),
            }
            || {}
        });
    }

    (*name).clone()
}
