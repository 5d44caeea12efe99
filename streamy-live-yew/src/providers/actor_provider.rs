use std::rc::Rc;
use streamy_live_core::infrastructure::StreamyActor;
use yew::prelude::*;

/// Backend actor and the signed-in principal, shared with the live hooks
#[derive(Clone, Default)]
pub struct ActorContext {
    /// `None` while the client is still being created
    pub actor: Option<Rc<dyn StreamyActor>>,

    /// Principal of the signed-in user, `None` for anonymous viewers
    pub principal: Option<String>,
}

impl ActorContext {
    pub fn new(actor: Rc<dyn StreamyActor>, principal: Option<String>) -> Self {
        Self {
            actor: Some(actor),
            principal,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

impl PartialEq for ActorContext {
    fn eq(&self, other: &Self) -> bool {
        let same_actor = match (&self.actor, &other.actor) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_actor && self.principal == other.principal
    }
}

#[derive(Properties, PartialEq)]
pub struct ActorProviderProps {
    pub context: ActorContext,
    pub children: Children,
}

#[function_component(ActorProvider)]
pub fn actor_provider(props: &ActorProviderProps) -> Html {
    html! {
        <ContextProvider<ActorContext> context={props.context.clone()}>
            {props.children.clone()}
        </ContextProvider<ActorContext>>
    }
}

/// Actor context, or an empty one outside an [`ActorProvider`]
#[hook]
pub fn use_actor() -> ActorContext {
    use_context::<ActorContext>().unwrap_or_default()
}
