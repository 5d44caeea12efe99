mod actor_provider;

pub use actor_provider::{use_actor, ActorContext, ActorProvider, ActorProviderProps};
