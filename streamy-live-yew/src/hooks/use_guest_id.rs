use crate::infrastructure::BrowserSessionStore;
use streamy_live_core::application::GuestIdentityStore;
use streamy_live_core::domain::Subject;
use yew::prelude::*;

/// Identity tokens are requested for: the principal, else the tab's guest id
#[hook]
pub fn use_subject(principal: Option<String>) -> Subject {
    let subject = use_memo(principal, |principal| {
        GuestIdentityStore::new(BrowserSessionStore).subject_for(principal.as_deref())
    });
    (*subject).clone()
}

/// Forget the guest id, e.g. after signing in
pub fn clear_guest_id() {
    GuestIdentityStore::new(BrowserSessionStore).clear_guest_id();
}
