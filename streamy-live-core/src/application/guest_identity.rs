use crate::domain::{GuestIdentity, Subject};
use crate::infrastructure::SessionStore;

/// Session storage key holding the guest id
pub const GUEST_USER_ID_KEY: &str = "streamy_guest_user_id";

/// Stable pseudo identity for unauthenticated viewers
///
/// Lives as long as the backing store does (one browser tab session).
pub struct GuestIdentityStore<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> GuestIdentityStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get_or_create_guest_id(&self) -> String {
        if let Some(existing) = self.store.get(GUEST_USER_ID_KEY) {
            if !existing.is_empty() {
                return existing;
            }
        }

        let guest = GuestIdentity::generate();
        tracing::info!("👤 Created guest identity {}", guest.guest_id);
        self.store.set(GUEST_USER_ID_KEY, &guest.guest_id);
        guest.guest_id
    }

    pub fn clear_guest_id(&self) {
        tracing::debug!("🧹 Clearing guest identity");
        self.store.remove(GUEST_USER_ID_KEY);
    }

    /// The principal when signed in, otherwise the guest id.
    ///
    /// No guest id is created for an authenticated user.
    pub fn subject_for(&self, principal: Option<&str>) -> Subject {
        match principal {
            Some(principal) => Subject::Authenticated(principal.to_string()),
            None => Subject::Guest(self.get_or_create_guest_id()),
        }
    }
}
