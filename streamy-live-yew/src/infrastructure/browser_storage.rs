use gloo::storage::{SessionStorage, Storage};
use streamy_live_core::infrastructure::SessionStore;

/// `window.sessionStorage`, values stored as plain strings
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStore;

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        SessionStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = SessionStorage::raw().set_item(key, value) {
            tracing::warn!("⚠️  Could not persist {} in session storage: {:?}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        SessionStorage::delete(key);
    }
}
