use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Session-scoped pseudo identity of an unauthenticated viewer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestIdentity {
    pub guest_id: String,
}

impl GuestIdentity {
    /// `guest_{unix_millis}_{random base36}`
    pub fn generate() -> Self {
        Self::generate_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn generate_at(unix_millis: i64) -> Self {
        Self {
            guest_id: format!("guest_{}_{}", unix_millis, random_suffix()),
        }
    }

    pub fn is_guest_id(id: &str) -> bool {
        id.starts_with("guest_")
    }
}

fn random_suffix() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_id_format() {
        let guest = GuestIdentity::generate_at(1_700_000_000_000);
        let parts: Vec<&str> = guest.guest_id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "guest");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(GuestIdentity::is_guest_id(&guest.guest_id));
    }

    #[test]
    fn test_guest_ids_differ() {
        let a = GuestIdentity::generate();
        let b = GuestIdentity::generate();
        assert_ne!(a, b);
    }
}
