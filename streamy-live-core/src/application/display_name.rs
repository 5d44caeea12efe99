use crate::infrastructure::StreamyActor;

/// Name announced to the engine on login.
///
/// Uses the caller's profile name, falling back to `fallback` when there is no
/// profile, the name is blank, or the lookup fails.
pub async fn resolve_display_name<A: StreamyActor + ?Sized>(actor: &A, fallback: &str) -> String {
    match actor.get_caller_user_profile().await {
        Ok(Some(profile)) if !profile.display_name.trim().is_empty() => profile.display_name,
        Ok(_) => fallback.to_string(),
        Err(e) => {
            tracing::warn!("⚠️  Profile lookup failed, using placeholder name: {}", e);
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockActor;

    #[tokio::test]
    async fn test_profile_name_wins() {
        let actor = MockActor::new().with_display_name("Alice");
        assert_eq!(resolve_display_name(&actor, "Guest").await, "Alice");
    }

    #[tokio::test]
    async fn test_fallbacks() {
        assert_eq!(resolve_display_name(&MockActor::new(), "Guest").await, "Guest");

        let blank = MockActor::new().with_display_name("  ");
        assert_eq!(resolve_display_name(&blank, "Guest").await, "Guest");

        let failing = MockActor::new();
        failing.fail_profile();
        assert_eq!(resolve_display_name(&failing, "Guest").await, "Guest");
    }
}
