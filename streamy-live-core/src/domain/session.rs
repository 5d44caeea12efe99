use crate::error::LiveError;
use std::fmt;

/// Identifies one activation attempt
///
/// A continuation that captured an older epoch must not touch controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of the session controller
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Activating,
    /// Host only: acquiring and publishing local media
    Publishing,
    Active,
    TearingDown,
    Error(LiveError),
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionPhase::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Active)
    }

    /// Activating or Publishing
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Activating | SessionPhase::Publishing)
    }

    pub fn error(&self) -> Option<&LiveError> {
        match self {
            SessionPhase::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Activating => "activating",
            SessionPhase::Publishing => "publishing",
            SessionPhase::Active => "active",
            SessionPhase::TearingDown => "tearing-down",
            SessionPhase::Error(_) => "error",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_monotonic() {
        let e = Epoch::default();
        assert!(e.next() > e);
        assert_eq!(e.next().next().value(), 2);
    }

    #[test]
    fn test_phase_helpers() {
        assert!(SessionPhase::default().is_idle());
        assert!(SessionPhase::Publishing.is_busy());
        assert!(!SessionPhase::Active.is_busy());
        assert_eq!(SessionPhase::TearingDown.to_string(), "tearing-down");
    }
}
