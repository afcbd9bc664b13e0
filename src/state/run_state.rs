/// Run state definitions for tracking a harvest's lifecycle
///
/// A run moves from `NotStarted` to `Running` and ends in exactly one of the
/// two terminal states.
use std::fmt;

/// Represents the current state of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// The controller has been built but `run` has not been called
    #[default]
    NotStarted,

    /// Identifiers are being dispatched
    Running,

    /// Every identifier in the range was attempted without a cancellation
    Completed,

    /// An external cancellation fired during the run, even if every
    /// identifier had already been dispatched
    Interrupted,
}

impl RunState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }

    /// Returns true if the transition from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Interrupted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(RunState::NotStarted.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Completed));
        assert!(RunState::Running.can_transition_to(RunState::Interrupted));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!RunState::NotStarted.can_transition_to(RunState::Completed));
        assert!(!RunState::Completed.can_transition_to(RunState::Running));
        assert!(!RunState::Interrupted.can_transition_to(RunState::Completed));
        assert!(!RunState::Running.can_transition_to(RunState::Running));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Interrupted.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Interrupted.to_string(), "interrupted");
        assert_eq!(RunState::default(), RunState::NotStarted);
    }
}
