//! State machine trait for status enums.
//!
//! Gives status enums a single place to declare legal transitions so every
//! producer that mutates a status goes through the same rules.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for EmailStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Pending, Valid) | (Pending, Invalid) | ...)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> { ... }
/// }
///
/// let next = current.transition_to(EmailStatus::Invalid)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state has no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RunPhase {
        Selecting,
        Checking,
        Draining,
        Finished,
    }

    impl StateMachine for RunPhase {
        fn can_transition_to(&self, target: &Self) -> bool {
            use RunPhase::*;
            matches!(
                (self, target),
                (Selecting, Checking)
                    | (Selecting, Finished)
                    | (Checking, Draining)
                    | (Draining, Finished)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use RunPhase::*;
            match self {
                Selecting => vec![Checking, Finished],
                Checking => vec![Draining],
                Draining => vec![Finished],
                Finished => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let result = RunPhase::Selecting.transition_to(RunPhase::Checking);
        assert_eq!(result, Ok(RunPhase::Checking));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = RunPhase::Checking.transition_to(RunPhase::Selecting);
        assert!(result.is_err());
    }

    #[test]
    fn is_terminal_only_for_finished() {
        assert!(RunPhase::Finished.is_terminal());
        assert!(!RunPhase::Selecting.is_terminal());
        assert!(!RunPhase::Draining.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for phase in [
            RunPhase::Selecting,
            RunPhase::Checking,
            RunPhase::Draining,
            RunPhase::Finished,
        ] {
            for target in phase.valid_transitions() {
                assert!(
                    phase.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    phase,
                    target
                );
            }
        }
    }
}
