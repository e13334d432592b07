//! Swap lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Banner shown while a swap sits in the success state.
pub const MSG_SWAP_SUCCEEDED: &str = "Swap completed successfully!";

/// Lifecycle state of a swap submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapState {
    /// Ready for a submit.
    #[default]
    Idle,
    /// Execution in flight; submit is disabled.
    Submitting,
    /// Execution succeeded; returns to Idle after the reset delay.
    Succeeded,
    /// Last attempt failed with a user-facing reason.
    Failed(String),
}

impl SwapState {
    /// Check if an execution is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, SwapState::Submitting)
    }

    /// Check if a new submit may start from this state.
    pub fn accepts_submit(&self) -> bool {
        !self.is_submitting()
    }

    /// Failure reason, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            SwapState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Status banner for this state.
    pub fn banner(&self) -> Option<&str> {
        match self {
            SwapState::Succeeded => Some(MSG_SWAP_SUCCEEDED),
            SwapState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check if transition to given state is valid.
    ///
    /// `Failed -> Failed` covers a validation rejection replacing an earlier error.
    pub fn can_transition_to(&self, next: &SwapState) -> bool {
        use SwapState::*;

        matches!(
            (self, next),
            (Idle, Submitting)
                | (Idle, Failed(_))
                | (Submitting, Succeeded)
                | (Submitting, Failed(_))
                | (Succeeded, Idle)
                | (Succeeded, Submitting)
                | (Succeeded, Failed(_))
                | (Failed(_), Submitting)
                | (Failed(_), Failed(_))
        )
    }
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapState::Idle => write!(f, "IDLE"),
            SwapState::Submitting => write!(f, "SUBMITTING"),
            SwapState::Succeeded => write!(f, "SUCCEEDED"),
            SwapState::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}
