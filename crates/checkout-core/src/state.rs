//! # Session State Machine
//!
//! ```text
//! Idle -> Decoding -> ResourceLoading -> SdkInitializing -> AwaitingUserInput
//!            |              |                  |                  |
//!            +--------------+------------------+---> Failed       +--> Succeeded | Cancelled | Failed
//! ```
//!
//! Terminal states only leave through a reset, which is not a transition of
//! this machine but a teardown back to `Idle`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier attached to one `initialize_checkout` call for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh session identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0.simple())
    }
}

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session; nothing held
    #[default]
    Idle,
    /// Reading the token payload
    Decoding,
    /// Waiting for the SDK resource to become ready
    ResourceLoading,
    /// Waiting for the SDK entry point and trigger
    SdkInitializing,
    /// The entry surface is shown; waiting for the user
    AwaitingUserInput,
    /// Terminal: the SDK produced a transient token
    Succeeded,
    /// Terminal: the user closed the checkout
    Cancelled,
    /// Terminal: the session failed
    Failed,
}

impl SessionState {
    /// Whether this state ends a session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Cancelled | SessionState::Failed
        )
    }

    /// Whether a session is between `Idle` and a terminal state
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal() && *self != SessionState::Idle
    }

    /// Whether the machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Decoding)
                | (Decoding, ResourceLoading)
                | (Decoding, Failed)
                | (ResourceLoading, SdkInitializing)
                | (ResourceLoading, Failed)
                | (SdkInitializing, AwaitingUserInput)
                | (SdkInitializing, Failed)
                | (AwaitingUserInput, Succeeded)
                | (AwaitingUserInput, Cancelled)
                | (AwaitingUserInput, Failed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Decoding => "Decoding",
            SessionState::ResourceLoading => "ResourceLoading",
            SessionState::SdkInitializing => "SdkInitializing",
            SessionState::AwaitingUserInput => "AwaitingUserInput",
            SessionState::Succeeded => "Succeeded",
            SessionState::Cancelled => "Cancelled",
            SessionState::Failed => "Failed",
        };
        f.write_str(name)
    }
}
