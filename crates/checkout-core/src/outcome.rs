//! Terminal outcomes of a checkout session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transient payment token produced by the SDK on success
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransientToken(String);

impl TransientToken {
    /// Wrap a raw transient token
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TransientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransientToken(<{} bytes>)", self.0.len())
    }
}

/// Body of a cross-context message as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessagePayload {
    /// String body (possibly JSON framed)
    Text(String),
    /// Structured (object-like) body
    Structured(serde_json::Value),
    /// Body the host could not represent
    Opaque,
}

/// Rejection of the SDK's completion promise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkRejection {
    /// Vendor reason code, when the rejection carries one
    pub reason: Option<String>,
    /// Human-readable rejection message
    pub message: String,
}

impl SdkRejection {
    /// Rejection carrying a reason code
    pub fn with_reason(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            message: message.into(),
        }
    }

    /// Rejection without a reason code
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            reason: None,
            message: message.into(),
        }
    }
}

/// Evidence that the user closed the checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum CancellationSignal {
    /// The completion promise rejected with a recognized reason code
    ViaRejection {
        /// The recognized reason code
        reason_code: String,
    },
    /// A recognized close message arrived on the side channel
    ViaMessage {
        /// The message exactly as delivered
        raw: MessagePayload,
    },
}

/// Stage at which a session failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Token decoding
    Decode,
    /// Resource loading
    Load,
    /// SDK entry point or sub-instance bring-up
    Initialize,
    /// Trigger creation, side-channel arming or display
    Render,
    /// The completion promise rejected with an unrecognized reason
    Payment,
}

/// Discriminant of a `CheckoutOutcome`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The user completed entry
    Succeeded,
    /// The user closed the checkout
    Cancelled,
    /// The session failed
    Failed,
}

/// Single discriminated result surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// The SDK produced a transient token
    Succeeded {
        /// Transient payment token
        token: TransientToken,
    },
    /// The user cancelled
    Cancelled {
        /// First signal that arrived
        signal: CancellationSignal,
    },
    /// The session failed
    Failed {
        /// Stage that failed
        stage: FailureStage,
        /// Error message
        message: String,
    },
}

impl CheckoutOutcome {
    /// Create a failure outcome
    pub fn failed(stage: FailureStage, message: impl Into<String>) -> Self {
        Self::Failed {
            stage,
            message: message.into(),
        }
    }

    /// Outcome discriminant
    pub fn kind(&self) -> OutcomeKind {
        match self {
            CheckoutOutcome::Succeeded { .. } => OutcomeKind::Succeeded,
            CheckoutOutcome::Cancelled { .. } => OutcomeKind::Cancelled,
            CheckoutOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    /// Failure message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            CheckoutOutcome::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
