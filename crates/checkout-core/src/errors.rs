//! Unified error system for checkout sessions
//!
//! Stage-specific errors (`DecodeError`, `LoadError`, `InitError`) carry the
//! taxonomy callers branch on; `CheckoutError` wraps them together with the
//! infrastructure failures reported by effect handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure to turn a session token into SDK metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DecodeError {
    /// The token does not have a payload segment
    #[error("Malformed token: expected at least 2 segments, found {segments}")]
    MalformedToken {
        /// Number of `.`-separated segments found
        segments: usize,
    },

    /// The payload segment is not base64-encoded JSON
    #[error("Malformed payload: {message}")]
    MalformedPayload {
        /// Error message describing the decoding failure
        message: String,
    },

    /// The payload lacks a required metadata field
    #[error("Missing metadata: {field}")]
    MissingMetadata {
        /// Name of the absent or empty field
        field: String,
    },
}

/// Failure to attach the SDK resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LoadError {
    /// Network failure or integrity mismatch reported by the host
    #[error("Failed to load {location}: {message}")]
    LoadFailed {
        /// Resource location that failed
        location: String,
        /// Error message describing the failure
        message: String,
    },

    /// A later load or unload retired this request before it completed
    #[error("Load of {location} superseded")]
    Superseded {
        /// Resource location whose load was superseded
        location: String,
    },
}

/// Stage of SDK bring-up that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStage {
    /// Top level entry point call
    Initialize,
    /// Obtaining the unified payments sub-instance
    UnifiedPayments,
    /// Creating the manual-entry trigger
    CreateTrigger,
    /// Disposing the instance
    Dispose,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::Initialize => "initialize",
            InitStage::UnifiedPayments => "unifiedPayments",
            InitStage::CreateTrigger => "createTrigger",
            InitStage::Dispose => "dispose",
        };
        f.write_str(name)
    }
}

/// Failure reported by the vendor SDK before the user is shown anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum InitError {
    /// The SDK rejected a bring-up call
    #[error("SDK rejected {stage}: {message}")]
    SdkRejected {
        /// Stage that was rejected
        stage: InitStage,
        /// Rejection message
        message: String,
    },

    /// The SDK entry point is not available in the host
    #[error("SDK entry point `{name}` is not available")]
    EntryPointMissing {
        /// Name of the missing entry point
        name: String,
    },
}

impl InitError {
    /// Create a rejection error for a bring-up stage
    pub fn rejected(stage: InitStage, message: impl Into<String>) -> Self {
        Self::SdkRejected {
            stage,
            message: message.into(),
        }
    }
}

/// Unified error type for all checkout operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CheckoutError {
    /// Token decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Resource loading failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// SDK bring-up failed
    #[error(transparent)]
    Init(#[from] InitError),

    /// Invalid configuration
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the invalid configuration
        message: String,
    },

    /// Side-channel subscription failed
    #[error("Signal bridge error: {message}")]
    Bridge {
        /// Error message describing the subscription failure
        message: String,
    },

    /// Render surface operation failed
    #[error("Surface error: {message}")]
    Surface {
        /// Error message describing the surface failure
        message: String,
    },

    /// Navigation request failed
    #[error("Navigation error: {message}")]
    Navigation {
        /// Error message describing the navigation failure
        message: String,
    },

    /// A state transition not allowed by the session state machine
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// State the controller was in
        from: String,
        /// State that was requested
        to: String,
    },

    /// The session was reset or re-initialized while this call was in flight
    #[error("Session superseded")]
    Superseded,

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl CheckoutError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a signal bridge error
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge {
            message: message.into(),
        }
    }

    /// Create a surface error
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
