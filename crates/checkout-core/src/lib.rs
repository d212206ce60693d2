//! Checkout Core - Session Model Foundation
//!
//! This crate provides the pure types and effect interfaces shared by every
//! layer of a checkout session. It contains no browser bindings and no
//! lifecycle logic; those live in `checkout-effects` and `checkout-session`.
//!
//! # Contents
//!
//! ## Data Model
//! - `SessionToken` / `SdkMetadata`: the signed capture token and what it points at
//! - `SessionState`: the controller's finite state machine
//! - `CheckoutOutcome` / `CancellationSignal`: terminal results
//!
//! ## Pure Operations
//! - `token::decode`: token payload to SDK metadata
//! - `classifier`: vendor reason-code and side-channel message matching
//!
//! ## Effect Interfaces (Pure Signatures)
//! - `ResourceEffects`: `attach`, `detach`
//! - `SdkEntryEffects` and the SDK instance chain: `initialize`, `unified_payments`,
//!   `create_trigger`, `show`, `dispose`
//! - `MessageEffects`, `SurfaceEffects`, `NavigationEffects`

#![forbid(unsafe_code)]

/// Vendor protocol string matching
pub mod classifier;

/// Checkout configuration
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Terminal outcomes and cancellation signals
pub mod outcome;

/// Session state machine
pub mod state;

/// Session token decoding
pub mod token;

// === Public API Re-exports ===

pub use classifier::{classify_message, classify_rejection, RejectionClass, SignalVocabulary};
pub use config::{CheckoutConfig, CleanupPolicy, CrossOriginPolicy};
pub use errors::{CheckoutError, DecodeError, InitError, InitStage, LoadError, Result};
pub use outcome::{
    CancellationSignal, CheckoutOutcome, FailureStage, MessagePayload, OutcomeKind, SdkRejection,
    TransientToken,
};
pub use state::{SessionId, SessionState};
pub use token::{decode, SdkMetadata, SessionToken};

pub use effects::{
    MessageEffects, MessageHandler, NavigationEffects, PaymentTrigger, ResourceEffects,
    ResourceId, ResourceSpec, SdkEntryEffects, SdkInstance, SessionEffects, SubscriptionId,
    SurfaceEffects, TargetSurfaces, UnifiedPayments,
};
