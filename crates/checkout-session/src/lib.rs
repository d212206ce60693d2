//! Checkout Session - Lifecycle Controller
//!
//! Drives a single checkout session from an opaque session token to a
//! terminal `CheckoutOutcome`:
//!
//! 1. Decode the token into SDK metadata (`checkout_core::decode`)
//! 2. Attach the SDK resource with integrity verification (`ResourceLoader`)
//! 3. Initialize the SDK and render the entry surface (`SessionController`)
//! 4. Race the completion promise against the close message (`SignalBridge`)
//! 5. Tear everything down on demand (`SessionController::reset`)
//!
//! All effects are injected through `checkout_core::SessionEffects`; browser
//! handlers live in `checkout-effects`, fakes in `checkout-testkit`.

#![cfg_attr(not(target_arch = "wasm32"), forbid(unsafe_code))]

pub mod bridge;
pub mod controller;
pub mod loader;
pub mod outcome_cell;
mod resetter;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bridge::{BridgeGuard, SignalBridge};
pub use controller::{SessionController, SessionSnapshot};
pub use loader::{LoadedResourceHandle, ResourceLoader};
pub use outcome_cell::{OutcomeCell, Settlement};

pub use checkout_core::{
    CheckoutConfig, CheckoutError, CheckoutOutcome, SessionEffects, SessionState, SessionToken,
};
