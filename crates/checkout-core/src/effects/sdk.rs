//! Vendor SDK effect interface
//!
//! # Effect Classification
//!
//! - **Category**: Application Effect (external collaborator)
//! - **Implementation**: `checkout-effects` (`JsSdkEntryPoint`), `checkout-testkit` (`FakeSdk`)
//! - **Usage**: `checkout-session::controller`
//!
//! The SDK is a black box reached through a chain of capabilities:
//! entry point, instance, unified payments, trigger. Each link is a trait so
//! the controller never depends on a process-wide global.

use crate::errors::InitError;
use crate::outcome::{SdkRejection, TransientToken};
use crate::token::SessionToken;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Named target surfaces a trigger renders into (name to selector)
pub type TargetSurfaces = BTreeMap<String, String>;

/// The SDK's initialization entry point
#[async_trait(?Send)]
pub trait SdkEntryEffects {
    /// Initialize an SDK instance with the original session token
    async fn initialize(&self, token: &SessionToken) -> Result<Box<dyn SdkInstance>, InitError>;
}

/// An initialized SDK instance
#[async_trait(?Send)]
pub trait SdkInstance {
    /// Obtain the unified payments sub-instance
    async fn unified_payments(&self, embedded: bool)
        -> Result<Box<dyn UnifiedPayments>, InitError>;

    /// Whether the instance exposes a disposal capability
    fn supports_dispose(&self) -> bool {
        false
    }

    /// Release the instance; a no-op when disposal is unsupported
    fn dispose(&self) -> Result<(), InitError> {
        Ok(())
    }
}

/// The unified payments sub-instance
#[async_trait(?Send)]
pub trait UnifiedPayments {
    /// Create a trigger bound to an entry method and target surfaces
    async fn create_trigger(
        &self,
        method: &str,
        targets: &TargetSurfaces,
    ) -> Result<Box<dyn PaymentTrigger>, InitError>;
}

/// A trigger that shows the entry surface and awaits the user
#[async_trait(?Send)]
pub trait PaymentTrigger {
    /// Display the entry surface and wait for a result artifact
    ///
    /// May stay pending forever when the SDK fails internally.
    async fn show(&self) -> Result<TransientToken, SdkRejection>;
}
