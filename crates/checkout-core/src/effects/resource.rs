//! Resource effect interface for attaching the vendor SDK to the host
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `checkout-effects` (`ScriptResourceHandler`)
//! - **Usage**: `checkout-session::loader`

use crate::config::CrossOriginPolicy;
use crate::errors::{LoadError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an attached resource, minted by the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Create from a raw handler counter
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource-{}", self.0)
    }
}

/// What to attach and how the host must verify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Resource URI
    pub location: String,
    /// Subresource integrity digest the content must match
    pub integrity: String,
    /// Cross-origin fetch policy
    pub cross_origin: CrossOriginPolicy,
}

/// Attach and detach executable resources
#[async_trait(?Send)]
pub trait ResourceEffects {
    /// Attach a resource and resolve once it is ready for execution
    ///
    /// The host must refuse to execute content that does not match
    /// `spec.integrity`. On failure the handler removes whatever it attached
    /// and returns `LoadError::LoadFailed`.
    async fn attach(&self, spec: &ResourceSpec) -> std::result::Result<ResourceId, LoadError>;

    /// Remove an attached resource; unknown ids are ignored
    fn detach(&self, id: ResourceId) -> Result<()>;
}
