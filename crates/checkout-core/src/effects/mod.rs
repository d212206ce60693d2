//! Layer 1: Core Effect Trait Definitions
//!
//! Pure trait definitions for every side effect a checkout session performs.
//! This module defines **what** effects can be performed; handlers in
//! `checkout-effects` (browser) and `checkout-testkit` (fakes) define **how**.
//!
//! # Threading
//!
//! A checkout session runs on a single cooperative event loop and handlers
//! wrap host objects that cannot cross threads, so every trait here is
//! `?Send` and shared through `Rc`.

pub mod message;
pub mod navigation;
pub mod resource;
pub mod sdk;
pub mod surface;

pub use message::{MessageEffects, MessageHandler, SubscriptionId};
pub use navigation::NavigationEffects;
pub use resource::{ResourceEffects, ResourceId, ResourceSpec};
pub use sdk::{PaymentTrigger, SdkEntryEffects, SdkInstance, TargetSurfaces, UnifiedPayments};
pub use surface::SurfaceEffects;

use std::rc::Rc;

/// Handler bundle injected into a session controller
#[derive(Clone)]
pub struct SessionEffects {
    /// SDK resource attachment
    pub resources: Rc<dyn ResourceEffects>,
    /// Vendor SDK entry point
    pub sdk: Rc<dyn SdkEntryEffects>,
    /// Cross-context message subscription
    pub messages: Rc<dyn MessageEffects>,
    /// Render surface housekeeping
    pub surface: Rc<dyn SurfaceEffects>,
    /// Outbound navigation
    pub navigation: Rc<dyn NavigationEffects>,
}
