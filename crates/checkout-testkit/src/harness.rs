//! One-stop fake effect bundle

use crate::{FakeMessageBus, FakeResourceHost, FakeRouter, FakeSdk, FakeSurface};
use checkout_core::{CheckoutConfig, SessionEffects};
use std::rc::Rc;

/// Destination the harness configuration navigates to on cancellation
pub const CANCEL_DESTINATION: &str = "/checkout/cancelled";

/// Every fake a session needs, kept reachable for assertions
pub struct TestHarness {
    pub resources: Rc<FakeResourceHost>,
    pub sdk: Rc<FakeSdk>,
    pub messages: Rc<FakeMessageBus>,
    pub surface: Rc<FakeSurface>,
    pub router: Rc<FakeRouter>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Fresh fakes; the SDK renders into the harness surface on `show`
    pub fn new() -> Self {
        let surface = Rc::new(FakeSurface::new());
        let sdk = Rc::new(FakeSdk::new());
        sdk.render_into(surface.clone());
        Self {
            resources: Rc::new(FakeResourceHost::new()),
            sdk,
            messages: Rc::new(FakeMessageBus::new()),
            surface,
            router: Rc::new(FakeRouter::new()),
        }
    }

    /// Effect bundle sharing these fakes
    pub fn effects(&self) -> SessionEffects {
        SessionEffects {
            resources: self.resources.clone(),
            sdk: self.sdk.clone(),
            messages: self.messages.clone(),
            surface: self.surface.clone(),
            navigation: self.router.clone(),
        }
    }

    /// Default configuration with a cancellation destination
    pub fn config(&self) -> CheckoutConfig {
        let mut config = CheckoutConfig::default();
        config.navigation.cancel_destination = Some(CANCEL_DESTINATION.to_string());
        config
    }

    /// Selector of the default payment surface
    pub fn payment_surface(&self) -> String {
        let config = CheckoutConfig::default();
        config
            .sdk
            .targets
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    }
}
