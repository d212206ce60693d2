//! Checkout Effects - Browser Handlers
//!
//! Implementations of the `checkout_core::effects` traits on top of the
//! browser: script injection for the SDK resource, reflection-based bindings
//! to the vendor global, `window` message listeners, DOM surface clearing and
//! navigation. Every handler wraps host objects and is therefore wasm-only.
//!
//! `logging` is available on every target.

#![forbid(unsafe_code)]

pub mod logging;

#[cfg(target_arch = "wasm32")]
mod js;
#[cfg(target_arch = "wasm32")]
pub mod message;
#[cfg(target_arch = "wasm32")]
pub mod navigation;
#[cfg(target_arch = "wasm32")]
pub mod resource;
#[cfg(target_arch = "wasm32")]
pub mod sdk;
#[cfg(target_arch = "wasm32")]
pub mod surface;

pub use logging::init_logging;

#[cfg(target_arch = "wasm32")]
pub use message::{payload_from_js, WindowMessageHandler};
#[cfg(target_arch = "wasm32")]
pub use navigation::{CallbackNavigator, LocationNavigator};
#[cfg(target_arch = "wasm32")]
pub use resource::ScriptResourceHandler;
#[cfg(target_arch = "wasm32")]
pub use sdk::{JsPaymentTrigger, JsSdkEntryPoint, JsSdkInstance, JsUnifiedPayments};
#[cfg(target_arch = "wasm32")]
pub use surface::DomSurfaceHandler;

/// Assemble the browser handler bundle
///
/// `navigation` is supplied by the caller so a host router can replace the
/// default `LocationNavigator`.
#[cfg(target_arch = "wasm32")]
pub fn browser_effects(
    config: &checkout_core::CheckoutConfig,
    navigation: std::rc::Rc<dyn checkout_core::NavigationEffects>,
) -> checkout_core::Result<checkout_core::SessionEffects> {
    use std::rc::Rc;

    Ok(checkout_core::SessionEffects {
        resources: Rc::new(ScriptResourceHandler::new()?),
        sdk: Rc::new(JsSdkEntryPoint::new(config.sdk.entry_point.clone())),
        messages: Rc::new(WindowMessageHandler::new()?),
        surface: Rc::new(DomSurfaceHandler::new()?),
        navigation,
    })
}
