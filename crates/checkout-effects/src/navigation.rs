//! Navigation handlers

use crate::js::{error_message, window};
use checkout_core::{CheckoutError, NavigationEffects, Result};
use js_sys::Function;
use wasm_bindgen::JsValue;
use web_sys::Window;

/// Navigates by assigning `window.location`
pub struct LocationNavigator {
    window: Window,
}

impl LocationNavigator {
    /// Navigator over the current window
    pub fn new() -> Result<Self> {
        Ok(Self { window: window()? })
    }
}

impl NavigationEffects for LocationNavigator {
    fn navigate(&self, destination: &str) -> Result<()> {
        self.window
            .location()
            .assign(destination)
            .map_err(|e| CheckoutError::navigation(error_message(&e)))
    }
}

/// Hands the destination to a host router callback
pub struct CallbackNavigator {
    callback: Function,
}

impl CallbackNavigator {
    /// Navigator calling `callback(destination)`
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl NavigationEffects for CallbackNavigator {
    fn navigate(&self, destination: &str) -> Result<()> {
        self.callback
            .call1(&JsValue::NULL, &JsValue::from_str(destination))
            .map(|_| ())
            .map_err(|e| CheckoutError::navigation(error_message(&e)))
    }
}
