//! JavaScript facade
//!
//! Exposes a `CheckoutSession` class to the page. Outcomes are delivered as
//! plain objects tagged by `kind`; call-level errors (including a superseded
//! call) reject the returned promise with an `Error`.

// `#[wasm_bindgen]` expands to unsafe ABI glue
#![allow(unsafe_code)]

use crate::SessionController;
use checkout_core::{CheckoutConfig, CheckoutError, NavigationEffects, SessionToken};
use checkout_effects::{browser_effects, init_logging, CallbackNavigator, LocationNavigator};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn to_js(error: CheckoutError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

fn to_plain<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

/// Browser-facing checkout session
#[wasm_bindgen]
pub struct CheckoutSession {
    controller: Rc<SessionController>,
}

#[wasm_bindgen]
impl CheckoutSession {
    /// Create a session from optional TOML configuration
    ///
    /// `navigate`, when given, receives the cancellation destination instead
    /// of `window.location` being assigned.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_toml: Option<String>,
        navigate: Option<js_sys::Function>,
    ) -> Result<CheckoutSession, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_toml {
            Some(text) => CheckoutConfig::from_toml_str(&text).map_err(to_js)?,
            None => CheckoutConfig::default(),
        };
        init_logging(&config.logging);

        let navigation: Rc<dyn NavigationEffects> = match navigate {
            Some(callback) => Rc::new(CallbackNavigator::new(callback)),
            None => Rc::new(LocationNavigator::new().map_err(to_js)?),
        };
        let effects = browser_effects(&config, navigation).map_err(to_js)?;
        let controller = SessionController::new(effects, config).map_err(to_js)?;
        Ok(Self {
            controller: Rc::new(controller),
        })
    }

    /// Run a checkout for `token`; resolves with the outcome
    #[wasm_bindgen(js_name = initializeCheckout)]
    pub fn initialize_checkout(&self, token: String) -> js_sys::Promise {
        let controller = self.controller.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = controller
                .initialize_checkout(&SessionToken::new(token))
                .await
                .map_err(to_js)?;
            to_plain(&outcome)
        })
    }

    /// Tear the session down
    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Current state name
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.controller.state().to_string()
    }

    /// What the session currently holds
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_plain(&self.controller.snapshot())
    }
}
