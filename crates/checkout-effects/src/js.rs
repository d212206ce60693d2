//! JavaScript interop helpers shared by the handlers

use checkout_core::{CheckoutError, Result};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Window};

/// Best-effort human-readable text for a thrown or rejected value
pub(crate) fn error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    if let Some(text) = property(value, "message").and_then(|m| m.as_string()) {
        return text;
    }
    format!("{value:?}")
}

/// Read a property, `None` when absent or when the read throws
pub(crate) fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// Look up a callable property
pub(crate) fn method(target: &JsValue, name: &str) -> Option<Function> {
    property(target, name)?.dyn_into::<Function>().ok()
}

/// Await a value that may or may not be a thenable
pub(crate) async fn settle(value: JsValue) -> std::result::Result<JsValue, JsValue> {
    JsFuture::from(Promise::resolve(&value)).await
}

pub(crate) fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| CheckoutError::internal("no window in this context"))
}

pub(crate) fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| CheckoutError::internal("window has no document"))
}
