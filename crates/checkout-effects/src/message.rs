//! `window` message listener handler

use crate::js::{error_message, window};
use checkout_core::{
    CheckoutError, MessageEffects, MessageHandler, MessagePayload, Result, SubscriptionId,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, Window};

const MESSAGE_EVENT: &str = "message";

/// Classify a posted message body
///
/// Strings stay text, object-like values become structured JSON, anything
/// else (or an object that cannot be represented) is opaque.
pub fn payload_from_js(data: &JsValue) -> MessagePayload {
    if let Some(text) = data.as_string() {
        return MessagePayload::Text(text);
    }
    if data.is_object() {
        return serde_wasm_bindgen::from_value::<serde_json::Value>(data.clone())
            .map(MessagePayload::Structured)
            .unwrap_or(MessagePayload::Opaque);
    }
    MessagePayload::Opaque
}

/// Subscribes handlers to the window's `message` event
pub struct WindowMessageHandler {
    window: Window,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<u64, Closure<dyn FnMut(MessageEvent)>>>,
}

impl WindowMessageHandler {
    /// Handler over the current window
    pub fn new() -> Result<Self> {
        Ok(Self {
            window: window()?,
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        })
    }
}

impl MessageEffects for WindowMessageHandler {
    fn subscribe(&self, handler: MessageHandler) -> Result<SubscriptionId> {
        let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            handler(payload_from_js(&event.data()));
        });
        self.window
            .add_event_listener_with_callback(MESSAGE_EVENT, listener.as_ref().unchecked_ref())
            .map_err(|e| CheckoutError::bridge(error_message(&e)))?;

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().insert(id, listener);
        Ok(SubscriptionId::new(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        let Some(listener) = self.listeners.borrow_mut().remove(&id.get()) else {
            return Ok(());
        };
        self.window
            .remove_event_listener_with_callback(MESSAGE_EVENT, listener.as_ref().unchecked_ref())
            .map_err(|e| CheckoutError::bridge(error_message(&e)))
    }
}

impl Drop for WindowMessageHandler {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            let callback = listener.as_ref().unchecked_ref();
            let _ = self
                .window
                .remove_event_listener_with_callback(MESSAGE_EVENT, callback);
        }
    }
}
