//! Fake cross-context message bus

use checkout_core::{
    CheckoutError, MessageEffects, MessageHandler, MessagePayload, Result, SubscriptionId,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: BTreeMap<u64, MessageHandler>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    refuse_subscriptions: bool,
}

/// Synchronous in-memory message bus
#[derive(Default)]
pub struct FakeMessageBus {
    state: RefCell<BusState>,
}

impl FakeMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `subscribe` fail
    pub fn refuse_subscriptions(&self) {
        self.state.borrow_mut().refuse_subscriptions = true;
    }

    /// Deliver a message to every current listener
    pub fn deliver(&self, payload: MessagePayload) {
        for handler in self.handlers() {
            handler(payload.clone());
        }
    }

    /// Snapshot of registered handlers
    pub fn handlers(&self) -> Vec<MessageHandler> {
        self.state.borrow().listeners.values().cloned().collect()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Number of `subscribe` calls
    pub fn subscribe_count(&self) -> usize {
        self.state.borrow().subscribe_calls
    }

    /// Number of `unsubscribe` calls
    pub fn unsubscribe_count(&self) -> usize {
        self.state.borrow().unsubscribe_calls
    }
}

impl MessageEffects for FakeMessageBus {
    fn subscribe(&self, handler: MessageHandler) -> Result<SubscriptionId> {
        let mut state = self.state.borrow_mut();
        state.subscribe_calls += 1;
        if state.refuse_subscriptions {
            return Err(CheckoutError::bridge("message subscriptions refused"));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.insert(id, handler);
        Ok(SubscriptionId::new(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.unsubscribe_calls += 1;
        state.listeners.remove(&id.get());
        Ok(())
    }
}

/// Text-framed close message
pub fn close_event_message() -> MessagePayload {
    MessagePayload::Text(json!({ "event": "closeApp", "data": {} }).to_string())
}

/// Structured close message
pub fn close_source_message() -> MessagePayload {
    MessagePayload::Structured(json!({ "source": "mce:App::closeApp", "payload": null }))
}

/// Unrelated message of the kind other frames post
pub fn unrelated_message() -> MessagePayload {
    MessagePayload::Structured(json!({ "source": "react-devtools-bridge", "payload": {} }))
}
