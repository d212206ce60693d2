//! Cross-context message effect interface
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `checkout-effects` (`WindowMessageHandler`)
//! - **Usage**: `checkout-session::bridge`

use crate::errors::Result;
use crate::outcome::MessagePayload;
use std::rc::Rc;

/// Callback invoked for every delivered message
pub type MessageHandler = Rc<dyn Fn(MessagePayload)>;

/// Identifier of an active subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Create from a raw handler counter
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Subscribe to messages posted from other browsing contexts
pub trait MessageEffects {
    /// Register a handler for every subsequent message
    fn subscribe(&self, handler: MessageHandler) -> Result<SubscriptionId>;

    /// Stop delivery to a subscription; unknown ids are ignored
    fn unsubscribe(&self, id: SubscriptionId) -> Result<()>;
}
