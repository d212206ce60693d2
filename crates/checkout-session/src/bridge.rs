//! # Signal Bridge
//!
//! Scoped listener for the out-of-band close message. Some SDK failure modes
//! leave the completion promise pending forever, so the close message is the
//! only reliable cancellation signal in those cases.
//!
//! Each `arm` yields a `BridgeGuard`; disposing the guard (explicitly or by
//! dropping it) unsubscribes exactly once and stops delivery even for
//! messages the host had already queued.

use checkout_core::{
    classify_message, CancellationSignal, MessageEffects, MessageHandler, MessagePayload, Result,
    SignalVocabulary, SubscriptionId,
};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Arms side-channel listeners
pub struct SignalBridge;

impl SignalBridge {
    /// Subscribe to close messages; `on_cancel` runs for each recognized one
    pub fn arm<F>(
        messages: Rc<dyn MessageEffects>,
        vocabulary: SignalVocabulary,
        on_cancel: F,
    ) -> Result<BridgeGuard>
    where
        F: Fn(CancellationSignal) + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let gate = active.clone();
        let handler: MessageHandler = Rc::new(move |payload: MessagePayload| {
            if !gate.get() {
                return;
            }
            match classify_message(&payload, &vocabulary) {
                Some(signal) => {
                    debug!("close message received");
                    on_cancel(signal);
                }
                None => trace!("ignoring unrelated message"),
            }
        });

        let subscription = messages.subscribe(handler)?;
        debug!(subscription = subscription.get(), "signal bridge armed");
        Ok(BridgeGuard {
            messages,
            subscription: Cell::new(Some(subscription)),
            active,
        })
    }
}

/// Live side-channel subscription
pub struct BridgeGuard {
    messages: Rc<dyn MessageEffects>,
    subscription: Cell<Option<SubscriptionId>>,
    active: Rc<Cell<bool>>,
}

impl BridgeGuard {
    /// Stop delivery; returns `true` for the call that actually unsubscribed
    pub fn dispose(&self) -> bool {
        self.active.set(false);
        let Some(subscription) = self.subscription.take() else {
            return false;
        };
        if let Err(e) = self.messages.unsubscribe(subscription) {
            warn!(
                subscription = subscription.get(),
                error = %e,
                "failed to unsubscribe signal bridge"
            );
        }
        debug!(subscription = subscription.get(), "signal bridge disposed");
        true
    }

    /// Whether the guard still holds its subscription
    pub fn is_armed(&self) -> bool {
        self.subscription.get().is_some()
    }
}

impl Drop for BridgeGuard {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::MessagePayload;
    use checkout_testkit::FakeMessageBus;
    use serde_json::json;
    use std::cell::RefCell;

    fn close_message() -> MessagePayload {
        MessagePayload::Structured(json!({ "source": "mce:App::closeApp" }))
    }

    fn recorder() -> (Rc<RefCell<Vec<CancellationSignal>>>, impl Fn(CancellationSignal)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |signal| sink.borrow_mut().push(signal))
    }

    #[test]
    fn test_delivers_only_close_messages() {
        let bus = Rc::new(FakeMessageBus::new());
        let (seen, on_cancel) = recorder();
        let _guard =
            SignalBridge::arm(bus.clone(), SignalVocabulary::default(), on_cancel).unwrap();

        bus.deliver(MessagePayload::Text("{broken".to_string()));
        bus.deliver(MessagePayload::Structured(json!({ "source": "analytics" })));
        bus.deliver(MessagePayload::Opaque);
        assert!(seen.borrow().is_empty());

        bus.deliver(close_message());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_dispose_unsubscribes_once() {
        let bus = Rc::new(FakeMessageBus::new());
        let (seen, on_cancel) = recorder();
        let guard = SignalBridge::arm(bus.clone(), SignalVocabulary::default(), on_cancel).unwrap();
        assert_eq!(bus.listener_count(), 1);

        assert!(guard.dispose());
        assert!(!guard.dispose());
        assert!(!guard.is_armed());
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.unsubscribe_count(), 1);

        bus.deliver(close_message());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_drop_disposes() {
        let bus = Rc::new(FakeMessageBus::new());
        let (_seen, on_cancel) = recorder();
        {
            let _guard =
                SignalBridge::arm(bus.clone(), SignalVocabulary::default(), on_cancel).unwrap();
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_disposed_gate_blocks_queued_delivery() {
        let bus = Rc::new(FakeMessageBus::new());
        let (seen, on_cancel) = recorder();
        let guard = SignalBridge::arm(bus.clone(), SignalVocabulary::default(), on_cancel).unwrap();

        // Simulate a host that dispatches to handlers captured before removal
        let captured = bus.handlers();
        guard.dispose();
        for handler in captured {
            handler(close_message());
        }
        assert!(seen.borrow().is_empty());
    }
}
