//! Single-assignment cell reconciling the racing completion paths
//!
//! The completion promise, the side-channel bridge and `reset` all write to
//! the same cell. The first write wins; every later write is refused and
//! reported as such, independent of the order the producers were started in.

use checkout_core::CheckoutOutcome;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Value written into an `OutcomeCell`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// A terminal outcome for the session
    Outcome(CheckoutOutcome),
    /// The session was reset while waiting
    Superseded,
}

/// Write-once slot shared by all producers of a session's outcome
#[derive(Debug)]
pub struct OutcomeCell {
    sender: RefCell<Option<oneshot::Sender<Settlement>>>,
    settled: Cell<bool>,
}

impl OutcomeCell {
    /// Create a cell and the receiver the controller waits on
    pub fn new() -> (Rc<Self>, oneshot::Receiver<Settlement>) {
        let (sender, receiver) = oneshot::channel();
        let cell = Rc::new(Self {
            sender: RefCell::new(Some(sender)),
            settled: Cell::new(false),
        });
        (cell, receiver)
    }

    /// Write `settlement` if nothing was written before
    ///
    /// Returns `true` when this call settled the cell.
    pub fn settle(&self, settlement: Settlement) -> bool {
        if self.settled.replace(true) {
            return false;
        }
        if let Some(sender) = self.sender.borrow_mut().take() {
            // The receiver may already be gone when the waiting call was dropped
            let _ = sender.send(settlement);
        }
        true
    }

    /// Whether any producer has written
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}
