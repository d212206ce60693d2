//! Fake router

use checkout_core::{CheckoutError, NavigationEffects, Result};
use std::cell::{Cell, RefCell};

/// Records navigation requests
#[derive(Default)]
pub struct FakeRouter {
    navigations: RefCell<Vec<String>>,
    fail: Cell<bool>,
}

impl FakeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later navigation fail (it is still recorded)
    pub fn fail_navigations(&self) {
        self.fail.set(true);
    }

    /// Destinations requested so far
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }
}

impl NavigationEffects for FakeRouter {
    fn navigate(&self, destination: &str) -> Result<()> {
        self.navigations.borrow_mut().push(destination.to_string());
        if self.fail.get() {
            return Err(CheckoutError::navigation("router unavailable"));
        }
        Ok(())
    }
}
