//! Fake render surfaces

use checkout_core::{CheckoutError, Result, SurfaceEffects};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Selector-addressed content store
#[derive(Default)]
pub struct FakeSurface {
    contents: RefCell<BTreeMap<String, String>>,
    clear_calls: Cell<usize>,
    fail: Cell<bool>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put content into a surface
    pub fn render(&self, selector: &str, content: &str) {
        self.contents
            .borrow_mut()
            .insert(selector.to_string(), content.to_string());
    }

    /// Content of a surface
    pub fn content(&self, selector: &str) -> Option<String> {
        self.contents.borrow().get(selector).cloned()
    }

    /// Whether every surface is empty
    pub fn is_blank(&self) -> bool {
        self.contents.borrow().values().all(String::is_empty)
    }

    /// Number of `clear` calls
    pub fn clear_count(&self) -> usize {
        self.clear_calls.get()
    }

    /// Make every later `clear` fail without touching content
    pub fn fail_clears(&self) {
        self.fail.set(true);
    }
}

impl SurfaceEffects for FakeSurface {
    fn clear(&self, selector: &str) -> Result<()> {
        self.clear_calls.set(self.clear_calls.get() + 1);
        if self.fail.get() {
            return Err(CheckoutError::surface(format!("cannot clear {selector}")));
        }
        self.contents.borrow_mut().remove(selector);
        Ok(())
    }
}
