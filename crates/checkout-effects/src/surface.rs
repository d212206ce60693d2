//! DOM render surface handler

use crate::js::{document, error_message};
use checkout_core::{CheckoutError, Result, SurfaceEffects};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

/// Clears rendered SDK content from selector matches
pub struct DomSurfaceHandler {
    document: Document,
}

impl DomSurfaceHandler {
    /// Handler over the current document
    pub fn new() -> Result<Self> {
        Ok(Self {
            document: document()?,
        })
    }
}

impl SurfaceEffects for DomSurfaceHandler {
    fn clear(&self, selector: &str) -> Result<()> {
        let matches = self
            .document
            .query_selector_all(selector)
            .map_err(|e| CheckoutError::surface(format!("{selector}: {}", error_message(&e))))?;
        for index in 0..matches.length() {
            if let Some(element) = matches.get(index).and_then(|n| n.dyn_into::<Element>().ok()) {
                element.set_inner_html("");
            }
        }
        Ok(())
    }
}
