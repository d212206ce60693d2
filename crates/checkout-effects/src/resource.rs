//! Script-tag resource handler
//!
//! Attaches the SDK as a `<script>` element in the document head with
//! `integrity` and `crossorigin` set, so the browser refuses content whose
//! digest does not match. Resolves on `load`; on `error` the element is
//! removed before the failure is reported.

use crate::js::{document, error_message};
use async_trait::async_trait;
use checkout_core::{LoadError, ResourceEffects, ResourceId, ResourceSpec, Result};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlScriptElement};

type Readiness = std::result::Result<(), String>;

/// Attaches SDK resources as script elements
pub struct ScriptResourceHandler {
    document: Document,
    next_id: Cell<u64>,
    scripts: RefCell<HashMap<ResourceId, HtmlScriptElement>>,
}

impl ScriptResourceHandler {
    /// Handler over the current document
    pub fn new() -> Result<Self> {
        Ok(Self {
            document: document()?,
            next_id: Cell::new(0),
            scripts: RefCell::new(HashMap::new()),
        })
    }

    fn create_script(&self, spec: &ResourceSpec) -> std::result::Result<HtmlScriptElement, String> {
        let script = self
            .document
            .create_element("script")
            .map_err(|e| error_message(&e))?
            .dyn_into::<HtmlScriptElement>()
            .map_err(|_| "created element is not a script".to_string())?;
        script.set_src(&spec.location);
        script.set_integrity(&spec.integrity);
        script.set_cross_origin(Some(spec.cross_origin.as_attr()));
        script.set_async(true);
        Ok(script)
    }
}

#[async_trait(?Send)]
impl ResourceEffects for ScriptResourceHandler {
    async fn attach(&self, spec: &ResourceSpec) -> std::result::Result<ResourceId, LoadError> {
        let failed = |message: String| LoadError::LoadFailed {
            location: spec.location.clone(),
            message,
        };

        let script = self.create_script(spec).map_err(failed)?;
        let head = self
            .document
            .head()
            .ok_or_else(|| failed("document has no head".to_string()))?;

        let (sender, receiver) = oneshot::channel::<Readiness>();
        let sender = Rc::new(RefCell::new(Some(sender)));
        let on_load = {
            let sender = sender.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = sender.borrow_mut().take() {
                    let _ = tx.send(Ok(()));
                }
            })
        };
        let on_error = {
            let sender = sender.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = sender.borrow_mut().take() {
                    let _ = tx.send(Err("failed to load or integrity mismatch".to_string()));
                }
            })
        };
        script.set_onload(Some(on_load.as_ref().unchecked_ref()));
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        let pending = PendingScript {
            script,
            keep: false,
            _on_load: on_load,
            _on_error: on_error,
        };

        if let Err(e) = head.append_child(&pending.script) {
            return Err(failed(error_message(&e)));
        }
        let message = match receiver.await {
            Ok(Ok(())) => {
                let id = ResourceId::new(self.next_id.get() + 1);
                self.next_id.set(id.get());
                self.scripts.borrow_mut().insert(id, pending.keep());
                debug!(location = %spec.location, %id, "script resource ready");
                return Ok(id);
            }
            Ok(Err(message)) => message,
            Err(_) => "script load abandoned".to_string(),
        };
        Err(failed(message))
    }

    fn detach(&self, id: ResourceId) -> Result<()> {
        if let Some(script) = self.scripts.borrow_mut().remove(&id) {
            script.remove();
        }
        Ok(())
    }
}

/// A script element between insertion and readiness
///
/// Dropping it detaches both listeners, then removes the element unless it
/// was kept. This also runs when the `attach` future is dropped mid-flight.
struct PendingScript {
    script: HtmlScriptElement,
    keep: bool,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl PendingScript {
    fn keep(mut self) -> HtmlScriptElement {
        self.keep = true;
        self.script.clone()
    }
}

impl Drop for PendingScript {
    fn drop(&mut self) {
        // Listeners go first; the closures are freed right after this body
        self.script.set_onload(None);
        self.script.set_onerror(None);
        if !self.keep {
            self.script.remove();
        }
    }
}
