//! Fake vendor SDK
//!
//! One `FakeSdk` plays the entry point; the instances, unified payments
//! objects and triggers it hands out share its state, so a test can script
//! every stage and settle `show` from the outside.

use crate::surface::FakeSurface;
use async_trait::async_trait;
use checkout_core::{
    InitError, InitStage, PaymentTrigger, SdkEntryEffects, SdkInstance, SdkRejection,
    SessionToken, TargetSurfaces, TransientToken, UnifiedPayments,
};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// How `show` settles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShowBehavior {
    /// Stays pending until `resolve_show` or `reject_show`
    #[default]
    Manual,
    /// Resolves immediately with a transient token
    Resolve(String),
    /// Rejects immediately
    Reject(SdkRejection),
    /// Never settles
    NeverSettles,
}

type ShowResult = Result<TransientToken, SdkRejection>;

struct SdkState {
    init_rejection: Option<String>,
    hold_initialize: bool,
    unified_rejection: Option<String>,
    trigger_rejection: Option<String>,
    show: ShowBehavior,
    supports_dispose: bool,
    dispose_fails: bool,
    surface: Option<Rc<FakeSurface>>,

    tokens_seen: Vec<String>,
    embedded_flags: Vec<bool>,
    triggers: Vec<(String, TargetSurfaces)>,
    show_calls: usize,
    disposed: usize,
    pending_show: Option<oneshot::Sender<ShowResult>>,
    pending_init: Option<oneshot::Sender<()>>,
}

impl Default for SdkState {
    fn default() -> Self {
        Self {
            init_rejection: None,
            hold_initialize: false,
            unified_rejection: None,
            trigger_rejection: None,
            show: ShowBehavior::default(),
            supports_dispose: true,
            dispose_fails: false,
            surface: None,
            tokens_seen: Vec::new(),
            embedded_flags: Vec::new(),
            triggers: Vec::new(),
            show_calls: 0,
            disposed: 0,
            pending_show: None,
            pending_init: None,
        }
    }
}

/// Scriptable vendor SDK
#[derive(Default)]
pub struct FakeSdk {
    state: Rc<RefCell<SdkState>>,
    live_instances: Rc<Cell<usize>>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `initialize` reject
    pub fn reject_initialize(&self, message: &str) {
        self.state.borrow_mut().init_rejection = Some(message.to_string());
    }

    /// Keep later `initialize` calls pending until `complete_initialize`
    pub fn hold_initialize(&self) {
        self.state.borrow_mut().hold_initialize = true;
    }

    /// Let a held `initialize` produce its instance
    pub fn complete_initialize(&self) -> bool {
        let pending = self.state.borrow_mut().pending_init.take();
        pending.is_some_and(|sender| sender.send(()).is_ok())
    }

    /// Whether an `initialize` call is held
    pub fn has_pending_initialize(&self) -> bool {
        self.state.borrow().pending_init.is_some()
    }

    /// Make `unified_payments` reject
    pub fn reject_unified_payments(&self, message: &str) {
        self.state.borrow_mut().unified_rejection = Some(message.to_string());
    }

    /// Make `create_trigger` reject
    pub fn reject_create_trigger(&self, message: &str) {
        self.state.borrow_mut().trigger_rejection = Some(message.to_string());
    }

    /// Choose how later `show` calls settle
    pub fn set_show(&self, behavior: ShowBehavior) {
        self.state.borrow_mut().show = behavior;
    }

    /// Instances expose no disposal capability
    pub fn without_dispose(&self) {
        self.state.borrow_mut().supports_dispose = false;
    }

    /// Instance disposal reports an error
    pub fn fail_dispose(&self) {
        self.state.borrow_mut().dispose_fails = true;
    }

    /// Render into `surface` when `show` is called
    pub fn render_into(&self, surface: Rc<FakeSurface>) {
        self.state.borrow_mut().surface = Some(surface);
    }

    /// Settle a pending `show` with a transient token
    pub fn resolve_show(&self, token: &str) -> bool {
        self.settle_show(Ok(TransientToken::new(token)))
    }

    /// Settle a pending `show` with a rejection
    pub fn reject_show(&self, rejection: SdkRejection) -> bool {
        self.settle_show(Err(rejection))
    }

    fn settle_show(&self, result: ShowResult) -> bool {
        let pending = self.state.borrow_mut().pending_show.take();
        pending.is_some_and(|sender| sender.send(result).is_ok())
    }

    /// Whether a `Manual` show is waiting
    pub fn has_pending_show(&self) -> bool {
        self.state.borrow().pending_show.is_some()
    }

    /// Number of `initialize` calls
    pub fn initialize_calls(&self) -> usize {
        self.state.borrow().tokens_seen.len()
    }

    /// Tokens passed to `initialize`
    pub fn tokens_seen(&self) -> Vec<String> {
        self.state.borrow().tokens_seen.clone()
    }

    /// Embedding flags passed to `unified_payments`
    pub fn embedded_flags(&self) -> Vec<bool> {
        self.state.borrow().embedded_flags.clone()
    }

    /// Entry methods and targets passed to `create_trigger`
    pub fn triggers(&self) -> Vec<(String, TargetSurfaces)> {
        self.state.borrow().triggers.clone()
    }

    /// Number of `show` calls
    pub fn show_calls(&self) -> usize {
        self.state.borrow().show_calls
    }

    /// Number of successful disposals
    pub fn disposed_count(&self) -> usize {
        self.state.borrow().disposed
    }

    /// Instances handed out and not yet dropped
    pub fn live_instances(&self) -> usize {
        self.live_instances.get()
    }
}

#[async_trait(?Send)]
impl SdkEntryEffects for FakeSdk {
    async fn initialize(&self, token: &SessionToken) -> Result<Box<dyn SdkInstance>, InitError> {
        let gate = {
            let mut state = self.state.borrow_mut();
            state.tokens_seen.push(token.as_str().to_string());
            if let Some(message) = &state.init_rejection {
                return Err(InitError::rejected(InitStage::Initialize, message.clone()));
            }
            if state.hold_initialize {
                let (sender, receiver) = oneshot::channel();
                state.pending_init = Some(sender);
                Some(receiver)
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            if gate.await.is_err() {
                return futures::future::pending().await;
            }
        }

        self.live_instances.set(self.live_instances.get() + 1);
        Ok(Box::new(FakeInstance {
            state: self.state.clone(),
            live: self.live_instances.clone(),
            disposed: Cell::new(false),
        }))
    }
}

struct FakeInstance {
    state: Rc<RefCell<SdkState>>,
    live: Rc<Cell<usize>>,
    disposed: Cell<bool>,
}

impl Drop for FakeInstance {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}

#[async_trait(?Send)]
impl SdkInstance for FakeInstance {
    async fn unified_payments(
        &self,
        embedded: bool,
    ) -> Result<Box<dyn UnifiedPayments>, InitError> {
        let mut state = self.state.borrow_mut();
        state.embedded_flags.push(embedded);
        if let Some(message) = &state.unified_rejection {
            return Err(InitError::rejected(InitStage::UnifiedPayments, message.clone()));
        }
        Ok(Box::new(FakeUnifiedPayments {
            state: self.state.clone(),
        }))
    }

    fn supports_dispose(&self) -> bool {
        self.state.borrow().supports_dispose
    }

    fn dispose(&self) -> Result<(), InitError> {
        let mut state = self.state.borrow_mut();
        if state.dispose_fails {
            return Err(InitError::rejected(InitStage::Dispose, "instance already torn down"));
        }
        if !self.disposed.replace(true) {
            state.disposed += 1;
        }
        Ok(())
    }
}

struct FakeUnifiedPayments {
    state: Rc<RefCell<SdkState>>,
}

#[async_trait(?Send)]
impl UnifiedPayments for FakeUnifiedPayments {
    async fn create_trigger(
        &self,
        method: &str,
        targets: &TargetSurfaces,
    ) -> Result<Box<dyn PaymentTrigger>, InitError> {
        let mut state = self.state.borrow_mut();
        state.triggers.push((method.to_string(), targets.clone()));
        if let Some(message) = &state.trigger_rejection {
            return Err(InitError::rejected(InitStage::CreateTrigger, message.clone()));
        }
        Ok(Box::new(FakeTrigger {
            state: self.state.clone(),
            method: method.to_string(),
            targets: targets.clone(),
        }))
    }
}

struct FakeTrigger {
    state: Rc<RefCell<SdkState>>,
    method: String,
    targets: TargetSurfaces,
}

#[async_trait(?Send)]
impl PaymentTrigger for FakeTrigger {
    async fn show(&self) -> Result<TransientToken, SdkRejection> {
        let receiver = {
            let mut state = self.state.borrow_mut();
            state.show_calls += 1;
            if let Some(surface) = &state.surface {
                for selector in self.targets.values() {
                    surface.render(selector, &format!("<entry method=\"{}\">", self.method));
                }
            }
            match state.show.clone() {
                ShowBehavior::Resolve(token) => return Ok(TransientToken::new(token)),
                ShowBehavior::Reject(rejection) => return Err(rejection),
                ShowBehavior::NeverSettles => None,
                ShowBehavior::Manual => {
                    let (sender, receiver) = oneshot::channel();
                    state.pending_show = Some(sender);
                    Some(receiver)
                }
            }
        };

        match receiver {
            Some(receiver) => match receiver.await {
                Ok(result) => result,
                Err(_) => futures::future::pending().await,
            },
            None => futures::future::pending().await,
        }
    }
}
