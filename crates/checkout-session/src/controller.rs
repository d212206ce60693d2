//! # Session Controller
//!
//! Owns one checkout session at a time and drives it through
//! decode, load, SDK bring-up and the outcome race.
//!
//! Three producers may settle the outcome of `AwaitingUserInput`:
//! the trigger's completion promise, the signal bridge, and `reset`. They all
//! write the same `OutcomeCell`, so whichever lands first decides the terminal
//! state and later arrivals are dropped.
//!
//! Every suspension point is followed by an epoch check. A `reset` (or a new
//! `initialize_checkout`) bumps the epoch, and the superseded call releases
//! whatever it obtained after the bump and resolves with
//! `CheckoutError::Superseded`.

use crate::bridge::{BridgeGuard, SignalBridge};
use crate::loader::ResourceLoader;
use crate::outcome_cell::{OutcomeCell, Settlement};
use crate::resetter::SessionResetter;
use checkout_core::{
    classify_rejection, decode, CheckoutConfig, CheckoutError, CheckoutOutcome, FailureStage,
    LoadError, OutcomeKind, RejectionClass, Result, SdkInstance, SdkMetadata, SessionEffects,
    SessionId, SessionState, SessionToken,
};
use futures::future::{self, Either};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::pin::pin;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Controller-owned reference to the initialized SDK instance
pub(crate) struct SdkInstanceHandle {
    instance: Rc<dyn SdkInstance>,
}

impl SdkInstanceHandle {
    /// Dispose the instance, best effort
    pub(crate) fn dispose(self) {
        dispose_instance(self.instance.as_ref());
    }
}

fn dispose_instance(instance: &dyn SdkInstance) {
    if !instance.supports_dispose() {
        debug!("SDK instance has no disposal capability");
        return;
    }
    if let Err(e) = instance.dispose() {
        warn!(error = %e, "failed to dispose SDK instance");
    }
}

/// Mutable session fields; never borrowed across an await
#[derive(Default)]
pub(crate) struct SessionInner {
    pub(crate) state: SessionState,
    pub(crate) epoch: u64,
    pub(crate) session_id: Option<SessionId>,
    pub(crate) metadata: Option<SdkMetadata>,
    pub(crate) instance: Option<SdkInstanceHandle>,
    pub(crate) bridge: Option<BridgeGuard>,
    pub(crate) pending: Option<Rc<OutcomeCell>>,
}

impl SessionInner {
    fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
        Ok(())
    }
}

/// Point-in-time view of what the controller holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Current state
    pub state: SessionState,
    /// Metadata decoded for the current session
    pub metadata: Option<SdkMetadata>,
    /// Whether the SDK resource is attached
    pub resource_loaded: bool,
    /// Whether an SDK instance is held
    pub sdk_instance_alive: bool,
    /// Whether the side-channel listener is registered
    pub bridge_armed: bool,
    /// Whether an outcome race is pending
    pub awaiting_outcome: bool,
}

/// Lifecycle controller for checkout sessions
pub struct SessionController {
    effects: SessionEffects,
    config: CheckoutConfig,
    loader: ResourceLoader,
    inner: RefCell<SessionInner>,
}

impl SessionController {
    /// Create a controller; fails if `config` does not validate
    pub fn new(effects: SessionEffects, config: CheckoutConfig) -> Result<Self> {
        config.validate()?;
        let loader = ResourceLoader::new(effects.resources.clone(), config.resource.cross_origin);
        Ok(Self {
            effects,
            config,
            loader,
            inner: RefCell::new(SessionInner::default()),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    /// Identifier of the current session, if one has started since the last reset
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.borrow().session_id
    }

    /// Snapshot of held handles
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.borrow();
        SessionSnapshot {
            state: inner.state,
            metadata: inner.metadata.clone(),
            resource_loaded: self.loader.is_loaded(),
            sdk_instance_alive: inner.instance.is_some(),
            bridge_armed: inner.bridge.as_ref().is_some_and(BridgeGuard::is_armed),
            awaiting_outcome: inner.pending.is_some(),
        }
    }

    /// Tear the session down and return to `Idle`
    ///
    /// Safe from any state, including while `initialize_checkout` is waiting;
    /// the waiting call then resolves with `CheckoutError::Superseded`.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        self.resetter().reset(&mut inner);
    }

    /// Run one checkout session to its terminal outcome
    ///
    /// An active or finished session is reset first.
    pub async fn initialize_checkout(&self, token: &SessionToken) -> Result<CheckoutOutcome> {
        let (epoch, session) = self.begin()?;
        info!(%session, "checkout session starting");

        let metadata = match decode(token) {
            Ok(metadata) => metadata,
            Err(e) => return self.fail(epoch, FailureStage::Decode, e),
        };
        {
            let mut inner = self.inner.borrow_mut();
            inner.metadata = Some(metadata.clone());
            inner.transition(SessionState::ResourceLoading)?;
        }

        match self.loader.load(&metadata).await {
            Ok(handle) => debug!(%session, location = handle.location(), "SDK resource ready"),
            Err(LoadError::Superseded { .. }) => return Err(CheckoutError::Superseded),
            Err(e) => {
                self.ensure_current(epoch)?;
                return self.fail(epoch, FailureStage::Load, e);
            }
        }
        self.advance(epoch, SessionState::SdkInitializing)?;

        let instance: Rc<dyn SdkInstance> = match self.effects.sdk.initialize(token).await {
            Ok(instance) => Rc::from(instance),
            Err(e) => {
                self.ensure_current(epoch)?;
                return self.fail(epoch, FailureStage::Initialize, e);
            }
        };
        if let Err(e) = self.ensure_current(epoch) {
            dispose_instance(instance.as_ref());
            return Err(e);
        }
        self.inner.borrow_mut().instance = Some(SdkInstanceHandle {
            instance: instance.clone(),
        });

        let unified = match instance.unified_payments(self.config.sdk.embedded).await {
            Ok(unified) => unified,
            Err(e) => {
                self.ensure_current(epoch)?;
                return self.fail(epoch, FailureStage::Initialize, e);
            }
        };
        self.ensure_current(epoch)?;

        let trigger = match unified
            .create_trigger(&self.config.sdk.entry_method, &self.config.sdk.targets)
            .await
        {
            Ok(trigger) => trigger,
            Err(e) => {
                self.ensure_current(epoch)?;
                return self.fail(epoch, FailureStage::Render, e);
            }
        };
        self.ensure_current(epoch)?;

        // Armed before `show` so a close posted during display is not missed
        let (cell, settled) = OutcomeCell::new();
        let bridge_cell = cell.clone();
        let bridge = SignalBridge::arm(
            self.effects.messages.clone(),
            self.config.signals.clone(),
            move |signal| {
                let outcome = CheckoutOutcome::Cancelled { signal };
                if !bridge_cell.settle(Settlement::Outcome(outcome)) {
                    debug!("close message after settlement ignored");
                }
            },
        );
        let bridge = match bridge {
            Ok(bridge) => bridge,
            Err(e) => return self.fail(epoch, FailureStage::Render, e),
        };
        {
            let mut inner = self.inner.borrow_mut();
            inner.bridge = Some(bridge);
            inner.pending = Some(cell.clone());
            inner.transition(SessionState::AwaitingUserInput)?;
        }
        info!(%session, method = %self.config.sdk.entry_method, "entry surface requested");

        let vocabulary = &self.config.signals;
        let promise_path = pin!(async {
            let outcome = match trigger.show().await {
                Ok(token) => CheckoutOutcome::Succeeded { token },
                Err(rejection) => match classify_rejection(&rejection, vocabulary) {
                    RejectionClass::Cancellation(signal) => CheckoutOutcome::Cancelled { signal },
                    RejectionClass::Failure(message) => {
                        CheckoutOutcome::failed(FailureStage::Payment, message)
                    }
                },
            };
            if !cell.settle(Settlement::Outcome(outcome)) {
                debug!("completion promise settled after outcome was decided");
            }
        });

        let settlement = match future::select(promise_path, settled).await {
            Either::Left(((), settled)) => settled.await,
            Either::Right((settled, _)) => settled,
        }
        .map_err(|_| CheckoutError::internal("outcome cell dropped without settlement"))?;

        match settlement {
            Settlement::Outcome(outcome) => self.finish(epoch, outcome),
            Settlement::Superseded => Err(CheckoutError::Superseded),
        }
    }

    fn resetter(&self) -> SessionResetter<'_> {
        SessionResetter::new(&self.effects, &self.config, &self.loader)
    }

    fn begin(&self) -> Result<(u64, SessionId)> {
        let mut inner = self.inner.borrow_mut();
        if inner.state != SessionState::Idle {
            info!(state = %inner.state, "resetting before re-initializing");
            self.resetter().reset(&mut inner);
        }
        inner.epoch = inner.epoch.wrapping_add(1);
        let session = SessionId::new();
        inner.session_id = Some(session);
        inner.transition(SessionState::Decoding)?;
        Ok((inner.epoch, session))
    }

    fn ensure_current(&self, epoch: u64) -> Result<()> {
        if self.inner.borrow().epoch == epoch {
            Ok(())
        } else {
            Err(CheckoutError::Superseded)
        }
    }

    fn advance(&self, epoch: u64, next: SessionState) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.epoch != epoch {
            return Err(CheckoutError::Superseded);
        }
        inner.transition(next)
    }

    fn fail(
        &self,
        epoch: u64,
        stage: FailureStage,
        error: impl fmt::Display,
    ) -> Result<CheckoutOutcome> {
        self.finish(epoch, CheckoutOutcome::failed(stage, error.to_string()))
    }

    fn finish(&self, epoch: u64, outcome: CheckoutOutcome) -> Result<CheckoutOutcome> {
        let mut inner = self.inner.borrow_mut();
        if inner.epoch != epoch {
            return Err(CheckoutError::Superseded);
        }

        let (terminal, release) = match outcome.kind() {
            OutcomeKind::Succeeded => (SessionState::Succeeded, self.config.cleanup.on_success),
            OutcomeKind::Cancelled => (SessionState::Cancelled, self.config.cleanup.on_cancel),
            OutcomeKind::Failed => (SessionState::Failed, self.config.cleanup.on_failure),
        };
        inner.transition(terminal)?;
        inner.pending = None;
        if let Some(bridge) = inner.bridge.take() {
            bridge.dispose();
        }
        // A token that never decoded left nothing behind to release
        let acquired = !matches!(
            outcome,
            CheckoutOutcome::Failed {
                stage: FailureStage::Decode,
                ..
            }
        );
        if release && acquired {
            self.resetter().release(&mut inner);
        }
        let session = inner.session_id;
        drop(inner);

        match &outcome {
            CheckoutOutcome::Succeeded { .. } => info!(?session, "checkout succeeded"),
            CheckoutOutcome::Cancelled { signal } => {
                info!(?session, ?signal, "checkout cancelled");
                self.request_navigation();
            }
            CheckoutOutcome::Failed { stage, message } => {
                warn!(?session, ?stage, %message, "checkout failed");
            }
        }
        Ok(outcome)
    }

    fn request_navigation(&self) {
        let Some(destination) = &self.config.navigation.cancel_destination else {
            return;
        };
        debug!(%destination, "navigating after cancellation");
        if let Err(e) = self.effects.navigation.navigate(destination) {
            warn!(%destination, error = %e, "navigation after cancellation failed");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if inner.state != SessionState::Idle {
            SessionResetter::new(&self.effects, &self.config, &self.loader).reset(inner);
        }
    }
}
