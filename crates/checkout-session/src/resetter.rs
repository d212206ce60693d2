//! # Session Resetter
//!
//! The only teardown path. Works on whatever the session managed to create,
//! so it is safe after partial bring-up and safe to repeat.

use crate::controller::SessionInner;
use crate::loader::ResourceLoader;
use crate::outcome_cell::Settlement;
use checkout_core::{CheckoutConfig, SessionEffects, SessionState};
use tracing::{debug, warn};

/// Borrowed view over everything a teardown touches
pub(crate) struct SessionResetter<'a> {
    effects: &'a SessionEffects,
    config: &'a CheckoutConfig,
    loader: &'a ResourceLoader,
}

impl<'a> SessionResetter<'a> {
    pub(crate) fn new(
        effects: &'a SessionEffects,
        config: &'a CheckoutConfig,
        loader: &'a ResourceLoader,
    ) -> Self {
        Self {
            effects,
            config,
            loader,
        }
    }

    /// Release held resources without leaving the current state
    ///
    /// Order: signal bridge, SDK instance, SDK resource, render surfaces.
    pub(crate) fn release(&self, inner: &mut SessionInner) {
        if let Some(bridge) = inner.bridge.take() {
            bridge.dispose();
        }
        if let Some(instance) = inner.instance.take() {
            instance.dispose();
        }
        self.loader.unload();
        self.clear_surfaces();
    }

    /// Release everything and return to `Idle`
    pub(crate) fn reset(&self, inner: &mut SessionInner) {
        let from = inner.state;
        if let Some(pending) = inner.pending.take() {
            pending.settle(Settlement::Superseded);
        }
        self.release(inner);

        inner.metadata = None;
        inner.session_id = None;
        inner.state = SessionState::Idle;
        // Any call still suspended for the old session now sees itself superseded
        inner.epoch = inner.epoch.wrapping_add(1);
        debug!(%from, "session reset");
    }

    fn clear_surfaces(&self) {
        for (name, selector) in &self.config.sdk.targets {
            if let Err(e) = self.effects.surface.clear(selector) {
                warn!(surface = %name, %selector, error = %e, "failed to clear render surface");
            }
        }
    }
}
