//! Fake resource host

use crate::runtime::wait_until;
use async_trait::async_trait;
use checkout_core::{LoadError, ResourceEffects, ResourceId, ResourceSpec, Result};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// How the fake host treats an attach request for a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachBehavior {
    /// Becomes ready immediately
    #[default]
    Ready,
    /// Served content does not match the digest
    IntegrityMismatch,
    /// The fetch fails
    NetworkFailure,
    /// Stays pending until `complete_pending` or `fail_pending`
    Manual,
}

#[derive(Default)]
struct HostState {
    next_id: u64,
    behaviors: HashMap<String, AttachBehavior>,
    alive: BTreeSet<ResourceId>,
    detached: Vec<ResourceId>,
    specs: Vec<ResourceSpec>,
    pending: Option<oneshot::Sender<bool>>,
}

/// In-memory stand-in for the page's script host
#[derive(Default)]
pub struct FakeResourceHost {
    state: RefCell<HostState>,
}

impl FakeResourceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the behavior for one location
    pub fn set_behavior(&self, location: &str, behavior: AttachBehavior) {
        self.state
            .borrow_mut()
            .behaviors
            .insert(location.to_string(), behavior);
    }

    /// Number of attached resources not yet removed
    pub fn alive_count(&self) -> usize {
        self.state.borrow().alive.len()
    }

    /// Ids removed through `detach`, in order
    pub fn detached(&self) -> Vec<ResourceId> {
        self.state.borrow().detached.clone()
    }

    /// Number of attach requests received
    pub fn attach_count(&self) -> usize {
        self.state.borrow().specs.len()
    }

    /// Most recent attach request
    pub fn last_spec(&self) -> Option<ResourceSpec> {
        self.state.borrow().specs.last().cloned()
    }

    /// Whether a `Manual` attach is waiting
    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Wait until a `Manual` attach is waiting
    pub async fn wait_for_pending(&self) {
        wait_until(|| self.has_pending()).await;
    }

    /// Let the waiting attach become ready
    pub fn complete_pending(&self) -> bool {
        self.settle_pending(true)
    }

    /// Let the waiting attach fail
    pub fn fail_pending(&self) -> bool {
        self.settle_pending(false)
    }

    fn settle_pending(&self, ready: bool) -> bool {
        let pending = self.state.borrow_mut().pending.take();
        pending.is_some_and(|sender| sender.send(ready).is_ok())
    }

    fn fail(&self, id: ResourceId, spec: &ResourceSpec, message: &str) -> LoadError {
        self.state.borrow_mut().alive.remove(&id);
        LoadError::LoadFailed {
            location: spec.location.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ResourceEffects for FakeResourceHost {
    async fn attach(&self, spec: &ResourceSpec) -> std::result::Result<ResourceId, LoadError> {
        let (id, behavior) = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = ResourceId::new(state.next_id);
            state.specs.push(spec.clone());
            state.alive.insert(id);
            let behavior = state
                .behaviors
                .get(&spec.location)
                .copied()
                .unwrap_or_default();
            (id, behavior)
        };

        match behavior {
            AttachBehavior::Ready => Ok(id),
            AttachBehavior::IntegrityMismatch => {
                Err(self.fail(id, spec, "integrity digest does not match content"))
            }
            AttachBehavior::NetworkFailure => Err(self.fail(id, spec, "network error")),
            AttachBehavior::Manual => {
                let (sender, receiver) = oneshot::channel();
                self.state.borrow_mut().pending = Some(sender);
                match receiver.await {
                    Ok(true) => Ok(id),
                    _ => Err(self.fail(id, spec, "load aborted")),
                }
            }
        }
    }

    fn detach(&self, id: ResourceId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.alive.remove(&id) {
            state.detached.push(id);
        }
        Ok(())
    }
}
