//! # Resource Loader
//!
//! Owns the single SDK resource slot.
//!
//! Invariants:
//! - At most one `LoadedResourceHandle` is held
//! - Every `load` retires the held handle before attaching
//! - A load that was superseded while waiting detaches what it attached

use checkout_core::{
    CrossOriginPolicy, LoadError, ResourceEffects, ResourceId, ResourceSpec, SdkMetadata,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

/// Ownership record for the attached SDK resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResourceHandle {
    location: String,
    id: ResourceId,
}

impl LoadedResourceHandle {
    /// Location the resource was loaded from
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Handler-issued id used for removal
    pub fn id(&self) -> ResourceId {
        self.id
    }
}

/// Single-flight loader for the SDK resource
pub struct ResourceLoader {
    resources: Rc<dyn ResourceEffects>,
    cross_origin: CrossOriginPolicy,
    slot: RefCell<Option<LoadedResourceHandle>>,
    generation: Cell<u64>,
}

impl ResourceLoader {
    /// Create a loader over a resource handler
    pub fn new(resources: Rc<dyn ResourceEffects>, cross_origin: CrossOriginPolicy) -> Self {
        Self {
            resources,
            cross_origin,
            slot: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Attach the resource described by `metadata` and wait until it is ready
    pub async fn load(&self, metadata: &SdkMetadata) -> Result<LoadedResourceHandle, LoadError> {
        self.unload();
        let ticket = self.bump();

        let spec = ResourceSpec {
            location: metadata.resource_location().to_string(),
            integrity: metadata.integrity_digest().to_string(),
            cross_origin: self.cross_origin,
        };
        debug!(location = %spec.location, "attaching SDK resource");
        let id = self.resources.attach(&spec).await?;

        if self.generation.get() != ticket {
            debug!(location = %spec.location, %id, "load superseded, detaching");
            if let Err(e) = self.resources.detach(id) {
                warn!(%id, error = %e, "failed to detach superseded resource");
            }
            return Err(LoadError::Superseded {
                location: spec.location,
            });
        }

        let handle = LoadedResourceHandle {
            location: spec.location,
            id,
        };
        *self.slot.borrow_mut() = Some(handle.clone());
        Ok(handle)
    }

    /// Detach the held resource, if any
    ///
    /// Also retires any load still in flight. Returns `true` when a handle
    /// was released.
    pub fn unload(&self) -> bool {
        self.bump();
        let Some(handle) = self.slot.borrow_mut().take() else {
            return false;
        };
        debug!(location = %handle.location, id = %handle.id, "detaching SDK resource");
        if let Err(e) = self.resources.detach(handle.id) {
            warn!(id = %handle.id, error = %e, "failed to detach SDK resource");
        }
        true
    }

    /// Currently held handle
    pub fn handle(&self) -> Option<LoadedResourceHandle> {
        self.slot.borrow().clone()
    }

    /// Whether a resource is held
    pub fn is_loaded(&self) -> bool {
        self.slot.borrow().is_some()
    }

    fn bump(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_testkit::{AttachBehavior, FakeResourceHost};
    use futures::executor::block_on;

    fn metadata(location: &str) -> SdkMetadata {
        SdkMetadata::new(location, "sha256-digest").unwrap()
    }

    #[test]
    fn test_load_holds_one_handle() {
        let host = Rc::new(FakeResourceHost::new());
        let loader = ResourceLoader::new(host.clone(), CrossOriginPolicy::Anonymous);

        let first = block_on(loader.load(&metadata("https://sdk.test/a.js"))).unwrap();
        assert_eq!(host.alive_count(), 1);

        let second = block_on(loader.load(&metadata("https://sdk.test/b.js"))).unwrap();
        assert_eq!(host.alive_count(), 1);
        assert_ne!(first.id(), second.id());
        assert_eq!(loader.handle(), Some(second));
        assert_eq!(host.detached(), vec![first.id()]);
    }

    #[test]
    fn test_attach_passes_integrity_and_policy() {
        let host = Rc::new(FakeResourceHost::new());
        let loader = ResourceLoader::new(host.clone(), CrossOriginPolicy::UseCredentials);
        block_on(loader.load(&metadata("https://sdk.test/a.js"))).unwrap();

        let spec = host.last_spec().unwrap();
        assert_eq!(spec.integrity, "sha256-digest");
        assert_eq!(spec.cross_origin, CrossOriginPolicy::UseCredentials);
    }

    #[test]
    fn test_failed_load_leaves_nothing_behind() {
        let host = Rc::new(FakeResourceHost::new());
        host.set_behavior("https://sdk.test/bad.js", AttachBehavior::IntegrityMismatch);
        let loader = ResourceLoader::new(host.clone(), CrossOriginPolicy::Anonymous);

        let err = block_on(loader.load(&metadata("https://sdk.test/bad.js"))).unwrap_err();
        assert!(matches!(err, LoadError::LoadFailed { .. }));
        assert!(!loader.is_loaded());
        assert_eq!(host.alive_count(), 0);
    }

    #[test]
    fn test_unload_is_idempotent() {
        let host = Rc::new(FakeResourceHost::new());
        let loader = ResourceLoader::new(host.clone(), CrossOriginPolicy::Anonymous);
        assert!(!loader.unload());

        block_on(loader.load(&metadata("https://sdk.test/a.js"))).unwrap();
        assert!(loader.unload());
        assert!(!loader.unload());
        assert_eq!(host.alive_count(), 0);
        assert_eq!(host.detached().len(), 1);
    }

    #[test]
    fn test_unload_during_attach_supersedes_load() {
        let host = Rc::new(FakeResourceHost::new());
        host.set_behavior("https://sdk.test/slow.js", AttachBehavior::Manual);
        let loader = ResourceLoader::new(host.clone(), CrossOriginPolicy::Anonymous);

        let slow = metadata("https://sdk.test/slow.js");
        let result = block_on(async {
            let load = loader.load(&slow);
            let drive = async {
                host.wait_for_pending().await;
                loader.unload();
                host.complete_pending();
            };
            futures::join!(load, drive).0
        });

        assert!(matches!(result, Err(LoadError::Superseded { .. })));
        assert!(!loader.is_loaded());
        assert_eq!(host.alive_count(), 0);
    }
}
