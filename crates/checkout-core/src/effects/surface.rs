//! Render surface effect interface
//!
//! The vendor SDK renders into the surfaces itself; the session only needs to
//! wipe them when tearing down.

use crate::errors::Result;

/// Housekeeping on render surfaces
pub trait SurfaceEffects {
    /// Remove all content from the surface matching `selector`
    ///
    /// A selector matching nothing is not an error.
    fn clear(&self, selector: &str) -> Result<()>;
}
