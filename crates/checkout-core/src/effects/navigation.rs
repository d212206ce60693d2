//! Navigation effect interface to the external router

use crate::errors::Result;

/// Outbound navigation requests
pub trait NavigationEffects {
    /// Ask the router to move to `destination`
    fn navigate(&self, destination: &str) -> Result<()>;
}
