//! Checkout Testing Infrastructure
//!
//! Deterministic fakes for every effect trait in `checkout_core::effects`,
//! plus token fixtures. Each fake records what it was asked to do and exposes
//! controls to settle pending operations from the test body.
//!
//! # Usage
//!
//! ```rust,ignore
//! let harness = TestHarness::new();
//! let controller = SessionController::new(harness.effects(), harness.config()).unwrap();
//! let token = session_token(DEFAULT_LOCATION, DEFAULT_DIGEST);
//!
//! let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
//!     wait_until(|| harness.sdk.has_pending_show()).await;
//!     harness.sdk.resolve_show("tt-1");
//! });
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

pub mod harness;
pub mod messages;
pub mod navigation;
pub mod resources;
pub mod runtime;
pub mod sdk;
pub mod surface;
pub mod tokens;

pub use harness::*;
pub use messages::*;
pub use navigation::*;
pub use resources::*;
pub use runtime::*;
pub use sdk::*;
pub use surface::*;
pub use tokens::*;
