//! # Builder API
//!
//! Independently developed providers ("builders") declare which named
//! capabilities they can satisfy. A [`BuilderApi`] registry activates
//! capabilities on specific builders with an explicit priority and resolves
//! exactly one builder per capability. The resulting [`Api`] is the only
//! surface handed to the rest of the process.
//!
//! ## Flow
//!
//! ```text
//! add_builder(local)  add_builder(null)
//!          │                 │
//!          ▼                 ▼
//! activate_builder("local", [config, project], 1)
//! activate_builder("null",  unclaimed(REQUIRED), 0)
//!          │
//!          ▼   (resolution is eager: who may serve)
//!        api()
//!          │
//!          ▼   (construction is lazy: what serves)
//! api.build("config") → Handler::Config(..)
//! ```

pub mod activation;
pub mod api;
pub mod capability;
pub mod handler;

pub use activation::{ActivationConfig, ActivationEntry};
pub use api::{Api, BuilderApi, Priority, Supersession, DEFAULT_PRIORITY};
pub use capability::{Capability, Implementations};
pub use handler::{CommandHandler, ConfigHandler, Handler, ProjectHandler, SettingHandler};

use crate::errors::BuilderError;
use crate::operation::Properties;

/// A named provider of capability handlers.
///
/// Builders must not depend on activation order, and `build` may be called
/// any number of times for the same capability.
pub trait Builder: Send + Sync {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    /// Builder-level configuration.
    fn properties(&self) -> &Properties;

    /// Capabilities this builder can build handlers for.
    fn implementations(&self) -> Implementations;

    /// Build a handler for `capability`.
    ///
    /// Fails with [`BuilderError::CapabilityNotSupported`] when the
    /// capability is not in [`implementations`](Self::implementations).
    fn build(&self, capability: &Capability, options: &Properties) -> Result<Handler, BuilderError>;

    /// Shared guard for `build` implementations.
    fn ensure_supported(&self, capability: &Capability) -> Result<(), BuilderError> {
        if self.implementations().contains(capability) {
            Ok(())
        } else {
            Err(BuilderError::CapabilityNotSupported {
                builder: self.name().to_string(),
                capability: capability.clone(),
            })
        }
    }
}
