//! # Kraut
//!
//! Assembles a working API out of independently implemented handler
//! builders, chosen at runtime from discovered environment facts.
//!
//! Two layers do the work:
//!
//! - [`operation`]: typed, self-describing properties that operations use to
//!   receive and validate their inputs, plus the [`OperationResult`]
//!   aggregate used to report multi-step configuration failures.
//! - [`builder`]: the capability registry. Builders declare the capabilities
//!   they can satisfy; [`BuilderApi`] activates them with explicit priority
//!   and resolves exactly one builder per capability into an [`Api`].
//!
//! [`local`] wires both together for a user's working directory, falling
//! back to no-op handlers where no provider is available.

pub mod builder;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod local;
pub mod operation;

pub use builder::{Api, Builder, BuilderApi, Capability, Handler, Implementations};
pub use context::RunContext;
pub use errors::{BuilderError, Error, HandlerError, PropertyError};
pub use local::{make_default_local_api, make_local_api, LocalSettings};
pub use operation::{Operation, OperationResult, Properties, Property, PropertyKind, PropertyValue};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
