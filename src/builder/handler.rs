//! Handler contracts returned by [`Builder::build`](super::Builder::build).
//!
//! Each known capability has its own trait; [`Handler`] is the closed sum of
//! them so consumers match on what they receive instead of downcasting.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::capability::Capability;
use crate::errors::HandlerError;
use crate::operation::command::CommandOperation;

/// Read-only access to named configuration blobs.
pub trait ConfigHandler: Send + Sync {
    /// Raw bytes for `key`, or `None` if no source has it.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HandlerError>;

    /// Keys available across all sources.
    fn keys(&self) -> Vec<String>;
}

/// Flat string settings.
pub trait SettingHandler: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn keys(&self) -> Vec<String>;
}

/// Runs keyed commands.
pub trait CommandHandler: Send + Sync {
    /// Command keys this handler can run.
    fn keys(&self) -> Vec<String>;

    /// Run a configured command operation.
    ///
    /// Implementations must return [`HandlerError::Cancelled`] when the
    /// operation's context is cancelled before or during execution.
    fn exec(&self, operation: &CommandOperation) -> Result<(), HandlerError>;
}

/// Project discovery and creation.
pub trait ProjectHandler: Send + Sync {
    fn exists(&self) -> bool;

    fn root(&self) -> Option<PathBuf>;

    /// Create project configuration under `path`. Returns the created folder.
    fn init(&self, path: &Path) -> Result<PathBuf, HandlerError>;
}

/// A ready handler for one capability.
#[derive(Clone)]
pub enum Handler {
    Config(Arc<dyn ConfigHandler>),
    Setting(Arc<dyn SettingHandler>),
    Command(Arc<dyn CommandHandler>),
    Project(Arc<dyn ProjectHandler>),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Handler {
    /// Whether this variant is the one expected for `capability`.
    pub fn serves(&self, capability: &Capability) -> bool {
        matches!(
            (self, capability),
            (Self::Config(_), Capability::Config)
                | (Self::Setting(_), Capability::Setting)
                | (Self::Command(_), Capability::Command)
                | (Self::Project(_), Capability::Project)
                | (Self::Custom(_), Capability::Custom(_))
        )
    }

    pub fn into_config(self) -> Option<Arc<dyn ConfigHandler>> {
        match self {
            Self::Config(h) => Some(h),
            _ => None,
        }
    }

    pub fn into_setting(self) -> Option<Arc<dyn SettingHandler>> {
        match self {
            Self::Setting(h) => Some(h),
            _ => None,
        }
    }

    pub fn into_command(self) -> Option<Arc<dyn CommandHandler>> {
        match self {
            Self::Command(h) => Some(h),
            _ => None,
        }
    }

    pub fn into_project(self) -> Option<Arc<dyn ProjectHandler>> {
        match self {
            Self::Project(h) => Some(h),
            _ => None,
        }
    }

    /// Downcast a custom handler to its concrete type.
    pub fn downcast<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        match self {
            Self::Custom(h) => h.downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Config(_) => "Config",
            Self::Setting(_) => "Setting",
            Self::Command(_) => "Command",
            Self::Project(_) => "Project",
            Self::Custom(_) => "Custom",
        };
        write!(f, "Handler::{}(..)", variant)
    }
}
