//! Null builder: safe no-op handlers for every known capability.
//!
//! Activated for whatever the primary builders leave unclaimed, so every
//! required capability resolves even when no project exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::{
    Builder, Capability, CommandHandler, ConfigHandler, Handler, Implementations, ProjectHandler,
    SettingHandler,
};
use crate::errors::{BuilderError, HandlerError};
use crate::operation::command::CommandOperation;
use crate::operation::Properties;

pub const NULL_BUILDER_NAME: &str = "null";

#[derive(Debug, Default)]
pub struct NullBuilder {
    properties: Properties,
}

impl NullBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Builder for NullBuilder {
    fn name(&self) -> &str {
        NULL_BUILDER_NAME
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn implementations(&self) -> Implementations {
        Implementations::new(Capability::REQUIRED)
    }

    fn build(
        &self,
        capability: &Capability,
        _options: &Properties,
    ) -> Result<Handler, BuilderError> {
        self.ensure_supported(capability)?;
        let handler = match capability {
            Capability::Config => Handler::Config(Arc::new(NullConfigHandler)),
            Capability::Setting => Handler::Setting(Arc::new(NullSettingHandler)),
            Capability::Command => Handler::Command(Arc::new(NullCommandHandler)),
            Capability::Project => Handler::Project(Arc::new(NullProjectHandler)),
            Capability::Custom(_) => {
                return Err(BuilderError::CapabilityNotSupported {
                    builder: NULL_BUILDER_NAME.to_string(),
                    capability: capability.clone(),
                })
            }
        };
        Ok(handler)
    }
}

/// Config with no sources.
#[derive(Debug, Clone, Copy)]
pub struct NullConfigHandler;

impl ConfigHandler for NullConfigHandler {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, HandlerError> {
        Ok(None)
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Settings with no values.
#[derive(Debug, Clone, Copy)]
pub struct NullSettingHandler;

impl SettingHandler for NullSettingHandler {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Accepts every command and runs nothing.
#[derive(Debug, Clone, Copy)]
pub struct NullCommandHandler;

impl CommandHandler for NullCommandHandler {
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn exec(&self, operation: &CommandOperation) -> Result<(), HandlerError> {
        if let Some(context) = operation.context() {
            context.check()?;
        }
        log::debug!(
            "null command handler skipped {}",
            operation.key().unwrap_or("<no key>")
        );
        Ok(())
    }
}

/// No project; creation is not possible.
#[derive(Debug, Clone, Copy)]
pub struct NullProjectHandler;

impl ProjectHandler for NullProjectHandler {
    fn exists(&self) -> bool {
        false
    }

    fn root(&self) -> Option<PathBuf> {
        None
    }

    fn init(&self, path: &Path) -> Result<PathBuf, HandlerError> {
        Err(HandlerError::Unsupported(format!(
            "null project handler cannot create a project at {}",
            path.display()
        )))
    }
}
