//! Activation tables loaded from YAML.
//!
//! ```yaml
//! activations:
//!   - builder: local
//!     capabilities: [config, setting, project]
//!     priority: 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::api::{BuilderApi, Priority, DEFAULT_PRIORITY};
use super::capability::Capability;
use crate::errors::Error;
use crate::operation::OperationResult;

/// One `activate_builder` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationEntry {
    pub builder: String,
    pub capabilities: Vec<Capability>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    DEFAULT_PRIORITY
}

/// An ordered list of activations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationConfig {
    #[serde(default)]
    pub activations: Vec<ActivationEntry>,
}

impl ActivationConfig {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Read and parse an activation file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ActivationConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| Error::ActivationConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Append an entry.
    pub fn with(
        mut self,
        builder: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
        priority: Priority,
    ) -> Self {
        self.activations.push(ActivationEntry {
            builder: builder.into(),
            capabilities: capabilities.into_iter().collect(),
            priority,
        });
        self
    }
}

impl BuilderApi {
    /// Apply every entry in order, aggregating all activation errors.
    pub fn apply_activations(&mut self, config: &ActivationConfig) -> OperationResult {
        let mut result = OperationResult::new();
        for entry in &config.activations {
            result.merge(self.activate_builder(
                &entry.builder,
                entry.capabilities.iter().cloned(),
                entry.priority,
            ));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, Handler, Implementations};
    use crate::errors::BuilderError;
    use crate::operation::Properties;

    struct Named(&'static str, Properties);

    impl Builder for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn properties(&self) -> &Properties {
            &self.1
        }
        fn implementations(&self) -> Implementations {
            Implementations::new(Capability::REQUIRED)
        }
        fn build(&self, capability: &Capability, _: &Properties) -> Result<Handler, BuilderError> {
            self.ensure_supported(capability)?;
            Err(BuilderError::CapabilityNotSupported {
                builder: self.0.to_string(),
                capability: capability.clone(),
            })
        }
    }

    #[test]
    fn test_parse_with_default_priority() {
        let config = ActivationConfig::from_yaml(
            "activations:\n\
             \x20 - builder: local\n\
             \x20   capabilities: [config, project]\n\
             \x20 - builder: \"null\"\n\
             \x20   capabilities: [command]\n\
             \x20   priority: 0\n",
        )
        .unwrap();
        assert_eq!(
            config,
            ActivationConfig::default()
                .with("local", [Capability::Config, Capability::Project], DEFAULT_PRIORITY)
                .with("null", [Capability::Command], 0)
        );
    }

    #[test]
    fn test_apply_aggregates_across_entries() {
        let mut registry = BuilderApi::new();
        registry.add_builder(Named("local", Properties::new())).unwrap();
        registry.add_builder(Named("null", Properties::new())).unwrap();

        let config = ActivationConfig::default()
            .with("local", [Capability::Config, Capability::Setting], 2)
            .with("null", [Capability::Config, Capability::Command], 1)
            .with("missing", [Capability::Project], 1);
        let result = registry.apply_activations(&config);

        assert!(!result.success());
        assert_eq!(result.errors().len(), 2);
        assert_eq!(registry.resolve(&Capability::Config).unwrap().name(), "local");
        assert_eq!(registry.resolve(&Capability::Command).unwrap().name(), "null");
    }

    #[test]
    fn test_load_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.yml");
        std::fs::write(&path, "activations: [not, a, table").unwrap();
        assert!(matches!(
            ActivationConfig::load(&path),
            Err(Error::ActivationConfig { .. })
        ));
        assert!(matches!(
            ActivationConfig::load(&dir.path().join("absent.yml")),
            Err(Error::ActivationConfig { .. })
        ));
    }
}
