//! Builder registration, capability activation and resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::capability::{Capability, Implementations};
use super::handler::{CommandHandler, ConfigHandler, Handler, ProjectHandler, SettingHandler};
use super::Builder;
use crate::errors::BuilderError;
use crate::operation::{OperationResult, Properties};

/// Activation priority. Higher wins.
pub type Priority = i32;

/// Priority used when callers do not care.
pub const DEFAULT_PRIORITY: Priority = 1;

/// A capability claim on a registered builder.
#[derive(Clone)]
struct Activation {
    builder: Arc<dyn Builder>,
    priority: Priority,
}

/// Record of a claim replaced by a strictly higher priority activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supersession {
    pub capability: Capability,
    pub previous: String,
    pub previous_priority: Priority,
    pub current: String,
    pub current_priority: Priority,
}

// ---------------------------------------------------------------------------
// BuilderApi
// ---------------------------------------------------------------------------

/// Registry of builders and the capability activation table.
///
/// Registration and activation are start-up work done once, sequentially,
/// so the registry takes `&mut self` and holds no locks. The [`Api`]
/// snapshot it produces is `Send + Sync`.
#[derive(Default)]
pub struct BuilderApi {
    builders: Vec<Arc<dyn Builder>>,
    activations: BTreeMap<Capability, Activation>,
    superseded: Vec<Supersession>,
}

impl BuilderApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder. Names are unique.
    pub fn add_builder<B: Builder + 'static>(&mut self, builder: B) -> Result<(), BuilderError> {
        self.add_shared_builder(Arc::new(builder))
    }

    fn add_shared_builder(&mut self, builder: Arc<dyn Builder>) -> Result<(), BuilderError> {
        if self.builder(builder.name()).is_some() {
            return Err(BuilderError::DuplicateBuilderName {
                name: builder.name().to_string(),
            });
        }
        log::debug!(
            "Registered builder {} implementing [{}]",
            builder.name(),
            join(&builder.implementations())
        );
        self.builders.push(builder);
        Ok(())
    }

    /// Route each capability in `implementations` to the named builder.
    ///
    /// Per capability:
    /// - unclaimed: claimed at `priority`;
    /// - claimed at a strictly lower priority: replaced, and the previous
    ///   claim recorded in [`superseded`](Self::superseded);
    /// - claimed at an equal or higher priority: rejected with
    ///   `CapabilityAlreadyActivated`, the existing claim stays.
    ///
    /// A builder re-activating a capability it already holds is never in
    /// conflict with itself: a higher priority updates its claim, anything
    /// else leaves the claim as it is. Repeated capabilities count once.
    ///
    /// A capability the builder does not declare is rejected with
    /// `CapabilityNotSupported`. Rejections do not stop the remaining
    /// capabilities from being activated; all of them are in the result.
    pub fn activate_builder<I, C>(
        &mut self,
        name: &str,
        implementations: I,
        priority: Priority,
    ) -> OperationResult
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        let mut result = OperationResult::new();

        let builder = match self.builder(name) {
            Some(builder) => Arc::clone(builder),
            None => {
                result.add_error(BuilderError::BuilderNotFound {
                    name: name.to_string(),
                });
                return result;
            }
        };
        let declared = builder.implementations();
        let requested: Implementations = implementations.into_iter().collect();

        for capability in requested {
            if !declared.contains(&capability) {
                log::warn!("Builder {} cannot activate {}: not implemented", name, capability);
                result.add_error(BuilderError::CapabilityNotSupported {
                    builder: name.to_string(),
                    capability,
                });
                continue;
            }

            match self.activations.get(&capability) {
                // Re-activation by the holder only ever raises its priority.
                Some(current) if current.builder.name() == name => {
                    if priority > current.priority {
                        log::debug!(
                            "Capability {} on {} raised from priority {} to {}",
                            capability,
                            name,
                            current.priority,
                            priority
                        );
                        self.claim(capability, &builder, priority);
                    }
                }
                Some(current) if current.priority >= priority => {
                    log::warn!(
                        "Capability {} stays on {} (priority {}); {} at priority {} rejected",
                        capability,
                        current.builder.name(),
                        current.priority,
                        name,
                        priority
                    );
                    result.add_error(BuilderError::CapabilityAlreadyActivated {
                        capability,
                        current: current.builder.name().to_string(),
                        current_priority: current.priority,
                        requested: name.to_string(),
                        requested_priority: priority,
                    });
                }
                Some(current) => {
                    log::warn!(
                        "Capability {} moves from {} (priority {}) to {} (priority {})",
                        capability,
                        current.builder.name(),
                        current.priority,
                        name,
                        priority
                    );
                    self.superseded.push(Supersession {
                        capability: capability.clone(),
                        previous: current.builder.name().to_string(),
                        previous_priority: current.priority,
                        current: name.to_string(),
                        current_priority: priority,
                    });
                    self.claim(capability, &builder, priority);
                }
                None => {
                    log::debug!(
                        "Capability {} activated on {} at priority {}",
                        capability,
                        name,
                        priority
                    );
                    self.claim(capability, &builder, priority);
                }
            }
        }

        result
    }

    fn claim(&mut self, capability: Capability, builder: &Arc<dyn Builder>, priority: Priority) {
        self.activations.insert(
            capability,
            Activation {
                builder: Arc::clone(builder),
                priority,
            },
        );
    }

    /// The builder currently claiming `capability`.
    pub fn resolve(&self, capability: &Capability) -> Result<&Arc<dyn Builder>, BuilderError> {
        self.activations
            .get(capability)
            .map(|a| &a.builder)
            .ok_or_else(|| BuilderError::CapabilityUnresolved {
                capability: capability.clone(),
            })
    }

    /// Priority of the current claim on `capability`.
    pub fn priority(&self, capability: &Capability) -> Option<Priority> {
        self.activations.get(capability).map(|a| a.priority)
    }

    /// Capabilities from `required` that no builder claims yet.
    pub fn unclaimed<'a, I>(&self, required: I) -> Implementations
    where
        I: IntoIterator<Item = &'a Capability>,
    {
        required
            .into_iter()
            .filter(|c| !self.activations.contains_key(*c))
            .cloned()
            .collect()
    }

    pub fn builder(&self, name: &str) -> Option<&Arc<dyn Builder>> {
        self.builders.iter().find(|b| b.name() == name)
    }

    /// Registered builders in registration order.
    pub fn builders(&self) -> impl Iterator<Item = &Arc<dyn Builder>> {
        self.builders.iter()
    }

    /// Claims replaced by higher-priority activations, oldest first.
    pub fn superseded(&self) -> &[Supersession] {
        &self.superseded
    }

    /// Activated capabilities.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.activations.keys().cloned().collect()
    }

    /// Snapshot the activation table into a consumer-facing [`Api`].
    pub fn api(&self) -> Api {
        Api {
            routes: self
                .activations
                .iter()
                .map(|(capability, activation)| {
                    (capability.clone(), Arc::clone(&activation.builder))
                })
                .collect(),
        }
    }
}

impl fmt::Debug for BuilderApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let builders: Vec<&str> = self.builders.iter().map(|b| b.name()).collect();
        let activations: Vec<String> = self
            .activations
            .iter()
            .map(|(c, a)| format!("{}={}@{}", c, a.builder.name(), a.priority))
            .collect();
        f.debug_struct("BuilderApi")
            .field("builders", &builders)
            .field("activations", &activations)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Api
// ---------------------------------------------------------------------------

/// The composed API: one resolved builder per activated capability.
///
/// Handlers are built on demand. Nothing here can register builders or
/// change activations.
#[derive(Clone, Default)]
pub struct Api {
    routes: BTreeMap<Capability, Arc<dyn Builder>>,
}

impl Api {
    /// Active capability names, sorted.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.routes.keys().cloned().collect()
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.routes.contains_key(capability)
    }

    /// Name of the builder serving `capability`.
    pub fn builder_name(&self, capability: &Capability) -> Option<&str> {
        self.routes.get(capability).map(|b| b.name())
    }

    /// Build the handler for `capability` with no extra options.
    pub fn build(&self, capability: impl Into<Capability>) -> Result<Handler, BuilderError> {
        self.build_with(capability, &Properties::new())
    }

    /// Build the handler for `capability`, passing `options` to the builder.
    ///
    /// An unclaimed capability is a wiring defect and fails immediately with
    /// `CapabilityUnresolved`.
    pub fn build_with(
        &self,
        capability: impl Into<Capability>,
        options: &Properties,
    ) -> Result<Handler, BuilderError> {
        let capability = capability.into();
        let builder = self
            .routes
            .get(&capability)
            .ok_or_else(|| BuilderError::CapabilityUnresolved {
                capability: capability.clone(),
            })?;
        log::debug!("Building {} handler via {}", capability, builder.name());
        builder.build(&capability, options)
    }

    pub fn config(&self) -> Result<Arc<dyn ConfigHandler>, BuilderError> {
        let handler = self.build(Capability::Config)?;
        handler
            .into_config()
            .ok_or_else(|| self.mismatch(Capability::Config))
    }

    pub fn setting(&self) -> Result<Arc<dyn SettingHandler>, BuilderError> {
        let handler = self.build(Capability::Setting)?;
        handler
            .into_setting()
            .ok_or_else(|| self.mismatch(Capability::Setting))
    }

    pub fn command(&self) -> Result<Arc<dyn CommandHandler>, BuilderError> {
        let handler = self.build(Capability::Command)?;
        handler
            .into_command()
            .ok_or_else(|| self.mismatch(Capability::Command))
    }

    pub fn project(&self) -> Result<Arc<dyn ProjectHandler>, BuilderError> {
        let handler = self.build(Capability::Project)?;
        handler
            .into_project()
            .ok_or_else(|| self.mismatch(Capability::Project))
    }

    // A builder answered with the wrong handler variant.
    fn mismatch(&self, capability: Capability) -> BuilderError {
        BuilderError::CapabilityNotSupported {
            builder: self.builder_name(&capability).unwrap_or_default().to_string(),
            capability,
        }
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .map(|(c, b)| format!("{}={}", c, b.name()))
            .collect();
        f.debug_struct("Api").field("routes", &routes).finish()
    }
}

fn join(implementations: &Implementations) -> String {
    implementations
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}
