//! Base operations for compose-file orchestration.
//!
//! The orchestration client itself lives outside this crate. These types
//! only describe and validate the configuration a client needs: project
//! name, compose files, run context, output streams, and per-command
//! options. Up and down operations are built by aggregating the base
//! property sets rather than by nesting types.

use super::{
    configure, Operation, OperationResult, Properties, Property, PropertyKind, PropertyValue,
    SharedWriter,
};
use crate::context::RunContext;

pub const ORCHESTRATE_PROJECTNAME: &str = "orchestrate.projectname";
pub const ORCHESTRATE_COMPOSEFILES: &str = "orchestrate.composefiles";
pub const ORCHESTRATE_CONTEXT: &str = "orchestrate.context";
pub const ORCHESTRATE_OUTPUT: &str = "orchestrate.output";
pub const ORCHESTRATE_ERROR: &str = "orchestrate.error";
pub const ORCHESTRATE_ATTACH_FOLLOW: &str = "orchestrate.attach.follow";
pub const ORCHESTRATE_UP_OPTIONS: &str = "orchestrate.up.options";
pub const ORCHESTRATE_DOWN_OPTIONS: &str = "orchestrate.down.options";

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

pub fn projectname_property() -> Property {
    Property::new(
        ORCHESTRATE_PROJECTNAME,
        "Project name.",
        "The compose project name, used to prefix container names.",
        PropertyKind::String,
    )
}

pub fn composefiles_property() -> Property {
    Property::new(
        ORCHESTRATE_COMPOSEFILES,
        "Compose files.",
        "An ordered list of compose file paths which define the project.",
        PropertyKind::StringList,
    )
}

pub fn context_property() -> Property {
    Property::new(
        ORCHESTRATE_CONTEXT,
        "Orchestration context.",
        "A run context used to cancel orchestration calls.",
        PropertyKind::Context,
    )
}

pub fn output_property() -> Property {
    Property::new(
        ORCHESTRATE_OUTPUT,
        "Orchestration output writer.",
        "A writer which receives orchestration output.",
        PropertyKind::Writer,
    )
}

pub fn error_property() -> Property {
    Property::new(
        ORCHESTRATE_ERROR,
        "Orchestration error writer.",
        "A writer which receives orchestration error output.",
        PropertyKind::Writer,
    )
}

pub fn attach_follow_property() -> Property {
    Property::new(
        ORCHESTRATE_ATTACH_FOLLOW,
        "Follow output.",
        "Stay attached to service output after the operation starts them.",
        PropertyKind::Bool,
    )
}

pub fn up_options_property() -> Property {
    Property::new(
        ORCHESTRATE_UP_OPTIONS,
        "Up options.",
        "Flags passed to the orchestrator when bringing services up.",
        PropertyKind::StringList,
    )
}

pub fn down_options_property() -> Property {
    Property::new(
        ORCHESTRATE_DOWN_OPTIONS,
        "Down options.",
        "Flags passed to the orchestrator when taking services down.",
        PropertyKind::StringList,
    )
}

// ---------------------------------------------------------------------------
// Base operations
// ---------------------------------------------------------------------------

/// Project name, compose files, context and output streams.
#[derive(Debug, Clone)]
pub struct BaseOrchestrateOperation {
    properties: Properties,
}

impl BaseOrchestrateOperation {
    pub fn new() -> Self {
        Self {
            properties: Self::base_properties(),
        }
    }

    /// The property set shared by every orchestration operation.
    pub fn base_properties() -> Properties {
        Properties::new()
            .with(projectname_property())
            .with(composefiles_property())
            .with(context_property())
            .with(output_property())
            .with(error_property())
    }

    pub fn project_name(&self) -> Option<&str> {
        self.properties.get(ORCHESTRATE_PROJECTNAME).and_then(|p| p.as_str())
    }

    pub fn compose_files(&self) -> &[String] {
        self.properties
            .get(ORCHESTRATE_COMPOSEFILES)
            .and_then(|p| p.as_list())
            .unwrap_or(&[])
    }

    pub fn context(&self) -> Option<RunContext> {
        self.properties.get(ORCHESTRATE_CONTEXT).and_then(|p| p.context())
    }

    pub fn into_properties(self) -> Properties {
        self.properties
    }
}

impl Default for BaseOrchestrateOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for BaseOrchestrateOperation {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// Build the base orchestration operation and configure its five properties.
///
/// A missing property and a rejected value are separate errors; every step
/// runs regardless. Check [`OperationResult::success`] before using the
/// returned operation.
pub fn new_base_orchestrate_operation(
    project_name: impl Into<String>,
    compose_files: Vec<String>,
    context: RunContext,
    output: SharedWriter,
    error: SharedWriter,
) -> (BaseOrchestrateOperation, OperationResult) {
    let mut operation = BaseOrchestrateOperation::new();
    let result = configure(
        &mut operation,
        [
            (ORCHESTRATE_PROJECTNAME, PropertyValue::String(project_name.into())),
            (ORCHESTRATE_COMPOSEFILES, PropertyValue::StringList(compose_files)),
            (ORCHESTRATE_CONTEXT, PropertyValue::Context(context)),
            (ORCHESTRATE_OUTPUT, PropertyValue::Writer(output)),
            (ORCHESTRATE_ERROR, PropertyValue::Writer(error)),
        ],
    );
    (operation, result)
}

/// Whether to stay attached to service output.
#[derive(Debug, Clone)]
pub struct StayAttachedOperation {
    properties: Properties,
}

impl StayAttachedOperation {
    pub fn new() -> Self {
        Self {
            properties: Properties::new().with(attach_follow_property()),
        }
    }

    pub fn follow(&self) -> bool {
        self.properties
            .get(ORCHESTRATE_ATTACH_FOLLOW)
            .and_then(|p| p.as_bool())
            .unwrap_or(false)
    }
}

impl Default for StayAttachedOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for StayAttachedOperation {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// Bring services up: base properties, up options and attach-follow.
#[derive(Debug, Clone)]
pub struct OrchestrateUpOperation {
    properties: Properties,
}

impl OrchestrateUpOperation {
    /// Compose from an already configured base operation.
    pub fn from_base(base: BaseOrchestrateOperation) -> Self {
        let mut properties = base.into_properties();
        properties.add(up_options_property());
        properties.extend(StayAttachedOperation::new().properties);
        Self { properties }
    }

    pub fn options(&self) -> &[String] {
        self.properties
            .get(ORCHESTRATE_UP_OPTIONS)
            .and_then(|p| p.as_list())
            .unwrap_or(&[])
    }
}

impl Operation for OrchestrateUpOperation {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// Take services down: base properties and down options.
#[derive(Debug, Clone)]
pub struct OrchestrateDownOperation {
    properties: Properties,
}

impl OrchestrateDownOperation {
    pub fn from_base(base: BaseOrchestrateOperation) -> Self {
        let mut properties = base.into_properties();
        properties.add(down_options_property());
        Self { properties }
    }

    pub fn options(&self) -> &[String] {
        self.properties
            .get(ORCHESTRATE_DOWN_OPTIONS)
            .and_then(|p| p.as_list())
            .unwrap_or(&[])
    }
}

impl Operation for OrchestrateDownOperation {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, PropertyError};
    use crate::operation::shared_writer;

    fn configured_base() -> (BaseOrchestrateOperation, OperationResult) {
        new_base_orchestrate_operation(
            "shop",
            vec!["docker-compose.yml".to_string()],
            RunContext::new(),
            shared_writer(std::io::sink()),
            shared_writer(std::io::sink()),
        )
    }

    #[test]
    fn test_base_construction_succeeds() {
        let (base, result) = configured_base();
        assert!(result.success(), "{}", result);
        assert_eq!(base.project_name(), Some("shop"));
        assert_eq!(base.compose_files(), &["docker-compose.yml".to_string()]);
        assert!(base.context().is_some());
        assert_eq!(base.properties().len(), 5);
    }

    #[test]
    fn test_base_steps_accumulate_errors() {
        // Drop two properties so two of the five steps cannot find their id.
        let mut base = BaseOrchestrateOperation::new();
        let mut trimmed = Properties::new();
        for p in base.properties().iter() {
            if p.id() != ORCHESTRATE_CONTEXT && p.id() != ORCHESTRATE_ERROR {
                trimmed.add(p.clone());
            }
        }
        *base.properties_mut() = trimmed;

        let result = configure(
            &mut base,
            [
                (ORCHESTRATE_PROJECTNAME, PropertyValue::from("shop")),
                (ORCHESTRATE_COMPOSEFILES, PropertyValue::from("one-file.yml")),
                (ORCHESTRATE_CONTEXT, PropertyValue::Context(RunContext::new())),
                (ORCHESTRATE_OUTPUT, PropertyValue::Writer(shared_writer(std::io::sink()))),
                (ORCHESTRATE_ERROR, PropertyValue::Writer(shared_writer(std::io::sink()))),
            ],
        );
        assert!(!result.success());
        assert_eq!(result.errors().len(), 3);
        let not_found = result
            .errors()
            .iter()
            .filter(|e| matches!(e, Error::Property(PropertyError::NotFound { .. })))
            .count();
        assert_eq!(not_found, 2);
        // the operation is still handed back partially configured
        assert_eq!(base.project_name(), Some("shop"));
    }

    #[test]
    fn test_up_operation_aggregates_properties() {
        let (base, _) = configured_base();
        let mut up = OrchestrateUpOperation::from_base(base);
        assert_eq!(
            up.properties().ids(),
            vec![
                ORCHESTRATE_PROJECTNAME,
                ORCHESTRATE_COMPOSEFILES,
                ORCHESTRATE_CONTEXT,
                ORCHESTRATE_OUTPUT,
                ORCHESTRATE_ERROR,
                ORCHESTRATE_UP_OPTIONS,
                ORCHESTRATE_ATTACH_FOLLOW,
            ]
        );
        // base values survive composition
        assert_eq!(
            up.properties().get(ORCHESTRATE_PROJECTNAME).unwrap().as_str(),
            Some("shop")
        );
        up.properties_mut()
            .set(ORCHESTRATE_UP_OPTIONS, vec!["--build".to_string()])
            .unwrap();
        assert_eq!(up.options(), &["--build".to_string()]);
    }

    #[test]
    fn test_down_and_stay_attached() {
        let down = OrchestrateDownOperation::from_base(BaseOrchestrateOperation::new());
        assert!(down.properties().contains(ORCHESTRATE_DOWN_OPTIONS));
        assert!(!down.properties().contains(ORCHESTRATE_UP_OPTIONS));
        assert!(down.options().is_empty());

        let mut attached = StayAttachedOperation::new();
        assert!(!attached.follow());
        attached
            .properties_mut()
            .set(ORCHESTRATE_ATTACH_FOLLOW, true)
            .unwrap();
        assert!(attached.follow());
    }
}
