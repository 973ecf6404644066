//! Command operation properties.
//!
//! Every id below maps to exactly one property kind and one factory.

use super::{
    configure, Operation, OperationResult, Properties, Property, PropertyKind, PropertyValue,
    SharedReader, SharedWriter,
};
use crate::context::RunContext;

/// Key for a single command.
pub const COMMAND_KEY: &str = "command.key";
/// Ordered list of command keys.
pub const COMMAND_KEYS: &str = "command.keys";
/// Ordered string flags passed to the command.
pub const COMMAND_FLAGS: &str = "command.flags";
/// Stream receiving command output.
pub const COMMAND_OUTPUT: &str = "command.output";
/// Stream receiving command error output.
pub const COMMAND_ERR: &str = "command.err";
/// Stream providing command input.
pub const COMMAND_INPUT: &str = "command.input";
/// Context controlling command execution.
pub const COMMAND_CONTEXT: &str = "command.context";

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

pub fn key_property() -> Property {
    Property::new(COMMAND_KEY, "Command key.", "Command key.", PropertyKind::String)
}

pub fn keys_property() -> Property {
    Property::new(
        COMMAND_KEYS,
        "Command key list.",
        "Command key list.",
        PropertyKind::StringList,
    )
}

pub fn flags_property() -> Property {
    Property::new(
        COMMAND_FLAGS,
        "Command flags list.",
        "An ordered list of string flags to send to a command.",
        PropertyKind::StringList,
    )
}

pub fn output_property() -> Property {
    Property::new(
        COMMAND_OUTPUT,
        "Command output writer.",
        "A writer which receives the command execution output, typically stdout.",
        PropertyKind::Writer,
    )
}

pub fn err_property() -> Property {
    Property::new(
        COMMAND_ERR,
        "Command error writer.",
        "A writer which receives the command execution error output, typically stderr.",
        PropertyKind::Writer,
    )
}

pub fn input_property() -> Property {
    Property::new(
        COMMAND_INPUT,
        "Command input reader.",
        "A reader which provides command execution input, typically stdin.",
        PropertyKind::Reader,
    )
}

pub fn context_property() -> Property {
    Property::new(
        COMMAND_CONTEXT,
        "Command context limiter.",
        "A run context used to cancel command execution.",
        PropertyKind::Context,
    )
}

// ---------------------------------------------------------------------------
// CommandOperation
// ---------------------------------------------------------------------------

/// Execution of a single keyed command.
#[derive(Debug, Clone)]
pub struct CommandOperation {
    properties: Properties,
}

impl CommandOperation {
    /// An unconfigured command operation carrying every command property.
    pub fn new() -> Self {
        let properties = Properties::new()
            .with(key_property())
            .with(keys_property())
            .with(flags_property())
            .with(context_property())
            .with(input_property())
            .with(output_property())
            .with(err_property());
        Self { properties }
    }

    pub fn key(&self) -> Option<&str> {
        self.properties.get(COMMAND_KEY).and_then(|p| p.as_str())
    }

    pub fn flags(&self) -> &[String] {
        self.properties
            .get(COMMAND_FLAGS)
            .and_then(|p| p.as_list())
            .unwrap_or(&[])
    }

    pub fn context(&self) -> Option<RunContext> {
        self.properties.get(COMMAND_CONTEXT).and_then(|p| p.context())
    }

    pub fn input(&self) -> Option<SharedReader> {
        self.properties.get(COMMAND_INPUT).and_then(|p| p.reader())
    }

    pub fn output(&self) -> Option<SharedWriter> {
        self.properties.get(COMMAND_OUTPUT).and_then(|p| p.writer())
    }

    pub fn err(&self) -> Option<SharedWriter> {
        self.properties.get(COMMAND_ERR).and_then(|p| p.writer())
    }
}

impl Default for CommandOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for CommandOperation {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// Build a command operation and configure its key, flags, context and streams.
///
/// Every step runs; the returned result lists each one that failed.
pub fn new_command_operation(
    key: impl Into<String>,
    flags: Vec<String>,
    context: RunContext,
    input: SharedReader,
    output: SharedWriter,
    err: SharedWriter,
) -> (CommandOperation, OperationResult) {
    let mut operation = CommandOperation::new();
    let result = configure(
        &mut operation,
        [
            (COMMAND_KEY, PropertyValue::String(key.into())),
            (COMMAND_FLAGS, PropertyValue::StringList(flags)),
            (COMMAND_CONTEXT, PropertyValue::Context(context)),
            (COMMAND_INPUT, PropertyValue::Reader(input)),
            (COMMAND_OUTPUT, PropertyValue::Writer(output)),
            (COMMAND_ERR, PropertyValue::Writer(err)),
        ],
    );
    (operation, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{shared_reader, shared_writer};

    #[test]
    fn test_command_ids_map_to_kinds() {
        let op = CommandOperation::new();
        let kinds: Vec<(&str, PropertyKind)> =
            op.properties().iter().map(|p| (p.id(), p.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                (COMMAND_KEY, PropertyKind::String),
                (COMMAND_KEYS, PropertyKind::StringList),
                (COMMAND_FLAGS, PropertyKind::StringList),
                (COMMAND_CONTEXT, PropertyKind::Context),
                (COMMAND_INPUT, PropertyKind::Reader),
                (COMMAND_OUTPUT, PropertyKind::Writer),
                (COMMAND_ERR, PropertyKind::Writer),
            ]
        );
    }

    #[test]
    fn test_new_command_operation_configures_everything() {
        let ctx = RunContext::new();
        let (op, result) = new_command_operation(
            "shell",
            vec!["--rm".to_string()],
            ctx.clone(),
            shared_reader(std::io::empty()),
            shared_writer(std::io::sink()),
            shared_writer(std::io::sink()),
        );
        assert!(result.success(), "{}", result);
        assert_eq!(op.key(), Some("shell"));
        assert_eq!(op.flags(), &["--rm".to_string()]);
        assert!(op.context().unwrap().ptr_eq(&ctx));
        assert!(op.input().is_some());
        assert!(op.output().is_some());
        assert!(op.err().is_some());
    }

    #[test]
    fn test_unconfigured_operation_has_no_values() {
        let op = CommandOperation::default();
        assert!(op.key().is_none());
        assert!(op.flags().is_empty());
        assert!(op.context().is_none());
    }
}
