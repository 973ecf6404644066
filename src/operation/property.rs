//! A single named, typed configuration value.
//!
//! The set of value kinds is closed: every [`Property`] declares one
//! [`PropertyKind`] at construction and only ever accepts a
//! [`PropertyValue`] of that kind.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::context::RunContext;
use crate::errors::PropertyError;

// ---------------------------------------------------------------------------
// Stream handles
// ---------------------------------------------------------------------------

/// Shared input stream. Consumers lock and stream from it.
pub type SharedReader = Arc<Mutex<Box<dyn Read + Send>>>;

/// Shared output stream. Consumers lock and stream into it.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wrap a reader into a [`SharedReader`].
pub fn shared_reader(reader: impl Read + Send + 'static) -> SharedReader {
    Arc::new(Mutex::new(Box::new(reader)))
}

/// Wrap a writer into a [`SharedWriter`].
pub fn shared_writer(writer: impl Write + Send + 'static) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

// ---------------------------------------------------------------------------
// PropertyKind
// ---------------------------------------------------------------------------

/// The semantic kind a property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    String,
    StringList,
    Bool,
    Reader,
    Writer,
    Context,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringList => "string-list",
            Self::Bool => "bool",
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Context => "context",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// A value carried by a property, tagged with its kind.
#[derive(Clone)]
pub enum PropertyValue {
    String(String),
    StringList(Vec<String>),
    Bool(bool),
    Reader(SharedReader),
    Writer(SharedWriter),
    Context(RunContext),
}

impl PropertyValue {
    /// The kind this value satisfies.
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::String(_) => PropertyKind::String,
            Self::StringList(_) => PropertyKind::StringList,
            Self::Bool(_) => PropertyKind::Bool,
            Self::Reader(_) => PropertyKind::Reader,
            Self::Writer(_) => PropertyKind::Writer,
            Self::Context(_) => PropertyKind::Context,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::StringList(l) => f.debug_tuple("StringList").field(l).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Writer(_) => f.write_str("Writer(..)"),
            Self::Context(ctx) => f.debug_tuple("Context").field(ctx).finish(),
        }
    }
}

/// Streams and contexts compare by identity, plain values by content.
impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::StringList(a), Self::StringList(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Reader(a), Self::Reader(b)) => Arc::ptr_eq(a, b),
            (Self::Writer(a), Self::Writer(b)) => Arc::ptr_eq(a, b),
            (Self::Context(a), Self::Context(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

impl From<&[&str]> for PropertyValue {
    fn from(value: &[&str]) -> Self {
        Self::StringList(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<RunContext> for PropertyValue {
    fn from(value: RunContext) -> Self {
        Self::Context(value)
    }
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// A named, described, typed value slot.
///
/// The id never changes after construction. The slot starts empty and is
/// only written by a `set` whose value matches the declared kind.
#[derive(Debug, Clone)]
pub struct Property {
    id: String,
    label: String,
    description: String,
    kind: PropertyKind,
    value: Option<PropertyValue>,
}

impl Property {
    /// Create an unset property of the given kind.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        kind: PropertyKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            kind,
            value: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Whether a value has ever been assigned.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Assign a value, rejecting it without mutation if the kind differs.
    pub fn try_set(&mut self, value: impl Into<PropertyValue>) -> Result<(), PropertyError> {
        let value = value.into();
        let found = value.kind();
        if found != self.kind {
            return Err(PropertyError::TypeMismatch {
                id: self.id.clone(),
                expected: self.kind,
                found,
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// Boolean form of [`try_set`](Self::try_set).
    pub fn set(&mut self, value: impl Into<PropertyValue>) -> bool {
        match self.try_set(value) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }

    /// The current value, if one was set.
    pub fn get(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match &self.value {
            Some(PropertyValue::StringList(l)) => Some(l),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn reader(&self) -> Option<SharedReader> {
        match &self.value {
            Some(PropertyValue::Reader(r)) => Some(Arc::clone(r)),
            _ => None,
        }
    }

    pub fn writer(&self) -> Option<SharedWriter> {
        match &self.value {
            Some(PropertyValue::Writer(w)) => Some(Arc::clone(w)),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<RunContext> {
        match &self.value {
            Some(PropertyValue::Context(c)) => Some(c.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(kind: PropertyKind) -> Property {
        Property::new("test.prop", "Test.", "A test property.", kind)
    }

    #[test]
    fn test_new_property_is_unset() {
        let p = prop(PropertyKind::String);
        assert_eq!(p.id(), "test.prop");
        assert_eq!(p.label(), "Test.");
        assert_eq!(p.description(), "A test property.");
        assert!(!p.is_set());
        assert!(p.get().is_none());
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut s = prop(PropertyKind::String);
        assert!(s.set("web"));
        assert_eq!(s.get(), Some(&PropertyValue::String("web".to_string())));
        assert_eq!(s.as_str(), Some("web"));

        let mut l = prop(PropertyKind::StringList);
        let files = vec!["a.yml".to_string(), "b.yml".to_string()];
        assert!(l.set(files.clone()));
        assert_eq!(l.as_list(), Some(files.as_slice()));

        let mut b = prop(PropertyKind::Bool);
        assert!(b.set(true));
        assert_eq!(b.as_bool(), Some(true));
    }

    #[test]
    fn test_stream_and_context_values_keep_identity() {
        let writer = shared_writer(Vec::<u8>::new());
        let mut w = prop(PropertyKind::Writer);
        assert!(w.set(PropertyValue::Writer(Arc::clone(&writer))));
        assert!(Arc::ptr_eq(&w.writer().unwrap(), &writer));

        let reader = shared_reader(std::io::empty());
        let mut r = prop(PropertyKind::Reader);
        assert!(r.set(PropertyValue::Reader(Arc::clone(&reader))));
        assert_eq!(r.get(), Some(&PropertyValue::Reader(reader)));

        let ctx = RunContext::new();
        let mut c = prop(PropertyKind::Context);
        assert!(c.set(ctx.clone()));
        assert!(c.context().unwrap().ptr_eq(&ctx));
    }

    #[test]
    fn test_mismatched_kind_is_rejected_without_mutation() {
        let mut l = prop(PropertyKind::StringList);
        assert!(!l.set("single"));
        assert!(!l.is_set());

        assert!(l.set(vec!["one".to_string()]));
        let err = l.try_set(true).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                id: "test.prop".to_string(),
                expected: PropertyKind::StringList,
                found: PropertyKind::Bool,
            }
        );
        assert_eq!(l.as_list(), Some(&["one".to_string()][..]));

        let mut c = prop(PropertyKind::Context);
        assert!(!c.set("not a context"));
        assert!(c.context().is_none());
    }

    #[test]
    fn test_written_bytes_reach_the_shared_writer() {
        let sink = Arc::new(Mutex::new(Vec::<u8>::new()));

        struct Sink(Arc<Mutex<Vec<u8>>>);
        impl Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut w = prop(PropertyKind::Writer);
        assert!(w.set(PropertyValue::Writer(shared_writer(Sink(Arc::clone(&sink))))));
        let handle = w.writer().unwrap();
        handle.lock().write_all(b"up").unwrap();
        assert_eq!(sink.lock().as_slice(), b"up");
    }
}
