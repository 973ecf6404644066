//! # Operations
//!
//! An operation is a unit of work that exposes its required configuration as
//! a [`Properties`] collection before it runs. Concrete operations are
//! composed by aggregating the property sets of smaller base operations.
//!
//! ## Configuration protocol
//!
//! Base constructors (e.g. [`orchestrate::new_base_orchestrate_operation`])
//! run every configuration step even after one fails. Each step looks up a
//! property by id and assigns it, recording any failure in a shared
//! [`OperationResult`]. The partially configured operation is returned
//! alongside the result so callers can inspect what went wrong.

pub mod command;
pub mod orchestrate;
pub mod properties;
pub mod property;
pub mod result;

pub use properties::Properties;
pub use property::{
    shared_reader, shared_writer, Property, PropertyKind, PropertyValue, SharedReader,
    SharedWriter,
};
pub use result::OperationResult;

/// A unit of work that exposes its configuration.
pub trait Operation {
    /// The operation's properties, built at construction.
    fn properties(&self) -> &Properties;

    fn properties_mut(&mut self) -> &mut Properties;
}

/// Apply configuration steps in order, recording every failure.
///
/// A missing id and a rejected value each add one error; remaining steps
/// still run.
pub fn configure<O, I>(operation: &mut O, steps: I) -> OperationResult
where
    O: Operation + ?Sized,
    I: IntoIterator<Item = (&'static str, PropertyValue)>,
{
    let mut result = OperationResult::new();
    let properties = operation.properties_mut();
    for (id, value) in steps {
        match properties.set(id, value) {
            Ok(()) => result.set(true, []),
            Err(e) => {
                log::warn!("Could not configure operation property: {}", e);
                result.add_error(e);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, PropertyError};

    struct Sample {
        properties: Properties,
    }

    impl Operation for Sample {
        fn properties(&self) -> &Properties {
            &self.properties
        }
        fn properties_mut(&mut self) -> &mut Properties {
            &mut self.properties
        }
    }

    fn sample() -> Sample {
        Sample {
            properties: Properties::new()
                .with(Property::new("p.name", "Name", "", PropertyKind::String))
                .with(Property::new("p.files", "Files", "", PropertyKind::StringList))
                .with(Property::new("p.follow", "Follow", "", PropertyKind::Bool)),
        }
    }

    #[test]
    fn test_configure_all_steps_succeed() {
        let mut op = sample();
        let result = configure(
            &mut op,
            [
                ("p.name", PropertyValue::from("web")),
                ("p.files", PropertyValue::from(vec!["a.yml".to_string()])),
                ("p.follow", PropertyValue::from(true)),
            ],
        );
        assert!(result.success());
        assert!(op.properties().iter().all(|p| p.is_set()));
    }

    #[test]
    fn test_configure_counts_each_failure_and_continues() {
        let mut op = sample();
        let result = configure(
            &mut op,
            [
                ("p.missing", PropertyValue::from("x")),
                ("p.name", PropertyValue::from("web")),
                ("p.files", PropertyValue::from("not-a-list")),
                ("p.follow", PropertyValue::from(false)),
            ],
        );
        assert!(!result.success());
        assert_eq!(result.errors().len(), 2);
        assert!(matches!(
            result.errors()[0],
            Error::Property(PropertyError::NotFound { .. })
        ));
        assert!(matches!(
            result.errors()[1],
            Error::Property(PropertyError::TypeMismatch { .. })
        ));
        // later steps still applied
        assert_eq!(op.properties().get("p.follow").unwrap().as_bool(), Some(false));
        assert!(!op.properties().get("p.files").unwrap().is_set());
    }

    #[test]
    fn test_configure_error_count_ignores_step_order() {
        let steps = vec![
            ("p.missing", PropertyValue::from("x")),
            ("p.name", PropertyValue::from("web")),
            ("p.files", PropertyValue::from("not-a-list")),
            ("p.follow", PropertyValue::from(false)),
            ("p.name", PropertyValue::from(true)),
        ];

        let mut orders = Vec::new();
        for shift in 0..steps.len() {
            let mut order = steps.clone();
            order.rotate_left(shift);
            orders.push(order);
        }
        let mut reversed = steps.clone();
        reversed.reverse();
        orders.push(reversed);

        for order in orders {
            let mut op = sample();
            let result = configure(&mut op, order);
            assert!(!result.success());
            assert_eq!(result.errors().len(), 3);
            assert_eq!(op.properties().get("p.name").unwrap().as_str(), Some("web"));
            assert_eq!(op.properties().get("p.follow").unwrap().as_bool(), Some(false));
        }
    }
}
