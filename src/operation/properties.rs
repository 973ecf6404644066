//! Ordered, id-keyed collection of [`Property`] values.

use indexmap::map::{IndexMap, Values, ValuesMut};

use super::property::{Property, PropertyValue};
use crate::errors::PropertyError;

/// Properties keyed by id, enumerated in first-insertion order.
///
/// Adding a property whose id is already present replaces the earlier entry
/// in place: the new property takes the old one's position, and every other
/// entry keeps its order. There is no other duplicate policy.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: IndexMap<String, Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. Returns the replaced property, if any.
    pub fn add(&mut self, property: Property) -> Option<Property> {
        let id = property.id().to_string();
        self.entries.insert(id, property)
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, property: Property) -> Self {
        self.add(property);
        self
    }

    /// Merge another collection, applying the same replace-in-place policy
    /// to each of its entries.
    pub fn extend(&mut self, other: Properties) {
        for property in other.entries.into_values() {
            self.add(property);
        }
    }

    /// Exact-id lookup. A missing id is `None`, never a default property.
    pub fn get(&self, id: &str) -> Option<&Property> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Property> {
        self.entries.get_mut(id)
    }

    /// Typed lookup that reports a missing id as [`PropertyError::NotFound`].
    pub fn require(&self, id: &str) -> Result<&Property, PropertyError> {
        self.get(id).ok_or_else(|| PropertyError::NotFound { id: id.to_string() })
    }

    /// Look up `id` and assign `value` to it.
    ///
    /// Fails with `NotFound` when the id is absent and with `TypeMismatch`
    /// when the value kind is wrong; the collection is unchanged either way.
    pub fn set(&mut self, id: &str, value: impl Into<PropertyValue>) -> Result<(), PropertyError> {
        match self.entries.get_mut(id) {
            Some(property) => property.try_set(value),
            None => Err(PropertyError::NotFound { id: id.to_string() }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Ids in enumeration order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> Values<'_, String, Property> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> ValuesMut<'_, String, Property> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for property in iter {
            properties.add(property);
        }
        properties
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = Values<'a, String, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
