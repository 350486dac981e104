//! A single synthesized individual.

use std::collections::BTreeMap;

/// One member of a generated population.
///
/// Identifiers are 1-based and sequential within a run. Attributes are
/// filled in one dimension at a time, in dimension order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    id: u32,
    attributes: BTreeMap<String, String>,
}

impl Individual {
    /// An individual with no attributes yet.
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    /// The individual's identifier.
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// The value assigned for `dimension`, if any.
    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.attributes.get(dimension).map(String::as_str)
    }

    /// Assign `value` for `dimension`, returning the previous value.
    pub fn assign(&mut self, dimension: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes.insert(dimension.into(), value.into())
    }

    /// Number of dimensions assigned so far.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether no dimension is assigned yet.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// `(dimension, value)` pairs sorted by dimension name.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(d, v)| (d.as_str(), v.as_str()))
    }
}
