//! Target distributions per demographic dimension.
//!
//! An estimate document maps each dimension name to its values, and each
//! value to either a plain target fraction or a conditional target keyed by
//! another dimension:
//!
//! ```json
//! {
//!   "age_group": { "young": 0.6, "old": 0.4 },
//!   "has_pet": {
//!     "yes": { "age_group": { "young": 0.8, "": 0.2 } },
//!     "no":  { "age_group": { "young": 0.2, "": 0.8 } }
//!   }
//! }
//! ```
//!
//! Declaration order of dimensions and values is significant: it seeds the
//! dimension order and drives the allocator's scan and tie-break. Documents
//! are read through an order-preserving visitor so JSON and YAML sources
//! behave the same.
//!
//! Fractions are not normalized. Values outside `[0, 1]`, or unconditional
//! fractions that do not sum to one, are accepted and logged at `warn`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use tracing::{info, warn};

use crate::error::EstimateError;

/// Key of the fallback entry in a conditional target.
pub const FALLBACK_KEY: &str = "";

/// Allowed distance from 1.0 before a fraction sum is reported.
const SUM_TOLERANCE: f64 = 1e-6;

// -----------------------------------------------------------------------
// Targets
// -----------------------------------------------------------------------

/// The desired long-run fraction for one value of a dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueTarget {
    /// The same fraction for every individual.
    Fixed(f64),
    /// A fraction that depends on another dimension's value.
    Conditional(ConditionalTarget),
}

impl ValueTarget {
    /// The dimension this target depends on, if any.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Self::Fixed(_) => None,
            Self::Conditional(conditional) => Some(conditional.dependency()),
        }
    }
}

/// Per-dependency-value fractions, with an optional fallback entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalTarget {
    dependency: String,
    fractions: BTreeMap<String, f64>,
}

impl ConditionalTarget {
    /// Create a conditional target on `dependency`.
    ///
    /// The entry keyed by [`FALLBACK_KEY`] is used for dependency values
    /// without an explicit entry.
    pub fn new<I, K>(dependency: impl Into<String>, fractions: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            dependency: dependency.into(),
            fractions: fractions
                .into_iter()
                .map(|(key, fraction)| (key.into(), fraction))
                .collect(),
        }
    }

    /// The dimension this target is conditioned on.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Look up the fraction for a dependency value, falling back to the
    /// empty-string entry.
    pub fn fraction_for(&self, dependency_value: &str) -> Option<f64> {
        self.fractions
            .get(dependency_value)
            .or_else(|| self.fractions.get(FALLBACK_KEY))
            .copied()
    }

    /// Whether a fallback entry is configured.
    pub fn has_fallback(&self) -> bool {
        self.fractions.contains_key(FALLBACK_KEY)
    }

    /// All explicit entries, including the fallback.
    pub fn fractions(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fractions.iter().map(|(key, f)| (key.as_str(), *f))
    }
}

// -----------------------------------------------------------------------
// Dimensions
// -----------------------------------------------------------------------

/// One value of a dimension together with its target.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionValue {
    name: String,
    target: ValueTarget,
}

impl DimensionValue {
    /// A value with an unconditional target fraction.
    pub fn fixed(name: impl Into<String>, fraction: f64) -> Self {
        Self {
            name: name.into(),
            target: ValueTarget::Fixed(fraction),
        }
    }

    /// A value whose fraction depends on `dependency`.
    pub fn conditional<I, K>(name: impl Into<String>, dependency: impl Into<String>, fractions: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            target: ValueTarget::Conditional(ConditionalTarget::new(dependency, fractions)),
        }
    }

    /// The value name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value's target.
    pub const fn target(&self) -> &ValueTarget {
        &self.target
    }
}

/// A named demographic axis and its values in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    name: String,
    values: Vec<DimensionValue>,
    dependency: Option<String>,
}

impl Dimension {
    /// Build a dimension, checking it is non-empty, has unique value names,
    /// finite fractions, and at most one dependency.
    pub fn new(name: impl Into<String>, values: Vec<DimensionValue>) -> Result<Self, EstimateError> {
        let name = name.into();
        if values.is_empty() {
            return Err(EstimateError::EmptyDimension { dimension: name });
        }

        let mut seen = BTreeSet::new();
        let mut dependency: Option<String> = None;
        for value in &values {
            if !seen.insert(value.name()) {
                return Err(EstimateError::DuplicateValue {
                    dimension: name,
                    value: value.name.clone(),
                });
            }

            let finite = match value.target() {
                ValueTarget::Fixed(fraction) => fraction.is_finite(),
                ValueTarget::Conditional(conditional) => {
                    conditional.fractions().all(|(_, fraction)| fraction.is_finite())
                }
            };
            if !finite {
                return Err(EstimateError::NonFiniteFraction {
                    dimension: name,
                    value: value.name.clone(),
                });
            }

            if let Some(found) = value.target().dependency() {
                if let Some(first) = dependency.as_deref().filter(|first| *first != found) {
                    return Err(EstimateError::MultipleDependencies {
                        dimension: name,
                        first: first.to_owned(),
                        second: found.to_owned(),
                    });
                }
                dependency.get_or_insert_with(|| found.to_owned());
            }
        }

        Ok(Self {
            name,
            values,
            dependency,
        })
    }

    /// The dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[DimensionValue] {
        &self.values
    }

    /// Value names in declaration order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(DimensionValue::name)
    }

    /// The single dimension this one is conditioned on, if any.
    pub fn dependency(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    /// The unconditional target for `value`, if it has one.
    pub fn fixed_target(&self, value: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.name == value)
            .and_then(|v| match v.target {
                ValueTarget::Fixed(fraction) => Some(fraction),
                ValueTarget::Conditional(_) => None,
            })
    }
}

// -----------------------------------------------------------------------
// Estimate table
// -----------------------------------------------------------------------

/// All dimensions of a population, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateTable {
    dimensions: Vec<Dimension>,
}

impl EstimateTable {
    /// Build a table from dimensions, rejecting duplicate names and
    /// dependencies on unknown dimensions.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, EstimateError> {
        let mut names = BTreeSet::new();
        for dimension in &dimensions {
            if !names.insert(dimension.name()) {
                return Err(EstimateError::DuplicateDimension {
                    dimension: dimension.name.clone(),
                });
            }
        }

        for dimension in &dimensions {
            if let Some(dependency) = dimension.dependency()
                && !names.contains(dependency)
            {
                return Err(EstimateError::UnknownDependency {
                    dimension: dimension.name.clone(),
                    dependency: dependency.to_owned(),
                });
            }
        }

        let table = Self { dimensions };
        table.warn_on_unusual_fractions();
        Ok(table)
    }

    /// Load a table from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Io`] if the file cannot be read,
    /// [`EstimateError::UnsupportedFormat`] for other extensions, and a
    /// parse or validation error if the content is malformed.
    pub fn from_file(path: &Path) -> Result<Self, EstimateError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let contents = std::fs::read_to_string(path).map_err(|source| EstimateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = match extension.as_deref() {
            Some("json") => Self::from_json_str(&contents)?,
            Some("yaml" | "yml") => Self::from_yaml_str(&contents)?,
            _ => {
                return Err(EstimateError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        info!(
            path = %path.display(),
            dimensions = table.len(),
            conditional = table.dimensions.iter().filter(|d| d.dependency().is_some()).count(),
            "Estimate table loaded"
        );
        Ok(table)
    }

    /// Parse a table from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, EstimateError> {
        let raw: RawEstimates = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse a table from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EstimateError> {
        let raw: RawEstimates = serde_yml::from_str(yaml)?;
        Self::from_raw(raw)
    }

    /// Dimensions in declaration order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimension names in declaration order.
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(Dimension::name)
    }

    /// Look up a dimension by name.
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Number of dimensions.
    pub const fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether the table has no dimensions.
    pub const fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    fn from_raw(raw: RawEstimates) -> Result<Self, EstimateError> {
        let mut dimensions = Vec::with_capacity(raw.0.len());
        for (dimension_name, raw_values) in raw.0 {
            let mut values = Vec::with_capacity(raw_values.0.len());
            for (value_name, raw_target) in raw_values.0 {
                let value = match raw_target {
                    RawTarget::Fraction(fraction) => DimensionValue::fixed(value_name, fraction),
                    RawTarget::Conditional(nested) => {
                        conditional_value(&dimension_name, value_name, nested)?
                    }
                };
                values.push(value);
            }
            dimensions.push(Dimension::new(dimension_name, values)?);
        }
        Self::new(dimensions)
    }

    fn warn_on_unusual_fractions(&self) {
        for dimension in &self.dimensions {
            let mut sum = 0.0_f64;
            let mut all_fixed = true;
            for value in dimension.values() {
                match value.target() {
                    ValueTarget::Fixed(fraction) => {
                        if !(0.0..=1.0).contains(fraction) {
                            warn!(
                                dimension = dimension.name(),
                                value = value.name(),
                                fraction,
                                "Target fraction outside [0, 1]"
                            );
                        }
                        sum += fraction;
                    }
                    ValueTarget::Conditional(conditional) => {
                        all_fixed = false;
                        for (key, fraction) in conditional.fractions() {
                            if !(0.0..=1.0).contains(&fraction) {
                                warn!(
                                    dimension = dimension.name(),
                                    value = value.name(),
                                    dependency_value = key,
                                    fraction,
                                    "Conditional target fraction outside [0, 1]"
                                );
                            }
                        }
                    }
                }
            }
            if all_fixed && (sum - 1.0).abs() > SUM_TOLERANCE {
                warn!(
                    dimension = dimension.name(),
                    sum,
                    "Target fractions do not sum to 1"
                );
            }
        }
    }
}

/// Turn a `{dependency: {dependency_value: fraction}}` mapping into a value.
fn conditional_value(
    dimension: &str,
    value_name: String,
    nested: Ordered<Ordered<f64>>,
) -> Result<DimensionValue, EstimateError> {
    let keys = nested.0.len();
    let mut entries = nested.0.into_iter();
    let (Some((dependency, fractions)), None) = (entries.next(), entries.next()) else {
        return Err(EstimateError::MalformedConditional {
            dimension: dimension.to_owned(),
            value: value_name,
            keys,
        });
    };

    let mut seen = BTreeSet::new();
    for (key, _) in &fractions.0 {
        if !seen.insert(key.as_str()) {
            return Err(EstimateError::DuplicateDependencyValue {
                dimension: dimension.to_owned(),
                value: value_name,
                key: key.clone(),
            });
        }
    }

    Ok(DimensionValue::conditional(value_name, dependency, fractions.0))
}

// -----------------------------------------------------------------------
// Raw document shape
// -----------------------------------------------------------------------

type RawEstimates = Ordered<Ordered<RawTarget>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Fraction(f64),
    Conditional(Ordered<Ordered<f64>>),
}

/// A string-keyed mapping that keeps entries in document order.
struct Ordered<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a mapping with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
