//! The generated population and its tabular views.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::counters::CounterState;
use crate::individual::Individual;
use crate::order::DimensionOrder;

/// Name of the identifier column.
pub const ID_COLUMN: &str = "id";

/// A completed generation run: the roster plus the counters that produced it.
///
/// Only [`PopulationBuilder`](crate::PopulationBuilder) creates a
/// `Population`, and it assigns every dimension of the order to every
/// individual before the individual is kept. Each row therefore has a value
/// in every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    order: DimensionOrder,
    individuals: Vec<Individual>,
    counters: CounterState,
}

impl Population {
    pub(crate) const fn new(
        order: DimensionOrder,
        individuals: Vec<Individual>,
        counters: CounterState,
    ) -> Self {
        Self {
            order,
            individuals,
            counters,
        }
    }

    /// The dimension order used for the run, also the column order.
    pub const fn order(&self) -> &DimensionOrder {
        &self.order
    }

    /// Individuals in creation order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Final counter state of the run.
    pub const fn counters(&self) -> &CounterState {
        &self.counters
    }

    /// Number of individuals.
    pub const fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the roster is empty.
    pub const fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Column names: `id`, then dimensions in order.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(ID_COLUMN).chain(self.order.iter()).collect()
    }

    /// One row of cells per individual, matching [`header`](Self::header).
    ///
    /// Every dimension is assigned by construction. The empty-cell default
    /// only matters for an individual that is missing one, which the builder
    /// never produces.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.individuals.iter().map(|individual| {
            std::iter::once(individual.id().to_string())
                .chain(
                    self.order
                        .iter()
                        .map(|d| individual.get(d).unwrap_or_default().to_owned()),
                )
                .collect()
        })
    }

    /// Serializable records, keys in column order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.individuals.iter().map(|individual| Record {
            individual,
            order: &self.order,
        })
    }
}

/// An individual paired with the column order, serialized as a map.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    individual: &'a Individual,
    order: &'a DimensionOrder,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len().saturating_add(1)))?;
        map.serialize_entry(ID_COLUMN, &self.individual.id())?;
        for dimension in self.order.iter() {
            map.serialize_entry(dimension, self.individual.get(dimension).unwrap_or_default())?;
        }
        map.end()
    }
}
