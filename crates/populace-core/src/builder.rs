//! Population builder: the per-individual generation loop.
//!
//! The builder owns the [`CounterState`] for one run and the fixed
//! [`DimensionOrder`]. Each call to [`PopulationBuilder::next_individual`]
//! walks the order, asks the allocator for a value per dimension, and writes
//! it onto the individual. Each allocation reads only its own dimension's
//! counter, so the counters are updated once, after the whole individual is
//! allocated. Every step takes `&mut self`, so individuals are strictly
//! sequential.

use tracing::{debug, info};

use crate::allocator::allocate;
use crate::counters::CounterState;
use crate::error::GenerationError;
use crate::estimates::EstimateTable;
use crate::individual::Individual;
use crate::order::{DimensionOrder, OrderStrategy};
use crate::roster::Population;

/// Drives generation of a population from an estimate table.
#[derive(Debug)]
pub struct PopulationBuilder<'t> {
    table: &'t EstimateTable,
    order: DimensionOrder,
    counters: CounterState,
    next_id: u32,
}

impl<'t> PopulationBuilder<'t> {
    /// Resolve the dimension order and zero the counters.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Order`] if the dependencies cannot be
    /// ordered (for example, a cycle).
    pub fn new(table: &'t EstimateTable, strategy: OrderStrategy) -> Result<Self, GenerationError> {
        let order = DimensionOrder::resolve(table, strategy)?;
        info!(
            %strategy,
            order = ?order.as_slice(),
            "Dimension order resolved"
        );
        Ok(Self {
            table,
            order,
            counters: CounterState::from_table(table),
            next_id: 1,
        })
    }

    /// The resolved dimension order.
    pub const fn order(&self) -> &DimensionOrder {
        &self.order
    }

    /// Counters accumulated so far.
    pub const fn counters(&self) -> &CounterState {
        &self.counters
    }

    /// Number of individuals generated since creation or the last reset.
    pub const fn generated(&self) -> u32 {
        self.next_id.saturating_sub(1)
    }

    /// Generate the next individual and record its values.
    ///
    /// Every dimension is allocated before any counter is touched, so a
    /// failed individual leaves the counters and the next id unchanged.
    pub fn next_individual(&mut self) -> Result<Individual, GenerationError> {
        let id = self.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| GenerationError::IdOverflow(self.generated()))?;

        let mut individual = Individual::new(id);
        let mut entries = Vec::with_capacity(self.order.len());
        for name in self.order.iter() {
            let dimension = self
                .table
                .get(name)
                .ok_or_else(|| GenerationError::UnknownDimension(name.to_owned()))?;
            let counter = self
                .counters
                .get(name)
                .ok_or_else(|| GenerationError::UnknownDimension(name.to_owned()))?;

            let allocation = allocate(dimension, counter, &individual)?;
            if allocation.fallback {
                debug!(
                    individual = id,
                    dimension = name,
                    value = allocation.value,
                    gap = allocation.gap,
                    "No value below target, using first declared value"
                );
            }

            individual.assign(name, allocation.value);
            entries.push((name, allocation.value, allocation.fallback));
        }

        self.counters.record_individual(&entries)?;
        self.next_id = next_id;
        debug!(individual = id, "Individual generated");
        Ok(individual)
    }

    /// Generate `size` individuals and finish the run.
    ///
    /// `size == 0` yields an empty population.
    pub fn build(mut self, size: u32) -> Result<Population, GenerationError> {
        let mut individuals = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        for _ in 0..size {
            individuals.push(self.next_individual()?);
        }

        info!(
            individuals = individuals.len(),
            dimensions = self.order.len(),
            fallbacks = self.counters.total_fallbacks(),
            "Population generated"
        );
        Ok(Population::new(self.order, individuals, self.counters))
    }

    /// Zero the counters and restart identifiers at 1.
    pub fn reset(&mut self) {
        self.counters.reset();
        self.next_id = 1;
    }
}

/// Build a population of `size` from `table` in one call.
pub fn generate_population(
    table: &EstimateTable,
    size: u32,
    strategy: OrderStrategy,
) -> Result<Population, GenerationError> {
    PopulationBuilder::new(table, strategy)?.build(size)
}
