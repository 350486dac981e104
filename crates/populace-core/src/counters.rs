//! Running tallies of allocated values per dimension.
//!
//! A [`CounterState`] holds one [`DimensionCounter`] per dimension of an
//! [`EstimateTable`]. Counts only ever grow during a run: each individual
//! records exactly one value per dimension. The state belongs to a single
//! generation run and must be [`reset`](CounterState::reset) before it can
//! drive another one.

use std::collections::BTreeMap;

use crate::error::CounterError;
use crate::estimates::EstimateTable;

/// Counts for a single dimension, in the dimension's declared value order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCounter {
    counts: Vec<(String, u32)>,
    total: u32,
    fallbacks: u32,
}

impl DimensionCounter {
    /// A zeroed counter tracking `values`.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: values.into_iter().map(|v| (v.into(), 0)).collect(),
            total: 0,
            fallbacks: 0,
        }
    }

    /// Number of individuals counted so far.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Number of allocations where no value had a non-negative gap and the
    /// first declared value was used instead.
    pub const fn fallbacks(&self) -> u32 {
        self.fallbacks
    }

    /// Count for `value`, or `None` if the value is not tracked.
    pub fn count(&self, value: &str) -> Option<u32> {
        self.counts
            .iter()
            .find(|(name, _)| name == value)
            .map(|(_, count)| *count)
    }

    /// Observed share of `value` so far; `0.0` before anything is counted.
    pub fn fraction(&self, value: &str) -> Option<f64> {
        let count = self.count(value)?;
        if self.total == 0 {
            Some(0.0)
        } else {
            Some(f64::from(count) / f64::from(self.total))
        }
    }

    /// `(value, count)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Sum of all per-value counts. Always equal to [`total`](Self::total).
    pub fn sum(&self) -> u64 {
        self.counts.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    /// Fail if recording `value` would be rejected, without changing anything.
    fn check(&self, dimension: &str, value: &str, fallback: bool) -> Result<(), CounterError> {
        let count = self.count(value).ok_or_else(|| CounterError::UnknownValue {
            dimension: dimension.to_owned(),
            value: value.to_owned(),
        })?;
        let full = count == u32::MAX
            || self.total == u32::MAX
            || (fallback && self.fallbacks == u32::MAX);
        if full {
            return Err(CounterError::Overflow(dimension.to_owned()));
        }
        Ok(())
    }

    fn record(&mut self, dimension: &str, value: &str, fallback: bool) -> Result<(), CounterError> {
        let total = self
            .total
            .checked_add(1)
            .ok_or_else(|| CounterError::Overflow(dimension.to_owned()))?;
        let fallbacks = if fallback {
            self.fallbacks
                .checked_add(1)
                .ok_or_else(|| CounterError::Overflow(dimension.to_owned()))?
        } else {
            self.fallbacks
        };

        let slot = self
            .counts
            .iter_mut()
            .find(|(name, _)| name == value)
            .ok_or_else(|| CounterError::UnknownValue {
                dimension: dimension.to_owned(),
                value: value.to_owned(),
            })?;
        slot.1 = slot
            .1
            .checked_add(1)
            .ok_or_else(|| CounterError::Overflow(dimension.to_owned()))?;

        self.total = total;
        self.fallbacks = fallbacks;
        Ok(())
    }

    fn reset(&mut self) {
        for (_, count) in &mut self.counts {
            *count = 0;
        }
        self.total = 0;
        self.fallbacks = 0;
    }
}

/// Counters for every dimension of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    dimensions: BTreeMap<String, DimensionCounter>,
}

impl CounterState {
    /// Zeroed counters for every dimension and value in `table`.
    pub fn from_table(table: &EstimateTable) -> Self {
        let dimensions = table
            .dimensions()
            .iter()
            .map(|d| (d.name().to_owned(), DimensionCounter::new(d.value_names())))
            .collect();
        Self { dimensions }
    }

    /// Counter for one dimension.
    pub fn get(&self, dimension: &str) -> Option<&DimensionCounter> {
        self.dimensions.get(dimension)
    }

    /// Record that one individual received `value` for `dimension`.
    ///
    /// Increments the value's count and the dimension total, plus the
    /// fallback tally when `fallback` is set. Nothing changes on error.
    pub fn record(&mut self, dimension: &str, value: &str, fallback: bool) -> Result<(), CounterError> {
        self.dimensions
            .get_mut(dimension)
            .ok_or_else(|| CounterError::UnknownDimension(dimension.to_owned()))?
            .record(dimension, value, fallback)
    }

    /// Record one individual's values across several dimensions, as
    /// `(dimension, value, fallback)` entries.
    ///
    /// Every entry is checked before any counter moves, so either all
    /// entries are recorded or none are.
    pub fn record_individual(&mut self, entries: &[(&str, &str, bool)]) -> Result<(), CounterError> {
        for &(dimension, value, fallback) in entries {
            self.dimensions
                .get(dimension)
                .ok_or_else(|| CounterError::UnknownDimension(dimension.to_owned()))?
                .check(dimension, value, fallback)?;
        }
        for &(dimension, value, fallback) in entries {
            self.record(dimension, value, fallback)?;
        }
        Ok(())
    }

    /// Zero every counter so the state can drive a fresh run.
    pub fn reset(&mut self) {
        for counter in self.dimensions.values_mut() {
            counter.reset();
        }
    }

    /// `(dimension, counter)` pairs sorted by dimension name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionCounter)> {
        self.dimensions.iter().map(|(name, counter)| (name.as_str(), counter))
    }

    /// Total fallback selections across all dimensions.
    pub fn total_fallbacks(&self) -> u64 {
        self.dimensions.values().map(|c| u64::from(c.fallbacks)).sum()
    }
}
