//! Observed versus target distribution summary for a finished run.

use serde::Serialize;
use tracing::info;

use crate::counters::CounterState;
use crate::estimates::EstimateTable;

/// Counts for one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSummary {
    /// The value name.
    pub value: String,
    /// Individuals holding the value.
    pub count: u32,
    /// `count / total`, or `0.0` for an empty run.
    pub observed: f64,
    /// The unconditional target, when the value has one.
    pub target: Option<f64>,
}

/// Counts for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    /// The dimension name.
    pub dimension: String,
    /// The dimension this one is conditioned on.
    pub dependency: Option<String>,
    /// Individuals counted.
    pub total: u32,
    /// Allocations that defaulted to the first declared value.
    pub fallbacks: u32,
    /// Per-value counts in declared order.
    pub values: Vec<ValueSummary>,
}

/// Per-dimension summary of a generation run, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationReport {
    /// One entry per dimension.
    pub dimensions: Vec<DimensionSummary>,
}

impl PopulationReport {
    /// Summarise `counters` against the targets in `table`.
    pub fn new(table: &EstimateTable, counters: &CounterState) -> Self {
        let dimensions = table
            .dimensions()
            .iter()
            .filter_map(|dimension| {
                let counter = counters.get(dimension.name())?;
                let values = counter
                    .iter()
                    .map(|(value, count)| ValueSummary {
                        value: value.to_owned(),
                        count,
                        observed: counter.fraction(value).unwrap_or_default(),
                        target: dimension.fixed_target(value),
                    })
                    .collect();
                Some(DimensionSummary {
                    dimension: dimension.name().to_owned(),
                    dependency: dimension.dependency().map(str::to_owned),
                    total: counter.total(),
                    fallbacks: counter.fallbacks(),
                    values,
                })
            })
            .collect();
        Self { dimensions }
    }

    /// Look up a dimension's summary.
    pub fn dimension(&self, name: &str) -> Option<&DimensionSummary> {
        self.dimensions.iter().find(|d| d.dimension == name)
    }

    /// Fallback selections across all dimensions.
    pub fn total_fallbacks(&self) -> u64 {
        self.dimensions.iter().map(|d| u64::from(d.fallbacks)).sum()
    }

    /// Emit one `info` event per dimension value.
    pub fn log(&self) {
        for dimension in &self.dimensions {
            info!(
                dimension = %dimension.dimension,
                dependency = ?dimension.dependency,
                total = dimension.total,
                fallbacks = dimension.fallbacks,
                "Dimension summary"
            );
            for value in &dimension.values {
                info!(
                    dimension = %dimension.dimension,
                    value = %value.value,
                    count = value.count,
                    observed = value.observed,
                    target = ?value.target,
                    "Value summary"
                );
            }
        }
    }
}
