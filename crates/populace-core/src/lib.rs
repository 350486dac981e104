//! Synthetic population generation by greedy quota matching.
//!
//! Given target distributions for a set of demographic dimensions, some of
//! them conditioned on another dimension, this crate generates individuals
//! one at a time so that the observed share of every value converges toward
//! its target. Generation is deterministic: the same table and size always
//! produce the same roster.
//!
//! # Modules
//!
//! - [`estimates`] -- The [`EstimateTable`]: dimensions, values, and fixed or
//!   conditional target fractions, loaded from JSON or YAML.
//! - [`counters`] -- [`CounterState`]: running per-value tallies for one run.
//! - [`order`] -- [`DimensionOrder`]: dependency-respecting resolution order.
//! - [`allocator`] -- [`allocate`]: the greedy gap-maximizing value choice.
//! - [`builder`] -- [`PopulationBuilder`]: the per-individual loop.
//! - [`roster`] -- [`Population`]: the finished roster and its tabular views.
//! - [`report`] -- [`PopulationReport`]: observed versus target summary.
//!
//! # Usage
//!
//! ```
//! use populace_core::{EstimateTable, OrderStrategy, generate_population};
//!
//! let table = EstimateTable::from_json_str(
//!     r#"{"age_group": {"young": 0.6, "old": 0.4}}"#,
//! ).unwrap();
//!
//! let population = generate_population(&table, 5, OrderStrategy::default()).unwrap();
//! let young = population
//!     .individuals()
//!     .iter()
//!     .filter(|i| i.get("age_group") == Some("young"))
//!     .count();
//! assert_eq!(young, 3);
//! ```

pub mod allocator;
pub mod builder;
pub mod counters;
pub mod error;
pub mod estimates;
pub mod individual;
pub mod order;
pub mod report;
pub mod roster;

// Re-export primary types at crate root.
pub use allocator::{Allocation, allocate};
pub use builder::{PopulationBuilder, generate_population};
pub use counters::{CounterState, DimensionCounter};
pub use error::{AllocationError, CounterError, EstimateError, GenerationError, OrderError};
pub use estimates::{
    ConditionalTarget, Dimension, DimensionValue, EstimateTable, FALLBACK_KEY, ValueTarget,
};
pub use individual::Individual;
pub use order::{DimensionOrder, OrderStrategy};
pub use report::{DimensionSummary, PopulationReport, ValueSummary};
pub use roster::{ID_COLUMN, Population, Record};
