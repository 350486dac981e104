//! Error types for the populace-core crate.
//!
//! Loading, ordering, allocation, and generation each have their own error
//! enum. [`GenerationError`] wraps the ones that can surface while a
//! population is being built so callers can propagate a single type with `?`.

use std::path::PathBuf;

/// Errors that can occur while loading or validating an estimate table.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// The estimate file could not be read.
    #[error("failed to read estimates from {}: {source}", path.display())]
    Io {
        /// Path of the file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The estimate document is not valid JSON or does not have the
    /// expected shape.
    #[error("failed to parse estimates JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The estimate document is not valid YAML or does not have the
    /// expected shape.
    #[error("failed to parse estimates YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        #[from]
        source: serde_yml::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported estimates format for {} (expected .json, .yaml or .yml)", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// A dimension declares no values at all.
    #[error("dimension {dimension:?} declares no values")]
    EmptyDimension {
        /// The empty dimension.
        dimension: String,
    },

    /// The same dimension name appears twice.
    #[error("dimension {dimension:?} is declared more than once")]
    DuplicateDimension {
        /// The repeated dimension name.
        dimension: String,
    },

    /// The same value appears twice within one dimension.
    #[error("value {value:?} is declared more than once in dimension {dimension:?}")]
    DuplicateValue {
        /// The dimension holding the duplicate.
        dimension: String,
        /// The repeated value name.
        value: String,
    },

    /// A conditional target lists the same dependency value twice.
    #[error("dependency value {key:?} is repeated for {dimension}.{value}")]
    DuplicateDependencyValue {
        /// The conditional dimension.
        dimension: String,
        /// The value whose target is conditional.
        value: String,
        /// The repeated dependency value.
        key: String,
    },

    /// A conditional target must name exactly one dependency dimension.
    #[error("conditional target for {dimension}.{value} must name exactly one dependency, found {keys}")]
    MalformedConditional {
        /// The conditional dimension.
        dimension: String,
        /// The value whose target is malformed.
        value: String,
        /// Number of dependency keys found.
        keys: usize,
    },

    /// Two values of the same dimension depend on different dimensions.
    #[error("dimension {dimension:?} depends on both {first:?} and {second:?}")]
    MultipleDependencies {
        /// The dimension with conflicting dependencies.
        dimension: String,
        /// The first dependency encountered.
        first: String,
        /// The conflicting dependency.
        second: String,
    },

    /// A conditional target refers to a dimension that does not exist.
    #[error("dimension {dimension:?} depends on unknown dimension {dependency:?}")]
    UnknownDependency {
        /// The conditional dimension.
        dimension: String,
        /// The missing dependency.
        dependency: String,
    },

    /// A target fraction is NaN or infinite.
    #[error("target fraction for {dimension}.{value} is not finite")]
    NonFiniteFraction {
        /// The dimension holding the fraction.
        dimension: String,
        /// The value whose fraction is invalid.
        value: String,
    },
}

/// Errors produced while resolving the dimension order.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The dependency graph contains a cycle.
    #[error("dependency cycle: {}", cycle.join(" -> "))]
    Cycle {
        /// The dimensions forming the cycle, first element repeated at the end.
        cycle: Vec<String>,
    },

    /// A dependency is not placed before its dependent.
    #[error("dimension {dimension:?} is ordered before its dependency {dependency:?}")]
    Unsatisfied {
        /// The dependent dimension.
        dimension: String,
        /// The dependency placed too late.
        dependency: String,
    },

    /// A dimension of the table is missing from the order, or appears twice.
    #[error("dimension {dimension:?} must appear exactly once in the order")]
    Incomplete {
        /// The misplaced dimension.
        dimension: String,
    },
}

/// Errors raised by the attribute allocator.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// The dimension has no values to choose from.
    #[error("dimension {dimension:?} has no values to allocate")]
    EmptyDimension {
        /// The empty dimension.
        dimension: String,
    },

    /// The individual does not yet hold a value for the dependency.
    #[error("individual {individual} has no value for {dependency:?}, required by {dimension:?}")]
    DependencyUnassigned {
        /// The individual being built.
        individual: u32,
        /// The dimension being resolved.
        dimension: String,
        /// The dependency that is still unassigned.
        dependency: String,
    },

    /// The dependency value has no entry and no fallback entry exists.
    #[error("no target for {dimension}.{value} when {dependency} = {dependency_value:?} and no fallback is configured")]
    MissingFallback {
        /// The dimension being resolved.
        dimension: String,
        /// The value whose target could not be found.
        value: String,
        /// The dependency dimension.
        dependency: String,
        /// The individual's value for the dependency.
        dependency_value: String,
    },

    /// The counters do not track a value declared by the dimension.
    #[error("counters for {dimension:?} do not track value {value:?}")]
    UntrackedValue {
        /// The dimension being resolved.
        dimension: String,
        /// The value missing from the counters.
        value: String,
    },
}

/// Errors raised when recording an allocation in the counters.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// No counter exists for the dimension.
    #[error("no counters for dimension {0:?}")]
    UnknownDimension(String),

    /// The dimension's counter does not track the value.
    #[error("dimension {dimension:?} has no counter for value {value:?}")]
    UnknownValue {
        /// The dimension.
        dimension: String,
        /// The untracked value.
        value: String,
    },

    /// A counter would exceed `u32::MAX`.
    #[error("counter overflow in dimension {0:?}")]
    Overflow(String),
}

/// Errors that can occur while building a population.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The dimension order could not be resolved.
    #[error("order error: {source}")]
    Order {
        /// The underlying order error.
        #[from]
        source: OrderError,
    },

    /// The allocator could not pick a value.
    #[error("allocation error: {source}")]
    Allocation {
        /// The underlying allocation error.
        #[from]
        source: AllocationError,
    },

    /// Recording an allocation failed.
    #[error("counter error: {source}")]
    Counter {
        /// The underlying counter error.
        #[from]
        source: CounterError,
    },

    /// The order names a dimension missing from the estimate table.
    #[error("dimension {0:?} is not in the estimate table")]
    UnknownDimension(String),

    /// Individual identifiers are exhausted.
    #[error("individual id overflow after {0} individuals")]
    IdOverflow(u32),
}
