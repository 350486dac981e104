//! Greedy quota-matching attribute allocator.
//!
//! For each value of a dimension, in declared order, the allocator computes
//! the gap between the value's desired fraction and its observed fraction so
//! far, and picks the value with the largest non-negative gap:
//!
//! ```text
//! gap(v) = desired(v) - count(v) / total        (0.0 observed when total == 0)
//! ```
//!
//! Selection rules, all observable in generated output:
//!
//! - The running best gap starts at `0.0`, so only non-negative gaps are
//!   ever adopted.
//! - Comparison is `>=`: among equal gaps the later-declared value wins.
//! - If no gap is non-negative, the first declared value is returned and the
//!   [`Allocation`] is flagged as a fallback.
//!
//! The allocator is a pure function of the dimension, its counters, and the
//! individual being built. There is no randomness.

use crate::counters::DimensionCounter;
use crate::error::AllocationError;
use crate::estimates::{Dimension, DimensionValue, ValueTarget};
use crate::individual::Individual;

/// The value chosen for one dimension of one individual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation<'a> {
    /// The chosen value.
    pub value: &'a str,
    /// The chosen value's gap at allocation time.
    pub gap: f64,
    /// Set when no value had a non-negative gap and the first declared value
    /// was used by default.
    pub fallback: bool,
}

/// Choose the next value of `dimension` for `individual`.
///
/// # Errors
///
/// Returns [`AllocationError::DependencyUnassigned`] if a conditional target
/// reads a dependency the individual does not hold yet,
/// [`AllocationError::MissingFallback`] if the dependency value has neither an
/// explicit entry nor a fallback entry, and
/// [`AllocationError::UntrackedValue`] if `counter` does not belong to
/// `dimension`.
pub fn allocate<'a>(
    dimension: &'a Dimension,
    counter: &DimensionCounter,
    individual: &Individual,
) -> Result<Allocation<'a>, AllocationError> {
    let mut best_gap = 0.0_f64;
    let mut best: Option<(&'a str, f64)> = None;
    let mut adopted = false;

    for value in dimension.values() {
        let current = counter
            .fraction(value.name())
            .ok_or_else(|| AllocationError::UntrackedValue {
                dimension: dimension.name().to_owned(),
                value: value.name().to_owned(),
            })?;
        let desired = desired_fraction(dimension, value, individual)?;
        let gap = desired - current;

        if best.is_none() {
            best = Some((value.name(), gap));
        }
        if gap >= best_gap {
            best_gap = gap;
            best = Some((value.name(), gap));
            adopted = true;
        }
    }

    let (value, gap) = best.ok_or_else(|| AllocationError::EmptyDimension {
        dimension: dimension.name().to_owned(),
    })?;

    Ok(Allocation {
        value,
        gap,
        fallback: !adopted,
    })
}

/// The target fraction of `value` for this particular individual.
fn desired_fraction(
    dimension: &Dimension,
    value: &DimensionValue,
    individual: &Individual,
) -> Result<f64, AllocationError> {
    match value.target() {
        ValueTarget::Fixed(fraction) => Ok(*fraction),
        ValueTarget::Conditional(conditional) => {
            let dependency = conditional.dependency();
            let dependency_value =
                individual
                    .get(dependency)
                    .ok_or_else(|| AllocationError::DependencyUnassigned {
                        individual: individual.id(),
                        dimension: dimension.name().to_owned(),
                        dependency: dependency.to_owned(),
                    })?;
            conditional
                .fraction_for(dependency_value)
                .ok_or_else(|| AllocationError::MissingFallback {
                    dimension: dimension.name().to_owned(),
                    value: value.name().to_owned(),
                    dependency: dependency.to_owned(),
                    dependency_value: dependency_value.to_owned(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterState;
    use crate::estimates::EstimateTable;

    fn age() -> Dimension {
        Dimension::new(
            "age_group",
            vec![
                DimensionValue::fixed("young", 0.6),
                DimensionValue::fixed("old", 0.4),
            ],
        )
        .unwrap()
    }

    fn counter_with(dimension: &Dimension, records: &[&str]) -> DimensionCounter {
        let mut state =
            CounterState::from_table(&EstimateTable::new(vec![dimension.clone()]).unwrap());
        for value in records {
            state.record(dimension.name(), value, false).unwrap();
        }
        state.get(dimension.name()).unwrap().clone()
    }

    #[test]
    fn first_individual_gets_largest_target() {
        let dimension = age();
        let counter = counter_with(&dimension, &[]);
        let allocation = allocate(&dimension, &counter, &Individual::new(1)).unwrap();

        assert_eq!(allocation.value, "young");
        assert!(!allocation.fallback);
        assert!((allocation.gap - 0.6).abs() < 1e-12);
    }

    #[test]
    fn under_represented_value_is_chosen() {
        let dimension = age();
        let counter = counter_with(&dimension, &["young"]);
        let allocation = allocate(&dimension, &counter, &Individual::new(2)).unwrap();
        assert_eq!(allocation.value, "old");
    }

    #[test]
    fn equal_gaps_pick_the_later_value() {
        let dimension = Dimension::new(
            "coin",
            vec![
                DimensionValue::fixed("heads", 0.5),
                DimensionValue::fixed("tails", 0.5),
            ],
        )
        .unwrap();
        let counter = counter_with(&dimension, &[]);
        let allocation = allocate(&dimension, &counter, &Individual::new(1)).unwrap();
        assert_eq!(allocation.value, "tails");
    }

    #[test]
    fn all_negative_gaps_fall_back_to_first_value() {
        // Both targets are already exceeded: 0.1 - 0.5 and 0.1 - 0.5.
        let dimension = Dimension::new(
            "rare",
            vec![
                DimensionValue::fixed("a", 0.1),
                DimensionValue::fixed("b", 0.1),
            ],
        )
        .unwrap();
        let counter = counter_with(&dimension, &["a", "b"]);
        let allocation = allocate(&dimension, &counter, &Individual::new(3)).unwrap();

        assert_eq!(allocation.value, "a");
        assert!(allocation.fallback);
        assert!(allocation.gap < 0.0);
    }

    #[test]
    fn first_value_with_negative_gap_is_replaced_by_later_non_negative() {
        let dimension = Dimension::new(
            "d",
            vec![
                DimensionValue::fixed("a", 0.1),
                DimensionValue::fixed("b", 0.0),
            ],
        )
        .unwrap();
        // a: 0.1 - 1.0 < 0, b: 0.0 - 0.0 == 0 -> adopted via >=.
        let counter = counter_with(&dimension, &["a"]);
        let allocation = allocate(&dimension, &counter, &Individual::new(2)).unwrap();

        assert_eq!(allocation.value, "b");
        assert!(!allocation.fallback);
    }

    #[test]
    fn conditional_target_uses_dependency_value_or_fallback() {
        let pet = Dimension::new(
            "has_pet",
            vec![
                DimensionValue::conditional("yes", "age_group", [("young", 0.8), ("", 0.2)]),
                DimensionValue::conditional("no", "age_group", [("young", 0.2), ("", 0.8)]),
            ],
        )
        .unwrap();
        let table = EstimateTable::new(vec![age(), pet.clone()]).unwrap();
        let mut state = CounterState::from_table(&table);
        state.record("has_pet", "yes", false).unwrap();
        state.record("has_pet", "no", false).unwrap();
        let counter = state.get("has_pet").unwrap();

        let mut young = Individual::new(3);
        young.assign("age_group", "young");
        assert_eq!(allocate(&pet, counter, &young).unwrap().value, "yes");

        let mut old = Individual::new(3);
        old.assign("age_group", "old");
        assert_eq!(allocate(&pet, counter, &old).unwrap().value, "no");
    }

    #[test]
    fn unassigned_dependency_is_an_error() {
        let pet = Dimension::new(
            "has_pet",
            vec![DimensionValue::conditional("yes", "age_group", [("", 1.0)])],
        )
        .unwrap();
        let counter = DimensionCounter::new(["yes"]);
        let err = allocate(&pet, &counter, &Individual::new(1)).unwrap_err();
        assert!(matches!(err, AllocationError::DependencyUnassigned { .. }));
    }

    #[test]
    fn missing_fallback_is_an_error() {
        let pet = Dimension::new(
            "has_pet",
            vec![DimensionValue::conditional("yes", "age_group", [("young", 1.0)])],
        )
        .unwrap();
        let counter = DimensionCounter::new(["yes"]);
        let mut old = Individual::new(1);
        old.assign("age_group", "old");

        let err = allocate(&pet, &counter, &old).unwrap_err();
        assert!(matches!(err, AllocationError::MissingFallback { .. }));
    }

    #[test]
    fn counter_from_another_dimension_is_rejected() {
        let dimension = age();
        let counter = DimensionCounter::new(["heads", "tails"]);
        let err = allocate(&dimension, &counter, &Individual::new(1)).unwrap_err();
        assert!(matches!(err, AllocationError::UntrackedValue { .. }));
    }
}
