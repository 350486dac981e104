//! Dimension ordering.
//!
//! Conditional dimensions read their dependency's value from the individual
//! being built, so every dependency must be resolved first. The order is
//! computed once per run and shared by all individuals.
//!
//! Two strategies are available:
//!
//! - [`OrderStrategy::Topological`] (default) -- depth-first postorder over
//!   the dependency graph, visiting dimensions in declaration order. Cycles
//!   are rejected with [`OrderError::Cycle`].
//! - [`OrderStrategy::SinglePass`] -- the legacy reordering: for each
//!   dependent dimension placed before its dependency, move the dependency
//!   to the dependent's position. The result is verified and rejected with
//!   [`OrderError::Unsatisfied`] when the single pass was not enough.
//!
//! Both produce the same order for single-chain dependencies.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::estimates::{Dimension, EstimateTable};

/// How the dimension order is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStrategy {
    /// Depth-first postorder with cycle detection.
    #[default]
    Topological,
    /// Legacy pop-and-reinsert pass, verified afterwards.
    SinglePass,
}

impl fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topological => f.write_str("topological"),
            Self::SinglePass => f.write_str("single-pass"),
        }
    }
}

impl FromStr for OrderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topological" => Ok(Self::Topological),
            "single-pass" => Ok(Self::SinglePass),
            other => Err(format!(
                "unknown order strategy {other:?} (expected topological or single-pass)"
            )),
        }
    }
}

/// The sequence in which dimensions are resolved for every individual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionOrder {
    names: Vec<String>,
}

impl DimensionOrder {
    /// Resolve the order for `table` using `strategy`.
    pub fn resolve(table: &EstimateTable, strategy: OrderStrategy) -> Result<Self, OrderError> {
        match strategy {
            OrderStrategy::Topological => Self::topological(table),
            OrderStrategy::SinglePass => Self::single_pass(table),
        }
    }

    /// Depth-first postorder: each dimension is preceded by its dependency
    /// chain, dimensions otherwise keep declaration order.
    pub fn topological(table: &EstimateTable) -> Result<Self, OrderError> {
        let mut placed: BTreeSet<&str> = BTreeSet::new();
        let mut names = Vec::with_capacity(table.len());

        for dimension in table.dimensions() {
            // Single-parent model: the dependency graph is a set of chains.
            let mut chain: Vec<&str> = Vec::new();
            let mut cursor = Some(dimension.name());
            while let Some(name) = cursor {
                if placed.contains(name) {
                    break;
                }
                if let Some(start) = chain.iter().position(|seen| *seen == name) {
                    let mut cycle: Vec<String> = chain
                        .get(start..)
                        .unwrap_or_default()
                        .iter()
                        .map(|n| (*n).to_owned())
                        .collect();
                    cycle.push(name.to_owned());
                    return Err(OrderError::Cycle { cycle });
                }
                chain.push(name);
                cursor = table.get(name).and_then(Dimension::dependency);
            }

            for name in chain.into_iter().rev() {
                placed.insert(name);
                names.push(name.to_owned());
            }
        }

        Ok(Self { names })
    }

    /// Legacy single-pass reordering, verified before it is returned.
    pub fn single_pass(table: &EstimateTable) -> Result<Self, OrderError> {
        let mut names: Vec<String> = table.dimension_names().map(str::to_owned).collect();

        for dimension in table.dimensions() {
            let Some(dependency) = dimension.dependency() else {
                continue;
            };
            let item_index = names.iter().position(|n| n == dimension.name());
            let dependency_index = names.iter().position(|n| n == dependency);
            if let (Some(item), Some(dep)) = (item_index, dependency_index)
                && item < dep
            {
                let moved = names.remove(dep);
                names.insert(item, moved);
            }
        }

        let order = Self { names };
        order.verify(table)?;
        Ok(order)
    }

    /// Check that every table dimension appears exactly once and after its
    /// dependency.
    pub fn verify(&self, table: &EstimateTable) -> Result<(), OrderError> {
        let mut unique = BTreeSet::new();
        for name in &self.names {
            if !unique.insert(name.as_str()) || table.get(name).is_none() {
                return Err(OrderError::Incomplete {
                    dimension: name.clone(),
                });
            }
        }
        for dimension in table.dimensions() {
            let Some(position) = self.position(dimension.name()) else {
                return Err(OrderError::Incomplete {
                    dimension: dimension.name().to_owned(),
                });
            };
            if let Some(dependency) = dimension.dependency() {
                let satisfied = self
                    .position(dependency)
                    .is_some_and(|dep_position| dep_position < position);
                if !satisfied {
                    return Err(OrderError::Unsatisfied {
                        dimension: dimension.name().to_owned(),
                        dependency: dependency.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Position of `dimension` in the order.
    pub fn position(&self, dimension: &str) -> Option<usize> {
        self.names.iter().position(|n| n == dimension)
    }

    /// Dimension names in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Dimension names in resolution order.
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// Number of dimensions.
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the order is empty.
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> EstimateTable {
        EstimateTable::from_json_str(json).unwrap()
    }

    fn names(order: &DimensionOrder) -> Vec<&str> {
        order.iter().collect()
    }

    #[test]
    fn independent_dimensions_keep_declaration_order() {
        let t = table(r#"{"b": {"x": 1}, "a": {"y": 1}, "c": {"z": 1}}"#);
        for strategy in [OrderStrategy::Topological, OrderStrategy::SinglePass] {
            let order = DimensionOrder::resolve(&t, strategy).unwrap();
            assert_eq!(names(&order), vec!["b", "a", "c"]);
        }
    }

    #[test]
    fn dependency_moves_ahead_of_dependent() {
        let t = table(
            r#"{
                "x": {"v": 1},
                "has_pet": {"yes": {"age_group": {"": 0.5}}, "no": {"age_group": {"": 0.5}}},
                "y": {"v": 1},
                "age_group": {"young": 0.6, "old": 0.4}
            }"#,
        );
        let expected = vec!["x", "age_group", "has_pet", "y"];
        assert_eq!(names(&DimensionOrder::topological(&t).unwrap()), expected);
        assert_eq!(names(&DimensionOrder::single_pass(&t).unwrap()), expected);
    }

    #[test]
    fn already_ordered_dependency_is_left_alone() {
        let t = table(r#"{"age": {"young": 1}, "pet": {"yes": {"age": {"": 1}}}}"#);
        let expected = vec!["age", "pet"];
        assert_eq!(names(&DimensionOrder::topological(&t).unwrap()), expected);
        assert_eq!(names(&DimensionOrder::single_pass(&t).unwrap()), expected);
    }

    #[test]
    fn chained_dependencies_resolve_root_first() {
        let t = table(
            r#"{
                "c": {"v": {"b": {"": 1}}},
                "b": {"v": {"a": {"": 1}}},
                "a": {"v": 1}
            }"#,
        );
        let order = DimensionOrder::topological(&t).unwrap();
        assert_eq!(names(&order), vec!["a", "b", "c"]);
        order.verify(&t).unwrap();
    }

    #[test]
    fn single_pass_misorder_is_reported_where_topological_succeeds() {
        // e -> d -> y -> x. The pass fixes y before x, then moving y ahead
        // of d breaks it again.
        let t = table(
            r#"{
                "e": {"v": {"d": {"": 1}}},
                "y": {"v": {"x": {"": 1}}},
                "x": {"v": 1},
                "d": {"v": {"y": {"": 1}}}
            }"#,
        );

        let err = DimensionOrder::single_pass(&t).unwrap_err();
        let OrderError::Unsatisfied {
            dimension,
            dependency,
        } = err
        else {
            panic!("expected an unsatisfied dependency");
        };
        assert_eq!((dimension.as_str(), dependency.as_str()), ("y", "x"));

        let order = DimensionOrder::topological(&t).unwrap();
        assert_eq!(names(&order), vec!["x", "y", "d", "e"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let t = table(
            r#"{
                "a": {"v": {"b": {"": 1}}},
                "b": {"v": {"a": {"": 1}}}
            }"#,
        );
        let err = DimensionOrder::topological(&t).unwrap_err();
        let OrderError::Cycle { cycle } = err else {
            panic!("expected a cycle error");
        };
        assert_eq!(cycle, vec!["a", "b", "a"]);
    }

    #[test]
    fn self_dependency_is_rejected_by_both_strategies() {
        let t = table(r#"{"a": {"v": {"a": {"": 1}}}}"#);
        assert!(matches!(
            DimensionOrder::topological(&t).unwrap_err(),
            OrderError::Cycle { .. }
        ));
        assert!(matches!(
            DimensionOrder::single_pass(&t).unwrap_err(),
            OrderError::Unsatisfied { .. }
        ));
    }

    #[test]
    fn verify_rejects_missing_dimension() {
        let t = table(r#"{"a": {"v": 1}, "b": {"v": 1}}"#);
        let order = DimensionOrder {
            names: vec!["a".to_owned()],
        };
        assert!(matches!(
            order.verify(&t).unwrap_err(),
            OrderError::Incomplete { .. }
        ));
    }

    #[test]
    fn strategy_parses_from_text() {
        assert_eq!("single-pass".parse::<OrderStrategy>(), Ok(OrderStrategy::SinglePass));
        assert_eq!("topological".parse::<OrderStrategy>(), Ok(OrderStrategy::Topological));
        assert!("random".parse::<OrderStrategy>().is_err());
        assert_eq!(OrderStrategy::SinglePass.to_string(), "single-pass");
    }
}
