//! End-to-end generation tests for the populace-core crate.
//!
//! These run whole populations through the public API and check the
//! distribution, ordering, and determinism properties of the generator,
//! including exact rosters for small reference tables.

#![allow(clippy::unwrap_used)]

use populace_core::{
    EstimateTable, GenerationError, OrderStrategy, Population, PopulationBuilder,
    generate_population,
};

const AGE: &str = r#"{"age_group": {"young": 0.6, "old": 0.4}}"#;

const PETS: &str = r#"{
    "age_group": {"young": 0.6, "old": 0.4},
    "has_pet": {
        "yes": {"age_group": {"young": 0.8, "": 0.2}},
        "no": {"age_group": {"young": 0.2, "": 0.8}}
    }
}"#;

/// Dependency declared before the dimension it depends on.
const HOUSEHOLD: &str = r#"{
    "has_pet": {
        "yes": {"age_group": {"adult": 0.6, "": 0.3}},
        "no": {"age_group": {"adult": 0.4, "": 0.7}}
    },
    "gender": {"male": 0.49, "female": 0.51},
    "age_group": {"child": 0.2, "adult": 0.5, "senior": 0.3}
}"#;

fn generate(json: &str, size: u32) -> Population {
    let table = EstimateTable::from_json_str(json).unwrap();
    generate_population(&table, size, OrderStrategy::default()).unwrap()
}

fn csv_lines(population: &Population) -> Vec<String> {
    std::iter::once(population.header().join(","))
        .chain(population.rows().map(|row| row.join(",")))
        .collect()
}

fn values_of<'a>(population: &'a Population, dimension: &str) -> Vec<&'a str> {
    population
        .individuals()
        .iter()
        .map(|i| i.get(dimension).unwrap())
        .collect()
}

#[test]
fn single_individual_gets_largest_target() {
    let population = generate(AGE, 1);
    assert_eq!(values_of(&population, "age_group"), vec!["young"]);
}

#[test]
fn five_individuals_split_three_two() {
    let population = generate(AGE, 5);
    let values = values_of(&population, "age_group");

    assert_eq!(values, vec!["young", "old", "young", "old", "young"]);
    let age = population.counters().get("age_group").unwrap();
    assert_eq!(age.count("young"), Some(3));
    assert_eq!(age.count("old"), Some(2));
}

#[test]
fn generation_is_deterministic() {
    let first = generate(HOUSEHOLD, 200);
    let second = generate(HOUSEHOLD, 200);
    assert_eq!(first, second);
}

#[test]
fn household_roster_matches_reference_output() {
    let population = generate(HOUSEHOLD, 12);
    let expected = vec![
        "id,age_group,has_pet,gender",
        "1,adult,yes,female",
        "2,senior,no,male",
        "3,child,no,female",
        "4,adult,yes,male",
        "5,senior,no,female",
        "6,adult,yes,male",
        "7,child,no,female",
        "8,adult,yes,male",
        "9,senior,no,female",
        "10,adult,yes,male",
        "11,senior,no,female",
        "12,adult,yes,male",
    ];
    assert_eq!(csv_lines(&population), expected);
}

#[test]
fn both_strategies_agree_on_simple_chains() {
    let table = EstimateTable::from_json_str(HOUSEHOLD).unwrap();
    let topological = generate_population(&table, 50, OrderStrategy::Topological).unwrap();
    let single_pass = generate_population(&table, 50, OrderStrategy::SinglePass).unwrap();

    assert_eq!(topological.order(), single_pass.order());
    assert_eq!(topological.individuals(), single_pass.individuals());
}

#[test]
fn counters_stay_consistent_during_the_run() {
    let table = EstimateTable::from_json_str(HOUSEHOLD).unwrap();
    let mut builder = PopulationBuilder::new(&table, OrderStrategy::default()).unwrap();

    for generated in 1..=100_u32 {
        builder.next_individual().unwrap();
        for (_, counter) in builder.counters().iter() {
            assert_eq!(counter.total(), generated);
            assert_eq!(counter.sum(), u64::from(generated));
        }
    }
}

#[test]
fn every_individual_holds_every_dimension() {
    let population = generate(HOUSEHOLD, 40);
    let order = population.order();

    assert!(order.position("age_group").unwrap() < order.position("has_pet").unwrap());
    for individual in population.individuals() {
        assert_eq!(individual.len(), 3);
        for dimension in order.iter() {
            assert!(individual.get(dimension).is_some());
        }
    }
}

#[test]
fn unconditional_shares_converge_to_targets() {
    let population = generate(HOUSEHOLD, 1000);
    let age = population.counters().get("age_group").unwrap();

    for (value, target) in [("child", 0.2), ("adult", 0.5), ("senior", 0.3)] {
        let observed = age.fraction(value).unwrap();
        assert!(
            (observed - target).abs() < 0.01,
            "{value}: observed {observed}, target {target}"
        );
    }
}

#[test]
fn conditional_shares_follow_dependency_value() {
    let population = generate(PETS, 500);

    let share_with_pet = |group: &str| {
        let members: Vec<_> = population
            .individuals()
            .iter()
            .filter(|i| i.get("age_group") == Some(group))
            .collect();
        let with_pet = members
            .iter()
            .filter(|i| i.get("has_pet") == Some("yes"))
            .count();
        with_pet as f64 / members.len() as f64
    };

    // "young" has an explicit entry, "old" falls back to the "" entry.
    assert!(share_with_pet("young") >= 0.8);
    assert!(share_with_pet("old") <= 0.2);
}

#[test]
fn exhausted_targets_fall_back_to_first_value() {
    let population = generate(r#"{"d": {"a": 0.1, "b": 0.1, "c": 0.1}}"#, 8);

    assert_eq!(
        values_of(&population, "d"),
        vec!["c", "b", "a", "a", "a", "a", "a", "a"]
    );
    assert_eq!(population.counters().get("d").unwrap().fallbacks(), 5);
}

#[test]
fn records_serialize_in_column_order() {
    let population = generate(PETS, 2);
    let json = serde_json::to_string(&population.records().collect::<Vec<_>>()).unwrap();
    assert_eq!(
        json,
        r#"[{"id":1,"age_group":"young","has_pet":"yes"},{"id":2,"age_group":"old","has_pet":"no"}]"#
    );
}

#[test]
fn cycle_is_reported_not_resolved() {
    let table =
        EstimateTable::from_json_str(r#"{"a": {"v": {"b": {"": 1}}}, "b": {"v": {"a": {"": 1}}}}"#)
            .unwrap();
    for strategy in [OrderStrategy::Topological, OrderStrategy::SinglePass] {
        let err = generate_population(&table, 3, strategy).unwrap_err();
        assert!(matches!(err, GenerationError::Order { .. }));
    }
}
