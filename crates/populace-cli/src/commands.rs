//! Subcommand implementations.
//!
//! Each command merges its command-line arguments over the run
//! configuration, loads inputs, generates, and writes the result.

use std::path::PathBuf;

use clap::Args;
use populace_core::{EstimateTable, OrderStrategy, PopulationReport, generate_population};
use populace_rental::{RentalConfig, RentalHistoryGenerator};
use tracing::{info, warn};

use crate::config::{PopulaceConfig, PopulationSettings};
use crate::error::CliError;
use crate::input;
use crate::output::{self, OutputFormat};

/// Arguments of `populace population`.
#[derive(Debug, Clone, Default, Args)]
pub struct PopulationArgs {
    /// Estimate table file (.json, .yaml or .yml).
    #[arg(long)]
    pub estimates: Option<PathBuf>,

    /// Number of individuals to generate.
    #[arg(long)]
    pub population_size: Option<u32>,

    /// Dimension order strategy: topological or single-pass.
    #[arg(long)]
    pub order: Option<OrderStrategy>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout if omitted).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments of `populace rental-history`.
#[derive(Debug, Clone, Args)]
pub struct RentalHistoryArgs {
    /// Individuals CSV with an `id` column, e.g. `populace population` output.
    #[arg(long)]
    pub individuals: PathBuf,

    /// Properties CSV with an `id` column.
    #[arg(long)]
    pub properties: PathBuf,

    /// Exclusive upper bound on rounds of looking per individual.
    #[arg(long)]
    pub max_history: Option<u32>,

    /// Probability that a single application is approved.
    #[arg(long)]
    pub success_chance: Option<f64>,

    /// Seed for reproducible histories.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Application ids start just after this value.
    #[arg(long)]
    pub start_id: Option<u64>,

    /// Output file (stdout if omitted).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Population settings after applying command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationPlan {
    /// Estimate table file.
    pub estimates: PathBuf,
    /// Number of individuals.
    pub size: u32,
    /// Order strategy.
    pub order: OrderStrategy,
    /// Output format.
    pub format: OutputFormat,
}

impl PopulationPlan {
    /// Merge `args` over `settings`; estimates and size must come from one
    /// of them.
    pub fn resolve(args: &PopulationArgs, settings: &PopulationSettings) -> Result<Self, CliError> {
        let estimates = args
            .estimates
            .clone()
            .or_else(|| settings.estimates.clone())
            .ok_or(CliError::MissingSetting {
                flag: "estimates",
                key: "population.estimates",
            })?;
        let size = args
            .population_size
            .or(settings.size)
            .ok_or(CliError::MissingSetting {
                flag: "population-size",
                key: "population.size",
            })?;
        Ok(Self {
            estimates,
            size,
            order: args.order.unwrap_or(settings.order_strategy),
            format: args.format.unwrap_or(settings.format),
        })
    }
}

/// Merge rental arguments over the `rental` config section.
pub fn rental_config(args: &RentalHistoryArgs, base: &RentalConfig) -> RentalConfig {
    RentalConfig {
        max_history: args.max_history.unwrap_or(base.max_history),
        success_chance: args.success_chance.unwrap_or(base.success_chance),
        start_application_id: args.start_id.unwrap_or(base.start_application_id),
        seed: args.seed.or(base.seed),
    }
}

/// Run `populace population`.
pub fn population(args: &PopulationArgs, config: &PopulaceConfig) -> Result<(), CliError> {
    let plan = PopulationPlan::resolve(args, &config.population)?;
    info!(
        estimates = %plan.estimates.display(),
        size = plan.size,
        order = %plan.order,
        "Generating population"
    );

    let table = EstimateTable::from_file(&plan.estimates)?;
    let population = generate_population(&table, plan.size, plan.order)?;

    let report = PopulationReport::new(&table, population.counters());
    report.log();
    let fallbacks = report.total_fallbacks();
    if fallbacks > 0 {
        warn!(
            fallbacks,
            "Some allocations found every value above target and used the first declared value"
        );
    }

    let writer = output::open_output(args.output.as_deref())?;
    output::write_population(&population, plan.format, writer)?;
    info!(
        individuals = population.len(),
        output = %args.output.as_ref().map_or_else(|| String::from("stdout"), |p| p.display().to_string()),
        "Population written"
    );
    Ok(())
}

/// Run `populace rental-history`.
pub fn rental_history(args: &RentalHistoryArgs, config: &PopulaceConfig) -> Result<(), CliError> {
    let individual_ids = input::read_individual_ids(&args.individuals)?;
    let properties = input::read_properties(&args.properties)?;
    info!(
        individuals = individual_ids.len(),
        properties = properties.len(),
        "Rental inputs loaded"
    );

    let mut generator =
        RentalHistoryGenerator::from_config(properties, rental_config(args, &config.rental))?;
    let histories = individual_ids
        .iter()
        .map(|id| generator.generate(id))
        .collect::<Result<Vec<_>, _>>()?;

    let applications: usize = histories.iter().map(|h| h.applications.len()).sum();
    let writer = output::open_output(args.output.as_deref())?;
    output::write_histories_csv(&histories, writer)?;
    info!(
        histories = histories.len(),
        applications,
        "Rental histories written"
    );
    Ok(())
}
