//! Stateful random walk over rental applications.
//!
//! Each individual goes through a random number of rounds of looking. In a
//! round they apply for properties they have never applied for before, one
//! at a time, until an application is approved or no property is left.
//! Application ids are sequential across every individual handled by the
//! same generator.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::application::{Application, ApplicationStatus, Property, RentalHistory};
use crate::config::RentalConfig;
use crate::error::RentalError;

/// Generates rental application histories for individuals.
#[derive(Debug)]
pub struct RentalHistoryGenerator<R> {
    properties: Vec<Property>,
    config: RentalConfig,
    last_application_id: u64,
    applied: BTreeMap<String, BTreeSet<String>>,
    rng: R,
}

impl RentalHistoryGenerator<StdRng> {
    /// Create a generator seeded from `config.seed`, or from the OS.
    pub fn from_config(properties: Vec<Property>, config: RentalConfig) -> Result<Self, RentalError> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(properties, config, rng)
    }
}

impl<R: Rng> RentalHistoryGenerator<R> {
    /// Create a generator drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NoProperties`] for an empty property list,
    /// [`RentalError::DuplicateProperty`] if two properties share an id, and
    /// [`RentalError::InvalidSuccessChance`] for an unusable config.
    pub fn with_rng(properties: Vec<Property>, config: RentalConfig, rng: R) -> Result<Self, RentalError> {
        config.validate()?;
        if properties.is_empty() {
            return Err(RentalError::NoProperties);
        }
        let mut ids = BTreeSet::new();
        for property in &properties {
            if !ids.insert(property.id()) {
                return Err(RentalError::DuplicateProperty(property.id().to_owned()));
            }
        }

        info!(
            properties = properties.len(),
            max_history = config.max_history,
            success_chance = config.success_chance,
            seeded = config.seed.is_some(),
            "Rental history generator ready"
        );

        Ok(Self {
            last_application_id: config.start_application_id,
            properties,
            config,
            applied: BTreeMap::new(),
            rng,
        })
    }

    /// Allocate the next application id.
    pub fn next_application_id(&mut self) -> Result<u64, RentalError> {
        self.last_application_id = self
            .last_application_id
            .checked_add(1)
            .ok_or(RentalError::ApplicationIdOverflow)?;
        Ok(self.last_application_id)
    }

    /// Pick a property `individual_id` has not applied for yet and mark it
    /// as applied. Returns `None` once every property has been tried.
    pub fn next_property_choice(&mut self, individual_id: &str) -> Option<&Property> {
        let applied = self.applied.entry(individual_id.to_owned()).or_default();
        let candidates: Vec<&Property> = self
            .properties
            .iter()
            .filter(|p| !applied.contains(p.id()))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let index = self.rng.random_range(0..candidates.len());
        let chosen = candidates.get(index).copied()?;
        applied.insert(chosen.id().to_owned());
        Some(chosen)
    }

    /// Number of distinct properties `individual_id` has applied for.
    pub fn applications_made(&self, individual_id: &str) -> usize {
        self.applied.get(individual_id).map_or(0, BTreeSet::len)
    }

    /// Generate the full rental history of one individual.
    pub fn generate(&mut self, individual_id: &str) -> Result<RentalHistory, RentalError> {
        let rounds = if self.config.max_history == 0 {
            0
        } else {
            self.rng.random_range(0..self.config.max_history)
        };

        let mut applications = Vec::new();
        'rounds: for round in 0..rounds {
            loop {
                let Some(property_id) = self
                    .next_property_choice(individual_id)
                    .map(|p| p.id().to_owned())
                else {
                    debug!(individual = individual_id, round, "No properties left to apply for");
                    break 'rounds;
                };

                let status = if self.rng.random_bool(self.config.success_chance) {
                    ApplicationStatus::Approved
                } else {
                    ApplicationStatus::Ignored
                };
                let application_id = self.next_application_id()?;
                debug!(
                    individual = individual_id,
                    round,
                    application_id,
                    %status,
                    property = %property_id,
                    "Application generated"
                );
                applications.push(Application {
                    application_id,
                    status,
                    property_id,
                });

                if status == ApplicationStatus::Approved {
                    break;
                }
            }
        }

        Ok(RentalHistory {
            individual_id: individual_id.to_owned(),
            applications,
        })
    }
}
