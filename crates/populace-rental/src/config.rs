//! Rental history generator settings.

use serde::Deserialize;

use crate::error::RentalError;

/// Settings for [`RentalHistoryGenerator`](crate::RentalHistoryGenerator),
/// usually read from the `rental` section of `populace.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RentalConfig {
    /// Exclusive upper bound on the number of rounds of looking per
    /// individual. The round count is drawn uniformly from `0..max_history`.
    #[serde(default = "default_max_history")]
    pub max_history: u32,

    /// Probability that any single application is approved.
    #[serde(default = "default_success_chance")]
    pub success_chance: f64,

    /// Application ids start just after this value.
    #[serde(default)]
    pub start_application_id: u64,

    /// Seed for reproducible histories. Seeded from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            success_chance: default_success_chance(),
            start_application_id: 0,
            seed: None,
        }
    }
}

impl RentalConfig {
    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), RentalError> {
        if (0.0..=1.0).contains(&self.success_chance) {
            Ok(())
        } else {
            Err(RentalError::InvalidSuccessChance(self.success_chance))
        }
    }
}

const fn default_max_history() -> u32 {
    4
}

const fn default_success_chance() -> f64 {
    0.70
}
