//! Rental application histories for synthetic populations.
//!
//! Given a roster of individuals and a list of properties, the
//! [`RentalHistoryGenerator`] produces, per individual, an ordered sequence
//! of applications. Each individual looks for a home a random number of
//! times; each round of looking ends at the first approved application or
//! when every property has been tried. Nobody applies for the same property
//! twice.
//!
//! # Modules
//!
//! - [`application`] -- [`ApplicationStatus`], [`Application`], [`Property`],
//!   and [`RentalHistory`] records.
//! - [`config`] -- [`RentalConfig`] generator settings.
//! - [`generator`] -- The [`RentalHistoryGenerator`] random walk.
//!
//! # Usage
//!
//! ```
//! use populace_rental::{Property, RentalConfig, RentalHistoryGenerator};
//!
//! let properties = vec![Property::new("p1"), Property::new("p2")];
//! let config = RentalConfig { seed: Some(7), ..RentalConfig::default() };
//! let mut generator = RentalHistoryGenerator::from_config(properties, config).unwrap();
//!
//! let history = generator.generate("1").unwrap();
//! assert!(history.applications.len() <= 2);
//! ```

pub mod application;
pub mod config;
pub mod error;
pub mod generator;

pub use application::{Application, ApplicationStatus, Property, RentalHistory};
pub use config::RentalConfig;
pub use error::RentalError;
pub use generator::RentalHistoryGenerator;
