//! Application records and statuses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RentalError;

/// Outcome of a rental application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Submitted, no decision yet.
    #[serde(rename = "S")]
    Submitted,
    /// Approved; ends the applicant's current round of looking.
    #[serde(rename = "A")]
    Approved,
    /// Unsuccessful.
    #[serde(rename = "I")]
    Ignored,
    /// An agreed tenancy ended by either party.
    #[serde(rename = "T")]
    Terminated,
}

impl ApplicationStatus {
    /// One-letter status code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Submitted => "S",
            Self::Approved => "A",
            Self::Ignored => "I",
            Self::Terminated => "T",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Approved => write!(f, "approved"),
            Self::Ignored => write!(f, "ignored"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "submitted" => Ok(Self::Submitted),
            "a" | "approved" => Ok(Self::Approved),
            "i" | "ignored" => Ok(Self::Ignored),
            "t" | "terminated" => Ok(Self::Terminated),
            _ => Err(RentalError::UnknownStatus(s.to_owned())),
        }
    }
}

/// A property that individuals can apply to rent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    id: String,
    attributes: BTreeMap<String, String>,
}

impl Property {
    /// A property with no extra attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// A property carrying extra columns from its source record.
    pub fn with_attributes(id: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// The property identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Extra attribute by column name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One application by one individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Sequential identifier, unique per generator.
    pub application_id: u64,
    /// Outcome of the application.
    pub status: ApplicationStatus,
    /// The property applied for.
    pub property_id: String,
}

/// All applications made by one individual, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalHistory {
    /// The applicant.
    pub individual_id: String,
    /// Applications in submission order.
    pub applications: Vec<Application>,
}

impl RentalHistory {
    /// Number of approved applications, i.e. completed rounds.
    pub fn approvals(&self) -> usize {
        self.applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Approved)
            .count()
    }
}
