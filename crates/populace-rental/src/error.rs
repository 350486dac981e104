//! Error types for the populace-rental crate.

/// Errors that can occur while generating rental histories.
#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    /// The approval probability is outside `[0, 1]`.
    #[error("success chance must be within [0, 1], got {0}")]
    InvalidSuccessChance(f64),

    /// No properties were supplied to apply for.
    #[error("at least one property is required")]
    NoProperties,

    /// Two properties share an identifier.
    #[error("duplicate property id: {0}")]
    DuplicateProperty(String),

    /// Application identifiers are exhausted.
    #[error("application id overflow")]
    ApplicationIdOverflow,

    /// A status code is not one of `S`, `A`, `I`, `T`.
    #[error("unknown application status: {0:?}")]
    UnknownStatus(String),
}
