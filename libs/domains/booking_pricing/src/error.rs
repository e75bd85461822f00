use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type for booking pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur in the booking pricing domain
#[derive(Debug, Error)]
pub enum PricingError {
    /// A stored pricing or override record fails validation after merging;
    /// never auto-corrected
    #[error("Invalid pricing configuration: {0}")]
    Configuration(String),

    /// A calculation request is structurally invalid; rejected before any
    /// arithmetic runs
    #[error("Pricing validation failed: {0}")]
    Validation(String),

    /// Usage below the configured minimum is rejected; usage above the
    /// maximum is clamped instead
    #[error("Usage amount {usage} is below minimum {minimum}")]
    BelowMinimumUsage { usage: Decimal, minimum: Decimal },

    /// Referenced space package does not resolve to a stored record
    #[error("Space package not found: {0}")]
    PackageNotFound(Uuid),

    /// Referenced extra or extras link does not resolve to a stored record
    #[error("Space option extra not found: {0}")]
    ExtraNotFound(Uuid),

    /// Repository backend error
    #[error("Internal error: {0}")]
    Internal(String),
}
