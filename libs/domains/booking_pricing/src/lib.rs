//! Booking Pricing Domain
//!
//! Override resolution and price calculation for bookable items: a space
//! package plus partner-supplied extras, each carrying flat, recurring or
//! usage-based (optionally tiered) pricing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Effective lookups, booking cost aggregation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (traits + in-memory implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────────────────────────┐
//! │ Resolver / Calculator / Compatibility   │  ← Pure computations
//! └──────┬──────────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Value objects, enums, records
//! └─────────────┘
//! ```
//!
//! Everything below the repository boundary is a pure, synchronous
//! computation over in-memory values; the only asynchronous work is the
//! repository lookups the service fans out before calculating.

pub mod calculator;
pub mod compatibility;
pub mod error;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use calculator::calculate;
pub use compatibility::check_compatibility;
pub use error::{PricingError, PricingResult};
pub use models::{
    BookingCost, CalculationBreakdown, CalculationContext, CalculationResult, CostSummary,
    EffectivePricing, EffectiveStock, ExtraCost, ExtrasLinkRecord, OverrideSpec, OverrideType,
    PartnerExtraRecord, PricingModel, PricingResolution, PricingTier, PricingType,
    RecurringBreakdown, RecurringInterval, Source, SpacePackageRecord, StockSpec, TierLine,
    UsageBreakdown, UsageUnit,
};
pub use repository::{
    InMemoryPartnerExtraRepository, InMemorySpaceOptionExtrasRepository,
    InMemorySpacePackageRepository, PartnerExtraRepository, SpaceOptionExtrasRepository,
    SpacePackageRepository,
};
pub use resolver::{resolve_effective_pricing, resolve_effective_stock};
pub use service::{BookingPricingConfig, BookingPricingService, CompatibilityEnforcement};
pub use validation::{validate_context, validate_pricing};
