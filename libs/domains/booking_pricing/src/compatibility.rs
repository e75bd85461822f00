//! Cross-entity compatibility rules checked before a booking is priced.
//!
//! Findings are advisory: the checker reports, the caller decides whether to
//! block. See `BookingPricingConfig` for the enforcement switch used by the
//! aggregator.

use crate::models::{PricingModel, PricingType};

/// Pairings of (package pricing type, extra pricing type) that cannot be
/// booked together. Extend here as new business rules appear.
const FORBIDDEN_PAIRINGS: &[(PricingType, PricingType, &str)] = &[(
    PricingType::UsageBased,
    PricingType::Recurring,
    "Usage-based packages cannot have recurring extras",
)];

/// Check pricing compatibility across a space, a package and an extra.
///
/// Any argument may be absent; only supplied models participate.
pub fn check_compatibility(
    space_pricing: Option<&PricingModel>,
    package_pricing: Option<&PricingModel>,
    extras_pricing: Option<&PricingModel>,
) -> Vec<String> {
    let mut findings = Vec::new();

    let mut currencies: Vec<&str> = Vec::new();
    for model in [space_pricing, package_pricing, extras_pricing]
        .into_iter()
        .flatten()
    {
        if !currencies.contains(&model.currency.as_str()) {
            currencies.push(model.currency.as_str());
        }
    }
    if currencies.len() > 1 {
        findings.push(format!("Currency mismatch: {}", currencies.join(", ")));
    }

    if let (Some(package), Some(extras)) = (package_pricing, extras_pricing) {
        for (package_type, extras_type, message) in FORBIDDEN_PAIRINGS {
            if package.pricing_type == *package_type && extras.pricing_type == *extras_type {
                findings.push((*message).to_string());
            }
        }
    }

    findings
}
