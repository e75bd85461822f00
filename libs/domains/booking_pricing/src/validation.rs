//! Structural and business-rule validation for pricing models and
//! calculation contexts.
//!
//! Validators accumulate every violation and return the full report rather
//! than failing fast, so callers can surface a complete picture of a broken
//! configuration in one pass.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{CalculationContext, PricingModel, PricingTier, PricingType};

/// Validate a pricing model; an empty report means the model is valid.
pub fn validate_pricing(model: &PricingModel) -> Vec<String> {
    let mut errors = Vec::new();

    match model.pricing_type {
        PricingType::Flat | PricingType::Recurring => {
            if model.base_price <= Decimal::ZERO {
                errors.push("Base price must be greater than 0".to_string());
            }
        }
        // A zero base price is legal for usage-based pricing, where the
        // price comes from price_per_unit.
        PricingType::UsageBased => {
            if model.base_price < Decimal::ZERO {
                errors.push("Base price cannot be negative".to_string());
            }
        }
    }

    if model.currency.len() != 3 {
        errors.push("Valid 3-letter currency code is required".to_string());
    }

    match model.pricing_type {
        PricingType::Flat => {}
        PricingType::Recurring => {
            if model.recurring_interval.is_none() {
                errors.push("Recurring interval is required for recurring pricing".to_string());
            }
            if model.recurring_count == Some(0) {
                errors.push("Recurring count must be greater than 0".to_string());
            }
        }
        PricingType::UsageBased => {
            if model.usage_unit.is_none() {
                errors.push("Usage unit is required for usage-based pricing".to_string());
            }
            match model.price_per_unit {
                Some(price) if price > Decimal::ZERO => {}
                _ => errors.push(
                    "Price per unit must be greater than 0 for usage-based pricing".to_string(),
                ),
            }
            if let (Some(min), Some(max)) = (model.min_usage, model.max_usage) {
                if min > max {
                    errors
                        .push("Minimum usage cannot be greater than maximum usage".to_string());
                }
            }
            if let Some(increment) = model.usage_increment {
                if increment <= Decimal::ZERO {
                    errors.push("Usage increment must be greater than 0".to_string());
                }
            }
        }
    }

    if !model.tiers.is_empty() {
        validate_tiers(&model.tiers, &mut errors);
    }

    errors
}

/// Tier bands must be individually well-formed and, sorted by
/// `min_quantity`, contiguous: each tier starts at the previous tier's
/// `max_quantity + 1`. Tier indices in messages are 1-based.
fn validate_tiers(tiers: &[PricingTier], errors: &mut Vec<String>) {
    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_quantity);

    for (i, tier) in sorted.iter().enumerate() {
        if tier.min_quantity == 0 {
            errors.push(format!(
                "Tier {}: Minimum quantity must be greater than 0",
                i + 1
            ));
        }
        if tier.price_per_unit <= Decimal::ZERO {
            errors.push(format!(
                "Tier {}: Price per unit must be greater than 0",
                i + 1
            ));
        }
        if let Some(max) = tier.max_quantity {
            if max <= tier.min_quantity {
                errors.push(format!(
                    "Tier {}: Maximum quantity must be greater than minimum quantity",
                    i + 1
                ));
            }
        }
        if i > 0 {
            match sorted[i - 1].max_quantity {
                Some(prev_max) if tier.min_quantity != prev_max + 1 => {
                    errors.push(format!(
                        "Tier {}: Gap or overlap detected with previous tier",
                        i + 1
                    ));
                }
                None => {
                    errors.push(format!(
                        "Tier {}: Previous tier is open-ended and must be last",
                        i + 1
                    ));
                }
                _ => {}
            }
        }
    }
}

/// Validate a calculation context; an empty report means the context is valid.
pub fn validate_context(ctx: &CalculationContext) -> Vec<String> {
    let mut errors = Vec::new();

    if ctx.quantity < Decimal::ZERO {
        errors.push("Quantity cannot be negative".to_string());
    }
    if ctx.duration == 0 {
        errors.push("Duration must be greater than 0".to_string());
    }
    if let Some(usage) = ctx.usage_amount {
        if usage < Decimal::ZERO {
            errors.push("Usage amount cannot be negative".to_string());
        }
    }
    if ctx.recurring_periods == Some(0) {
        errors.push("Recurring periods must be greater than 0".to_string());
    }
    for (label, value) in [
        ("Discount", ctx.discount_percentage),
        ("Tax", ctx.tax_percentage),
    ] {
        if let Some(percentage) = value {
            if percentage < Decimal::ZERO || percentage > dec!(100) {
                errors.push(format!("{label} percentage must be between 0 and 100"));
            }
        }
    }

    errors
}
