//! Pure price calculation: turns a validated pricing model plus a
//! quantity/duration context into a monetary result with discount and tax.
//!
//! All arithmetic runs on `rust_decimal::Decimal` so repeated additions in
//! the aggregator cannot drift at cent level.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{PricingError, PricingResult};
use crate::models::{
    CalculationBreakdown, CalculationContext, CalculationResult, PricingModel, PricingTier,
    PricingType, RecurringBreakdown, TierLine, UsageBreakdown,
};
use crate::validation::{validate_context, validate_pricing};

/// Calculate the cost of one item.
///
/// Validation runs first; no arithmetic is performed on an invalid model or
/// context. Usage below `min_usage` is a hard error while usage above
/// `max_usage` is clamped and billed at the cap — the asymmetry is observed
/// business policy and must not be "fixed".
pub fn calculate(
    model: &PricingModel,
    ctx: &CalculationContext,
) -> PricingResult<CalculationResult> {
    let mut errors = validate_pricing(model);
    errors.extend(validate_context(ctx));
    if !errors.is_empty() {
        return Err(PricingError::Validation(errors.join(", ")));
    }

    let mut breakdown = CalculationBreakdown {
        base_amount: model.base_price,
        ..CalculationBreakdown::default()
    };

    let subtotal = match model.pricing_type {
        PricingType::Flat => model.base_price * ctx.quantity.max(Decimal::ONE),
        PricingType::Recurring => {
            let periods = ctx
                .recurring_periods
                .or(model.recurring_count)
                .unwrap_or(1);
            breakdown.recurring_breakdown = Some(RecurringBreakdown {
                periods_calculated: periods,
                amount_per_period: model.base_price,
            });
            model.base_price * Decimal::from(periods)
        }
        PricingType::UsageBased if model.is_tiered() => {
            let (subtotal, lines) = allocate_tiers(&model.tiers, ctx.quantity);
            breakdown.tier_breakdown = Some(lines);
            subtotal
        }
        PricingType::UsageBased => {
            let (subtotal, usage_breakdown) = calculate_usage(model, ctx)?;
            breakdown.usage_breakdown = Some(usage_breakdown);
            subtotal
        }
    };

    let discount = subtotal * ctx.discount_percentage.unwrap_or(Decimal::ZERO) / dec!(100);
    let taxable = subtotal - discount;
    let tax = taxable * ctx.tax_percentage.unwrap_or(Decimal::ZERO) / dec!(100);

    Ok(CalculationResult {
        subtotal,
        discount,
        tax,
        total: taxable + tax,
        currency: model.currency.clone(),
        breakdown,
    })
}

fn calculate_usage(
    model: &PricingModel,
    ctx: &CalculationContext,
) -> PricingResult<(Decimal, UsageBreakdown)> {
    let price_per_unit = model.price_per_unit.unwrap_or(model.base_price);
    let requested = ctx
        .usage_amount
        .or(model.min_usage)
        .unwrap_or(Decimal::ONE);

    if let Some(minimum) = model.min_usage {
        if requested < minimum {
            return Err(PricingError::BelowMinimumUsage {
                usage: requested,
                minimum,
            });
        }
    }
    if let Some(increment) = model.usage_increment {
        if !(requested % increment).is_zero() {
            return Err(PricingError::Validation(format!(
                "Usage amount must be in increments of {increment}"
            )));
        }
    }

    let mut usage = requested;
    let mut clamped = false;
    if let Some(maximum) = model.max_usage {
        if usage > maximum {
            tracing::debug!(%requested, %maximum, "usage clamped to configured maximum");
            usage = maximum;
            clamped = true;
        }
    }

    Ok((
        usage * price_per_unit,
        UsageBreakdown {
            usage_calculated: usage,
            price_per_unit,
            clamped_to_maximum: clamped,
        },
    ))
}

/// Walk tiers in ascending `min_quantity` order, consuming quantity from each
/// band at that band's per-unit price until the full requested quantity is
/// allocated or tiers run out.
fn allocate_tiers(tiers: &[PricingTier], quantity: Decimal) -> (Decimal, Vec<TierLine>) {
    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_quantity);

    let mut remaining = quantity;
    let mut subtotal = Decimal::ZERO;
    let mut lines = Vec::new();

    for (index, tier) in sorted.iter().enumerate() {
        if remaining <= Decimal::ZERO || quantity < Decimal::from(tier.min_quantity) {
            break;
        }
        let width = match tier.max_quantity {
            Some(max) => Decimal::from(max - tier.min_quantity + 1),
            None => remaining,
        };
        let consumed = remaining.min(width);
        let amount = consumed * tier.price_per_unit;
        lines.push(TierLine {
            tier: index + 1,
            quantity: consumed,
            price_per_unit: tier.price_per_unit,
            amount,
        });
        subtotal += amount;
        remaining -= consumed;
    }

    (subtotal, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecurringInterval, UsageUnit};

    #[test]
    fn test_flat_subtotal_multiplies_quantity() {
        let model = PricingModel::flat(dec!(100), "USD");
        let result = calculate(&model, &CalculationContext::with_quantity(dec!(2))).unwrap();
        assert_eq!(result.subtotal, dec!(200));
        assert_eq!(result.discount, Decimal::ZERO);
        assert_eq!(result.tax, Decimal::ZERO);
        assert_eq!(result.total, dec!(200));
        assert_eq!(result.currency, "USD");
        assert_eq!(result.breakdown.base_amount, dec!(100));
    }

    #[test]
    fn test_flat_zero_quantity_bills_once() {
        let model = PricingModel::flat(dec!(100), "USD");
        let result = calculate(&model, &CalculationContext::with_quantity(Decimal::ZERO)).unwrap();
        assert_eq!(result.subtotal, dec!(100));
    }

    #[test]
    fn test_recurring_uses_model_count() {
        let model = PricingModel::recurring(dec!(50), "USD", RecurringInterval::Monthly, Some(3));
        let result = calculate(&model, &CalculationContext::default()).unwrap();
        assert_eq!(result.subtotal, dec!(150));
        let recurring = result.breakdown.recurring_breakdown.unwrap();
        assert_eq!(recurring.periods_calculated, 3);
        assert_eq!(recurring.amount_per_period, dec!(50));
    }

    #[test]
    fn test_recurring_context_periods_take_precedence() {
        let model = PricingModel::recurring(dec!(50), "USD", RecurringInterval::Monthly, Some(3));
        let ctx = CalculationContext {
            recurring_periods: Some(2),
            ..CalculationContext::default()
        };
        let result = calculate(&model, &ctx).unwrap();
        assert_eq!(result.subtotal, dec!(100));
    }

    #[test]
    fn test_recurring_unlimited_count_defaults_to_one_period() {
        let model = PricingModel::recurring(dec!(50), "USD", RecurringInterval::Daily, None);
        let result = calculate(&model, &CalculationContext::default()).unwrap();
        assert_eq!(result.subtotal, dec!(50));
    }

    #[test]
    fn test_usage_below_minimum_is_hard_error() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerHour, dec!(25))
            .with_usage_bounds(Some(dec!(2)), Some(dec!(24)));
        let ctx = CalculationContext {
            usage_amount: Some(dec!(1)),
            ..CalculationContext::default()
        };
        let err = calculate(&model, &ctx).unwrap_err();
        match err {
            PricingError::BelowMinimumUsage { usage, minimum } => {
                assert_eq!(usage, dec!(1));
                assert_eq!(minimum, dec!(2));
            }
            other => panic!("expected BelowMinimumUsage, got {other:?}"),
        }
    }

    #[test]
    fn test_usage_above_maximum_clamps_instead_of_erroring() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerHour, dec!(50))
            .with_usage_bounds(Some(dec!(1)), Some(dec!(10)));
        let ctx = CalculationContext {
            usage_amount: Some(dec!(12)),
            ..CalculationContext::default()
        };
        let result = calculate(&model, &ctx).unwrap();
        assert_eq!(result.subtotal, dec!(500));
        let usage = result.breakdown.usage_breakdown.unwrap();
        assert_eq!(usage.usage_calculated, dec!(10));
        assert!(usage.clamped_to_maximum);
    }

    #[test]
    fn test_usage_defaults_to_minimum_then_one() {
        let bounded = PricingModel::usage_based("USD", UsageUnit::PerHour, dec!(10))
            .with_usage_bounds(Some(dec!(4)), None);
        let result = calculate(&bounded, &CalculationContext::default()).unwrap();
        assert_eq!(result.subtotal, dec!(40));

        let unbounded = PricingModel::usage_based("USD", UsageUnit::PerHour, dec!(10));
        let result = calculate(&unbounded, &CalculationContext::default()).unwrap();
        assert_eq!(result.subtotal, dec!(10));
    }

    #[test]
    fn test_usage_increment_enforced_on_requested_amount() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerHour, dec!(10))
            .with_usage_increment(dec!(0.5));
        let ok = CalculationContext {
            usage_amount: Some(dec!(2.5)),
            ..CalculationContext::default()
        };
        assert_eq!(calculate(&model, &ok).unwrap().subtotal, dec!(25));

        let bad = CalculationContext {
            usage_amount: Some(dec!(2.3)),
            ..CalculationContext::default()
        };
        let err = calculate(&model, &bad).unwrap_err();
        assert!(matches!(err, PricingError::Validation(ref m) if m.contains("increments")));
    }

    #[test]
    fn test_tiered_allocation_spans_bands_in_order() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerItem, dec!(100)).with_tiers(
            vec![
                PricingTier::new(1, Some(10), dec!(100)),
                PricingTier::new(11, Some(20), dec!(90)),
                PricingTier::new(21, None, dec!(80)),
            ],
        );
        let result = calculate(&model, &CalculationContext::with_quantity(dec!(25))).unwrap();
        // 10 * 100 + 10 * 90 + 5 * 80
        assert_eq!(result.subtotal, dec!(2300));

        let lines = result.breakdown.tier_breakdown.unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].quantity, dec!(10));
        assert_eq!(lines[1].quantity, dec!(10));
        assert_eq!(lines[2].quantity, dec!(5));
        assert!(lines.windows(2).all(|pair| pair[0].tier < pair[1].tier));

        let allocated: Decimal = lines.iter().map(|line| line.quantity).sum();
        assert_eq!(allocated, dec!(25));
    }

    #[test]
    fn test_tiered_allocation_stops_within_first_band() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerItem, dec!(100)).with_tiers(
            vec![
                PricingTier::new(1, Some(10), dec!(100)),
                PricingTier::new(11, None, dec!(90)),
            ],
        );
        let result = calculate(&model, &CalculationContext::with_quantity(dec!(4))).unwrap();
        assert_eq!(result.subtotal, dec!(400));
        assert_eq!(result.breakdown.tier_breakdown.unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_tiers_rejected_before_arithmetic() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerItem, dec!(100)).with_tiers(
            vec![
                PricingTier::new(1, Some(10), dec!(100)),
                PricingTier::new(12, Some(20), dec!(90)),
            ],
        );
        let err = calculate(&model, &CalculationContext::with_quantity(dec!(5))).unwrap_err();
        assert!(matches!(err, PricingError::Validation(ref m) if m.contains("Tier 2")));
    }

    #[test]
    fn test_invalid_context_rejected() {
        let model = PricingModel::flat(dec!(100), "USD");
        let err = calculate(&model, &CalculationContext::with_quantity(dec!(-1))).unwrap_err();
        assert!(matches!(err, PricingError::Validation(ref m) if m.contains("Quantity")));
    }

    #[test]
    fn test_discount_and_tax_round_trip() {
        let model = PricingModel::flat(dec!(100), "USD");
        let ctx = CalculationContext {
            quantity: dec!(2),
            discount_percentage: Some(dec!(10)),
            tax_percentage: Some(dec!(8)),
            ..CalculationContext::default()
        };
        let result = calculate(&model, &ctx).unwrap();
        assert_eq!(result.subtotal, dec!(200));
        assert_eq!(result.discount, dec!(20));
        // Tax applies to the post-discount amount.
        assert_eq!(result.tax, dec!(14.4));
        assert_eq!(result.total, dec!(194.4));
        assert_eq!(result.total, (result.subtotal - result.discount) + result.tax);
    }

    #[test]
    fn test_round_trip_holds_at_percentage_extremes() {
        let model = PricingModel::flat(dec!(123.45), "USD");
        for (discount, tax) in [(dec!(0), dec!(0)), (dec!(100), dec!(100)), (dec!(33), dec!(7))] {
            let ctx = CalculationContext {
                discount_percentage: Some(discount),
                tax_percentage: Some(tax),
                ..CalculationContext::default()
            };
            let result = calculate(&model, &ctx).unwrap();
            assert_eq!(result.total, (result.subtotal - result.discount) + result.tax);
        }
    }
}
