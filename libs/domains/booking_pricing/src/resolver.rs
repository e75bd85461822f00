//! Override resolution: merges a partner's base pricing and stock
//! configuration with a space-option listing's override record into the
//! effective values used for calculation.
//!
//! Resolution is pure and idempotent. Every overridable field flows through a
//! named setter on the merge tracker, so `applied_fields` is a structural
//! side-effect of the merge rather than a hand-maintained list.

use rust_decimal::Decimal;

use crate::error::{PricingError, PricingResult};
use crate::models::{
    EffectivePricing, EffectiveStock, OverrideSpec, OverrideType, PricingModel,
    PricingResolution, PricingTier, PricingType, RecurringInterval, Source, StockSpec, UsageUnit,
};
use crate::validation::validate_pricing;

/// Accumulates field overwrites on a copy of the original model.
struct MergedPricing {
    model: PricingModel,
    applied: Vec<String>,
}

impl MergedPricing {
    fn new(original: &PricingModel) -> Self {
        Self {
            model: original.clone(),
            applied: Vec::new(),
        }
    }

    fn set_pricing_type(&mut self, value: Option<PricingType>) {
        if let Some(pricing_type) = value {
            self.model.pricing_type = pricing_type;
            self.applied.push("pricing_type".to_string());
        }
    }

    fn set_base_price(&mut self, value: Option<Decimal>) {
        if let Some(base_price) = value {
            self.model.base_price = base_price;
            self.applied.push("base_price".to_string());
        }
    }

    fn set_currency(&mut self, value: Option<&str>) {
        if let Some(currency) = value {
            self.model.currency = currency.to_string();
            self.applied.push("currency".to_string());
        }
    }

    fn set_recurring_interval(&mut self, value: Option<RecurringInterval>) {
        if let Some(interval) = value {
            self.model.recurring_interval = Some(interval);
            self.applied.push("recurring_interval".to_string());
        }
    }

    fn set_recurring_count(&mut self, value: Option<u32>) {
        if let Some(count) = value {
            self.model.recurring_count = Some(count);
            self.applied.push("recurring_count".to_string());
        }
    }

    fn set_usage_unit(&mut self, value: Option<UsageUnit>) {
        if let Some(unit) = value {
            self.model.usage_unit = Some(unit);
            self.applied.push("usage_unit".to_string());
        }
    }

    fn set_price_per_unit(&mut self, value: Option<Decimal>) {
        if let Some(price) = value {
            self.model.price_per_unit = Some(price);
            self.applied.push("price_per_unit".to_string());
        }
    }

    fn set_min_usage(&mut self, value: Option<Decimal>) {
        if let Some(min) = value {
            self.model.min_usage = Some(min);
            self.applied.push("min_usage".to_string());
        }
    }

    fn set_max_usage(&mut self, value: Option<Decimal>) {
        if let Some(max) = value {
            self.model.max_usage = Some(max);
            self.applied.push("max_usage".to_string());
        }
    }

    fn set_usage_increment(&mut self, value: Option<Decimal>) {
        if let Some(increment) = value {
            self.model.usage_increment = Some(increment);
            self.applied.push("usage_increment".to_string());
        }
    }

    fn set_tiers(&mut self, value: Option<&[PricingTier]>) {
        if let Some(tiers) = value {
            self.model.tiers = tiers.to_vec();
            self.applied.push("tiers".to_string());
        }
    }

    /// A merged model must still satisfy the pricing validator; violations
    /// surface as configuration errors, never silently coerced values.
    fn finish(self) -> PricingResult<PricingResolution> {
        let errors = validate_pricing(&self.model);
        if !errors.is_empty() {
            return Err(PricingError::Configuration(errors.join(", ")));
        }
        Ok(PricingResolution::Priced(EffectivePricing {
            model: self.model,
            source: Source::Override,
            applied_fields: self.applied,
        }))
    }
}

/// Resolve the effective pricing model for an item given its original
/// pricing and a listing override.
///
/// `Disabled` short-circuits to [`PricingResolution::Unavailable`]: the item
/// is not purchasable through this listing and must be excluded from cost
/// aggregation, not priced at zero.
pub fn resolve_effective_pricing(
    original: &PricingModel,
    spec: &OverrideSpec,
) -> PricingResult<PricingResolution> {
    match spec.override_type {
        OverrideType::Disabled => Ok(PricingResolution::Unavailable),
        OverrideType::None => Ok(PricingResolution::Priced(EffectivePricing {
            model: original.clone(),
            source: Source::Original,
            applied_fields: Vec::new(),
        })),
        OverrideType::PriceOnly => {
            let mut merged = MergedPricing::new(original);
            merged.set_base_price(spec.base_price);
            merged.set_currency(spec.currency.as_deref());
            merged.finish()
        }
        OverrideType::FullOverride => {
            let mut merged = MergedPricing::new(original);
            merged.set_pricing_type(spec.pricing_type);
            merged.set_base_price(spec.base_price);
            merged.set_currency(spec.currency.as_deref());
            merged.set_recurring_interval(spec.recurring_interval);
            merged.set_recurring_count(spec.recurring_count);
            merged.set_usage_unit(spec.usage_unit);
            merged.set_price_per_unit(spec.price_per_unit);
            merged.set_min_usage(spec.min_usage);
            merged.set_max_usage(spec.max_usage);
            merged.set_usage_increment(spec.usage_increment);
            merged.set_tiers(spec.tiers.as_deref());
            merged.finish()
        }
    }
}

/// Resolve effective stock constraints. Each override field independently
/// replaces the corresponding original field when present.
///
/// An unset stock quantity means unlimited, which is available by definition.
pub fn resolve_effective_stock(
    original: &StockSpec,
    stock_quantity: Option<u32>,
    min_order_quantity: Option<u32>,
    max_order_quantity: Option<u32>,
) -> EffectiveStock {
    let mut stock = original.clone();
    let mut applied: Vec<String> = Vec::new();

    if let Some(quantity) = stock_quantity {
        stock.stock_quantity = Some(quantity);
        applied.push("stock_quantity".to_string());
    }
    if let Some(min) = min_order_quantity {
        stock.min_order_quantity = min;
        applied.push("min_order_quantity".to_string());
    }
    if let Some(max) = max_order_quantity {
        stock.max_order_quantity = Some(max);
        applied.push("max_order_quantity".to_string());
    }

    let source = if applied.is_empty() {
        Source::Original
    } else {
        Source::Override
    };
    let is_available = stock.stock_quantity.is_none_or(|quantity| quantity > 0);

    EffectiveStock {
        stock,
        is_available,
        source,
        applied_fields: applied,
    }
}
