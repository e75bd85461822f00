use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Pricing model discriminant
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingType {
    #[default]
    Flat,
    Recurring,
    UsageBased,
}

/// Billing interval for recurring pricing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecurringInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Unit of measure for usage-based pricing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UsageUnit {
    PerPerson,
    PerHour,
    PerDay,
    PerItem,
    PerSession,
}

/// How a space-option listing modifies a partner extra's base configuration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverrideType {
    #[default]
    None,
    PriceOnly,
    FullOverride,
    Disabled,
}

/// Whether an effective value came from the partner's base record or a listing override
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Original,
    Override,
}

/// One quantity band of a tiered price schedule
///
/// Bands must be contiguous: a tier's `min_quantity` is the previous tier's
/// `max_quantity + 1`. Only the last tier may leave `max_quantity` unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
    pub price_per_unit: Decimal,
}

impl PricingTier {
    pub fn new(min_quantity: u32, max_quantity: Option<u32>, price_per_unit: Decimal) -> Self {
        Self {
            min_quantity,
            max_quantity,
            price_per_unit,
        }
    }
}

/// One bookable item's price definition
///
/// A single struct with an explicit `pricing_type` discriminant; only the
/// fields relevant to the active type are populated, and
/// `validation::validate_pricing` enforces that shape. Values are immutable —
/// override resolution always produces a new model rather than mutating one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    pub pricing_type: PricingType,
    pub base_price: Decimal,
    /// 3-letter ISO code, uppercase
    pub currency: String,
    pub recurring_interval: Option<RecurringInterval>,
    pub recurring_count: Option<u32>,
    pub usage_unit: Option<UsageUnit>,
    pub price_per_unit: Option<Decimal>,
    pub min_usage: Option<Decimal>,
    pub max_usage: Option<Decimal>,
    /// Step constraint on usage amounts (e.g. bill per half hour)
    pub usage_increment: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<PricingTier>,
}

impl PricingModel {
    /// One-time flat rate
    pub fn flat(base_price: Decimal, currency: impl Into<String>) -> Self {
        Self {
            pricing_type: PricingType::Flat,
            base_price,
            currency: currency.into(),
            recurring_interval: None,
            recurring_count: None,
            usage_unit: None,
            price_per_unit: None,
            min_usage: None,
            max_usage: None,
            usage_increment: None,
            tiers: Vec::new(),
        }
    }

    /// Recurring rate billed per interval; `count = None` means unlimited
    pub fn recurring(
        base_price: Decimal,
        currency: impl Into<String>,
        interval: RecurringInterval,
        count: Option<u32>,
    ) -> Self {
        Self {
            pricing_type: PricingType::Recurring,
            recurring_interval: Some(interval),
            recurring_count: count,
            ..Self::flat(base_price, currency)
        }
    }

    /// Usage-based rate; `base_price` is zero, the price comes from `price_per_unit`
    pub fn usage_based(
        currency: impl Into<String>,
        unit: UsageUnit,
        price_per_unit: Decimal,
    ) -> Self {
        Self {
            pricing_type: PricingType::UsageBased,
            usage_unit: Some(unit),
            price_per_unit: Some(price_per_unit),
            ..Self::flat(Decimal::ZERO, currency)
        }
    }

    pub fn with_usage_bounds(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_usage = min;
        self.max_usage = max;
        self
    }

    pub fn with_usage_increment(mut self, increment: Decimal) -> Self {
        self.usage_increment = Some(increment);
        self
    }

    pub fn with_tiers(mut self, tiers: Vec<PricingTier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Tiered pricing is usage-based pricing with a non-empty tier schedule
    pub fn is_tiered(&self) -> bool {
        self.pricing_type == PricingType::UsageBased && !self.tiers.is_empty()
    }
}

/// How a listing redefines a partner extra's pricing
///
/// Only the fields relevant to `override_type` are read during resolution:
/// `PriceOnly` consults `base_price` and `currency`, `FullOverride` consults
/// everything, `Disabled` short-circuits before any field is read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverrideSpec {
    pub override_type: OverrideType,
    pub pricing_type: Option<PricingType>,
    pub base_price: Option<Decimal>,
    pub currency: Option<String>,
    pub recurring_interval: Option<RecurringInterval>,
    pub recurring_count: Option<u32>,
    pub usage_unit: Option<UsageUnit>,
    pub price_per_unit: Option<Decimal>,
    pub min_usage: Option<Decimal>,
    pub max_usage: Option<Decimal>,
    pub usage_increment: Option<Decimal>,
    pub tiers: Option<Vec<PricingTier>>,
}

impl OverrideSpec {
    /// Pass-through: the partner's base configuration applies unchanged
    pub fn none() -> Self {
        Self::default()
    }

    /// The item is not purchasable through this listing at all
    pub fn disabled() -> Self {
        Self {
            override_type: OverrideType::Disabled,
            ..Self::default()
        }
    }

    pub fn price_only(base_price: Option<Decimal>, currency: Option<String>) -> Self {
        Self {
            override_type: OverrideType::PriceOnly,
            base_price,
            currency,
            ..Self::default()
        }
    }
}

/// Stock and order-quantity constraints for a partner extra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSpec {
    /// Unset means unlimited stock
    pub stock_quantity: Option<u32>,
    #[serde(default = "default_min_order_quantity")]
    pub min_order_quantity: u32,
    pub max_order_quantity: Option<u32>,
}

fn default_min_order_quantity() -> u32 {
    1
}

impl Default for StockSpec {
    fn default() -> Self {
        Self {
            stock_quantity: None,
            min_order_quantity: 1,
            max_order_quantity: None,
        }
    }
}

/// Effective pricing after merging an original model with a listing override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivePricing {
    pub model: PricingModel,
    pub source: Source,
    /// Names of the fields the override actually replaced; empty for `Original`
    pub applied_fields: Vec<String>,
}

/// Outcome of override resolution
///
/// `Unavailable` is a sentinel, not an error: a `Disabled` override means the
/// item must be excluded from aggregation, never priced at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PricingResolution {
    Priced(EffectivePricing),
    Unavailable,
}

impl PricingResolution {
    pub fn is_available(&self) -> bool {
        matches!(self, PricingResolution::Priced(_))
    }

    pub fn into_priced(self) -> Option<EffectivePricing> {
        match self {
            PricingResolution::Priced(effective) => Some(effective),
            PricingResolution::Unavailable => None,
        }
    }
}

/// Effective stock constraints after merging original and override values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStock {
    pub stock: StockSpec,
    pub is_available: bool,
    pub source: Source,
    pub applied_fields: Vec<String>,
}

impl EffectiveStock {
    /// Whether an order for `quantity` units satisfies the effective
    /// min/max order bounds and remaining stock
    pub fn allows_quantity(&self, quantity: u32) -> bool {
        if !self.is_available {
            return false;
        }
        if quantity < self.stock.min_order_quantity {
            return false;
        }
        if let Some(max) = self.stock.max_order_quantity {
            if quantity > max {
                return false;
            }
        }
        if let Some(stock) = self.stock.stock_quantity {
            if quantity > stock {
                return false;
            }
        }
        true
    }
}

/// Quantity, duration and adjustment inputs for one calculation
///
/// Shared across every line item of a booking. Percentages are expressed in
/// `[0, 100]`; see `validation::validate_context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationContext {
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default = "default_duration")]
    pub duration: u32,
    pub usage_amount: Option<Decimal>,
    pub recurring_periods: Option<u32>,
    pub discount_percentage: Option<Decimal>,
    pub tax_percentage: Option<Decimal>,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

fn default_duration() -> u32 {
    1
}

impl Default for CalculationContext {
    fn default() -> Self {
        Self {
            quantity: Decimal::ONE,
            duration: 1,
            usage_amount: None,
            recurring_periods: None,
            discount_percentage: None,
            tax_percentage: None,
        }
    }
}

impl CalculationContext {
    pub fn with_quantity(quantity: Decimal) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }
}

/// One consumed band of a tiered calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLine {
    /// 1-based tier index in ascending `min_quantity` order
    pub tier: usize,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub amount: Decimal,
}

/// Period detail for a recurring calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringBreakdown {
    pub periods_calculated: u32,
    pub amount_per_period: Decimal,
}

/// Usage detail for a usage-based calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageBreakdown {
    pub usage_calculated: Decimal,
    pub price_per_unit: Decimal,
    /// Requested usage exceeded `max_usage` and was billed at the cap
    pub clamped_to_maximum: bool,
}

/// Itemized detail of how a subtotal was produced, specific to the pricing type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    #[serde(default)]
    pub base_amount: Decimal,
    pub tier_breakdown: Option<Vec<TierLine>>,
    pub recurring_breakdown: Option<RecurringBreakdown>,
    pub usage_breakdown: Option<UsageBreakdown>,
}

/// Monetary outcome of pricing one item
///
/// `total = (subtotal - discount) + tax` holds exactly; tax applies to the
/// post-discount amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub breakdown: CalculationBreakdown,
}

/// Calculated cost of one extra line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCost {
    pub extra_id: Uuid,
    pub cost: CalculationResult,
}

/// Booking-level totals summed across the package and all extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
}

/// Full auditable result of booking cost aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCost {
    pub package_cost: CalculationResult,
    pub extras_costs: Vec<ExtraCost>,
    pub total_cost: CostSummary,
}

/// A space package as stored by the surrounding system
///
/// Packages carry their own pricing directly; there is no override layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpacePackageRecord {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub pricing: PricingModel,
    pub created_at: DateTime<Utc>,
}

impl SpacePackageRecord {
    pub fn new(name: impl Into<String>, pricing: PricingModel) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pricing,
            created_at: Utc::now(),
        }
    }
}

/// A partner-supplied extra with its base pricing and stock configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PartnerExtraRecord {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub pricing: PricingModel,
    #[serde(default)]
    pub stock: StockSpec,
    pub created_at: DateTime<Utc>,
}

impl PartnerExtraRecord {
    pub fn new(name: impl Into<String>, pricing: PricingModel, stock: StockSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pricing,
            stock,
            created_at: Utc::now(),
        }
    }
}

/// The link binding one partner extra to one space option, carrying the
/// listing's pricing override and optional stock overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrasLinkRecord {
    pub id: Uuid,
    pub partner_extra_id: Uuid,
    pub override_spec: OverrideSpec,
    pub override_stock_quantity: Option<u32>,
    pub override_min_order_quantity: Option<u32>,
    pub override_max_order_quantity: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl ExtrasLinkRecord {
    pub fn new(partner_extra_id: Uuid, override_spec: OverrideSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_extra_id,
            override_spec,
            override_stock_quantity: None,
            override_min_order_quantity: None,
            override_max_order_quantity: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_stock_overrides(
        mut self,
        stock_quantity: Option<u32>,
        min_order_quantity: Option<u32>,
        max_order_quantity: Option<u32>,
    ) -> Self {
        self.override_stock_quantity = stock_quantity;
        self.override_min_order_quantity = min_order_quantity;
        self.override_max_order_quantity = max_order_quantity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_constructor() {
        let model = PricingModel::flat(dec!(100), "USD");
        assert_eq!(model.pricing_type, PricingType::Flat);
        assert_eq!(model.base_price, dec!(100));
        assert_eq!(model.currency, "USD");
        assert!(model.tiers.is_empty());
        assert!(!model.is_tiered());
    }

    #[test]
    fn test_usage_based_with_tiers_is_tiered() {
        let model = PricingModel::usage_based("USD", UsageUnit::PerItem, dec!(10))
            .with_tiers(vec![PricingTier::new(1, None, dec!(10))]);
        assert!(model.is_tiered());
    }

    #[test]
    fn test_stock_spec_default() {
        let stock = StockSpec::default();
        assert_eq!(stock.stock_quantity, None);
        assert_eq!(stock.min_order_quantity, 1);
        assert_eq!(stock.max_order_quantity, None);
    }

    #[test]
    fn test_enum_serde_values() {
        assert_eq!(
            serde_json::to_string(&PricingType::UsageBased).unwrap(),
            "\"usage_based\""
        );
        assert_eq!(
            serde_json::to_string(&OverrideType::PriceOnly).unwrap(),
            "\"price_only\""
        );
        assert_eq!(
            serde_json::to_string(&UsageUnit::PerPerson).unwrap(),
            "\"per_person\""
        );
    }

    #[test]
    fn test_pricing_model_serde_round_trip() {
        let model = PricingModel::recurring(
            dec!(49.99),
            "EUR",
            RecurringInterval::Monthly,
            Some(12),
        );
        let json = serde_json::to_string(&model).unwrap();
        let back: PricingModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_calculation_context_defaults() {
        let ctx = CalculationContext::default();
        assert_eq!(ctx.quantity, Decimal::ONE);
        assert_eq!(ctx.duration, 1);
        assert!(ctx.discount_percentage.is_none());
    }
}
