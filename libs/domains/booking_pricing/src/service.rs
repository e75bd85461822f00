//! Booking pricing service: resolves effective pricing and stock for stored
//! records and aggregates a booking's total cost across one package and any
//! number of extras.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::calculator::calculate;
use crate::compatibility::check_compatibility;
use crate::error::{PricingError, PricingResult};
use crate::models::{
    BookingCost, CalculationContext, CalculationResult, CostSummary, EffectivePricing,
    EffectiveStock, ExtraCost, ExtrasLinkRecord, PartnerExtraRecord, PricingResolution,
};
use crate::repository::{
    PartnerExtraRepository, SpaceOptionExtrasRepository, SpacePackageRepository,
};
use crate::resolver::{resolve_effective_pricing, resolve_effective_stock};

/// Whether compatibility findings block aggregation or are left to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityEnforcement {
    /// Findings are reported by `check_compatibility` only; aggregation
    /// proceeds regardless
    #[default]
    Advisory,
    /// Any finding between the package and an extra fails aggregation
    Enforce,
}

/// Service configuration
#[derive(Debug, Clone, Default)]
pub struct BookingPricingConfig {
    pub compatibility: CompatibilityEnforcement,
}

/// Service for pricing bookable items and aggregating booking costs
#[derive(Clone)]
pub struct BookingPricingService<P, L, K>
where
    P: PartnerExtraRepository,
    L: SpaceOptionExtrasRepository,
    K: SpacePackageRepository,
{
    partner_extras: Arc<P>,
    links: Arc<L>,
    packages: Arc<K>,
    config: BookingPricingConfig,
}

impl<P, L, K> BookingPricingService<P, L, K>
where
    P: PartnerExtraRepository,
    L: SpaceOptionExtrasRepository,
    K: SpacePackageRepository,
{
    /// Create a new booking pricing service
    pub fn new(partner_extras: P, links: L, packages: K) -> Self {
        Self {
            partner_extras: Arc::new(partner_extras),
            links: Arc::new(links),
            packages: Arc::new(packages),
            config: BookingPricingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BookingPricingConfig) -> Self {
        self.config = config;
        self
    }

    async fn link_with_extra(
        &self,
        link_id: Uuid,
    ) -> PricingResult<(ExtrasLinkRecord, PartnerExtraRecord)> {
        let link = self
            .links
            .find_by_id(link_id)
            .await?
            .ok_or(PricingError::ExtraNotFound(link_id))?;
        let extra = self
            .partner_extras
            .find_by_id(link.partner_extra_id)
            .await?
            .ok_or(PricingError::ExtraNotFound(link.partner_extra_id))?;
        Ok((link, extra))
    }

    /// Resolve the effective pricing for one space-option-extras link
    #[instrument(skip(self))]
    pub async fn effective_pricing(&self, link_id: Uuid) -> PricingResult<PricingResolution> {
        let (link, extra) = self.link_with_extra(link_id).await?;
        resolve_effective_pricing(&extra.pricing, &link.override_spec)
    }

    /// Resolve the effective stock constraints for one space-option-extras link
    #[instrument(skip(self))]
    pub async fn effective_stock(&self, link_id: Uuid) -> PricingResult<EffectiveStock> {
        let (link, extra) = self.link_with_extra(link_id).await?;
        Ok(resolve_effective_stock(
            &extra.stock,
            link.override_stock_quantity,
            link.override_min_order_quantity,
            link.override_max_order_quantity,
        ))
    }

    /// Run the compatibility check between a stored package and one extras link
    #[instrument(skip(self))]
    pub async fn check_booking_compatibility(
        &self,
        package_id: Uuid,
        link_id: Uuid,
    ) -> PricingResult<Vec<String>> {
        let package = self
            .packages
            .find_by_id(package_id)
            .await?
            .ok_or(PricingError::PackageNotFound(package_id))?;
        match self.effective_pricing(link_id).await? {
            PricingResolution::Priced(effective) => Ok(check_compatibility(
                None,
                Some(&package.pricing),
                Some(&effective.model),
            )),
            PricingResolution::Unavailable => Ok(Vec::new()),
        }
    }

    /// `None` means the extra is disabled for this listing and is excluded
    /// from aggregation.
    async fn resolve_extra(
        &self,
        link_id: Uuid,
    ) -> PricingResult<Option<(Uuid, EffectivePricing)>> {
        match self.effective_pricing(link_id).await? {
            PricingResolution::Priced(effective) => Ok(Some((link_id, effective))),
            PricingResolution::Unavailable => {
                tracing::debug!(%link_id, "extra disabled for this listing, excluded from booking cost");
                Ok(None)
            }
        }
    }

    /// Aggregate the total cost of a booking: one package plus any number of
    /// extras, all priced with the same calculation context.
    ///
    /// Extras lookups fan out concurrently. A disabled extra is excluded; any
    /// other failure (unknown ID, broken configuration) fails the whole
    /// aggregation — a booking must never be priced with a silently omitted
    /// line item. The aggregate currency is taken from the package result;
    /// currency consistency is the caller's responsibility unless
    /// [`CompatibilityEnforcement::Enforce`] is configured.
    #[instrument(skip(self, ctx), fields(extras = extras_ids.len()))]
    pub async fn aggregate_booking_cost(
        &self,
        package_id: Uuid,
        extras_ids: &[Uuid],
        ctx: &CalculationContext,
    ) -> PricingResult<BookingCost> {
        let package = self
            .packages
            .find_by_id(package_id)
            .await?
            .ok_or(PricingError::PackageNotFound(package_id))?;
        let package_cost = calculate(&package.pricing, ctx)?;

        let resolutions =
            try_join_all(extras_ids.iter().map(|id| self.resolve_extra(*id))).await?;

        let mut extras_costs = Vec::new();
        for (extra_id, effective) in resolutions.into_iter().flatten() {
            if self.config.compatibility == CompatibilityEnforcement::Enforce {
                let findings =
                    check_compatibility(None, Some(&package.pricing), Some(&effective.model));
                if !findings.is_empty() {
                    return Err(PricingError::Configuration(findings.join(", ")));
                }
            }
            let cost = calculate(&effective.model, ctx)?;
            extras_costs.push(ExtraCost { extra_id, cost });
        }

        let total_cost = sum_costs(&package_cost, &extras_costs);
        tracing::debug!(
            package_id = %package_id,
            extras_priced = extras_costs.len(),
            total = %total_cost.total,
            "booking cost aggregated"
        );

        Ok(BookingCost {
            package_cost,
            extras_costs,
            total_cost,
        })
    }
}

fn sum_costs(package_cost: &CalculationResult, extras_costs: &[ExtraCost]) -> CostSummary {
    let mut summary = CostSummary {
        subtotal: package_cost.subtotal,
        discount: package_cost.discount,
        tax: package_cost.tax,
        total: package_cost.total,
        currency: package_cost.currency.clone(),
    };
    for extra in extras_costs {
        summary.subtotal += extra.cost.subtotal;
        summary.discount += extra.cost.discount;
        summary.tax += extra.cost.tax;
        summary.total += extra.cost.total;
    }
    summary
}
