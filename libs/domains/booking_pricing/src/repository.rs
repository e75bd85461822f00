//! Collaborator interfaces for fetching stored pricing records, plus
//! in-memory implementations for development and testing.
//!
//! The engine never performs persistence itself; the surrounding system
//! implements these traits against its storage backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::error::{PricingError, PricingResult};
use crate::models::{ExtrasLinkRecord, PartnerExtraRecord, SpacePackageRecord};

/// Repository for partner extras carrying original pricing and stock
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartnerExtraRepository: Send + Sync {
    /// Get a partner extra by ID
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<PartnerExtraRecord>>;
}

/// Repository for space-option-extras links carrying override records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpaceOptionExtrasRepository: Send + Sync {
    /// Get an extras link by ID
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<ExtrasLinkRecord>>;
}

/// Repository for space packages carrying their own pricing directly
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpacePackageRepository: Send + Sync {
    /// Get a space package by ID
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<SpacePackageRecord>>;
}

/// In-memory implementation of [`PartnerExtraRepository`] (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPartnerExtraRepository {
    records: Arc<RwLock<HashMap<Uuid, PartnerExtraRecord>>>,
}

impl InMemoryPartnerExtraRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: PartnerExtraRecord) -> PricingResult<()> {
        record
            .validate()
            .map_err(|e| PricingError::Validation(e.to_string()))?;
        self.records.write().await.insert(record.id, record);
        Ok(())
    }
}

#[async_trait]
impl PartnerExtraRepository for InMemoryPartnerExtraRepository {
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<PartnerExtraRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}

/// In-memory implementation of [`SpaceOptionExtrasRepository`]
#[derive(Debug, Default, Clone)]
pub struct InMemorySpaceOptionExtrasRepository {
    records: Arc<RwLock<HashMap<Uuid, ExtrasLinkRecord>>>,
}

impl InMemorySpaceOptionExtrasRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: ExtrasLinkRecord) -> PricingResult<()> {
        self.records.write().await.insert(record.id, record);
        Ok(())
    }
}

#[async_trait]
impl SpaceOptionExtrasRepository for InMemorySpaceOptionExtrasRepository {
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<ExtrasLinkRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}

/// In-memory implementation of [`SpacePackageRepository`]
#[derive(Debug, Default, Clone)]
pub struct InMemorySpacePackageRepository {
    records: Arc<RwLock<HashMap<Uuid, SpacePackageRecord>>>,
}

impl InMemorySpacePackageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: SpacePackageRecord) -> PricingResult<()> {
        record
            .validate()
            .map_err(|e| PricingError::Validation(e.to_string()))?;
        self.records.write().await.insert(record.id, record);
        Ok(())
    }
}

#[async_trait]
impl SpacePackageRepository for InMemorySpacePackageRepository {
    async fn find_by_id(&self, id: Uuid) -> PricingResult<Option<SpacePackageRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OverrideSpec, PricingModel, StockSpec};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_insert_and_find_package() {
        let repo = InMemorySpacePackageRepository::new();
        let record = SpacePackageRecord::new("Conference Room A", PricingModel::flat(dec!(100), "USD"));
        let id = record.id;

        repo.insert(record).await.unwrap();

        let fetched = repo.find_by_id(id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name, "Conference Room A");
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = InMemoryPartnerExtraRepository::new();
        let fetched = repo.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let repo = InMemoryPartnerExtraRepository::new();
        let record = PartnerExtraRecord::new(
            "",
            PricingModel::flat(dec!(25), "USD"),
            StockSpec::default(),
        );

        let result = repo.insert(record).await;
        assert!(matches!(result, Err(PricingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_and_find_link() {
        let repo = InMemorySpaceOptionExtrasRepository::new();
        let extra_id = Uuid::new_v4();
        let record = ExtrasLinkRecord::new(extra_id, OverrideSpec::none());
        let id = record.id;

        repo.insert(record).await.unwrap();

        let fetched = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.partner_extra_id, extra_id);
    }
}
