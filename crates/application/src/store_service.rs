use std::sync::Arc;

use vitrine_core::{AppError, AppResult, NonEmptyString, Principal, StoreId};
use vitrine_domain::{Store, StoreOverview};

use crate::catalog_ports::{CatalogRepository, StoreDeleteOutcome, StoreRepository};
use crate::{OwnershipService, require_principal};

/// Application service for store tenants and their dashboard overview.
#[derive(Clone)]
pub struct StoreService {
    stores: Arc<dyn StoreRepository>,
    catalog: Arc<dyn CatalogRepository>,
    ownership: OwnershipService,
}

impl StoreService {
    /// Creates a new store service.
    #[must_use]
    pub fn new(
        stores: Arc<dyn StoreRepository>,
        catalog: Arc<dyn CatalogRepository>,
        ownership: OwnershipService,
    ) -> Self {
        Self {
            stores,
            catalog,
            ownership,
        }
    }

    /// Creates a store owned by the calling principal.
    pub async fn create_store(&self, principal: Option<&Principal>, name: &str) -> AppResult<Store> {
        let principal = require_principal(principal)?;
        let name = store_name(name)?;

        let store = self.stores.create_store(principal.subject(), name).await?;
        tracing::info!(store_id = %store.id(), owner = principal.subject(), "store created");
        Ok(store)
    }

    /// Lists the caller's stores, oldest first.
    pub async fn list_owned_stores(&self, principal: Option<&Principal>) -> AppResult<Vec<Store>> {
        let principal = require_principal(principal)?;
        self.stores.list_stores_for_owner(principal.subject()).await
    }

    /// Returns one store owned by the caller.
    pub async fn get_store(&self, principal: Option<&Principal>, store_id: &str) -> AppResult<Store> {
        let store_id = self.require_owned_store(principal, store_id).await?;
        self.stores
            .find_store(store_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store '{store_id}' does not exist")))
    }

    /// Renames a store owned by the caller.
    pub async fn rename_store(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        name: &str,
    ) -> AppResult<Store> {
        let store_id = self.require_owned_store(principal, store_id).await?;
        let name = store_name(name)?;
        self.stores.rename_store(store_id, name).await
    }

    /// Deletes an empty store owned by the caller.
    pub async fn delete_store(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
    ) -> AppResult<Store> {
        let store_id = self.require_owned_store(principal, store_id).await?;

        match self.stores.delete_empty_store(store_id).await? {
            StoreDeleteOutcome::Deleted(store) => {
                tracing::info!(store_id = %store_id, "store deleted");
                Ok(store)
            }
            StoreDeleteOutcome::Blocked(kind) => {
                tracing::debug!(store_id = %store_id, blocked_by = kind.plural(), "store delete blocked");
                Err(AppError::DependentsExist {
                    resource: "stores".to_owned(),
                    dependent: kind.plural().to_owned(),
                    field: "storeId".to_owned(),
                })
            }
            StoreDeleteOutcome::NotFound => Err(AppError::NotFound(format!(
                "store '{store_id}' does not exist"
            ))),
        }
    }

    /// Computes revenue, sales, and stock figures for an owned store.
    pub async fn overview(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
    ) -> AppResult<StoreOverview> {
        let store_id = self.require_owned_store(principal, store_id).await?;
        self.catalog
            .store_overview(store_id)
            .await
            .inspect_err(|error| {
                tracing::error!(store_id = %store_id, error = %error, "store overview failed");
            })
    }

    /// Parses a store id and checks that the caller owns the store.
    pub async fn require_owned_store(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
    ) -> AppResult<StoreId> {
        let store_id = StoreId::parse(store_id)?;
        let principal = require_principal(principal)?;
        self.ownership.require_owner(principal, store_id).await?;
        Ok(store_id)
    }
}

fn store_name(value: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value.trim()).map_err(|_| AppError::InvalidField {
        field: "name".to_owned(),
        reason: "is required".to_owned(),
    })
}
