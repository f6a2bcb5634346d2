use std::sync::Arc;

use tracing::info;
use vitrine_application::{
    CatalogRepository, CatalogService, OwnershipService, StoreRepository, StoreService,
};
use vitrine_core::AppError;
use vitrine_infrastructure::{
    InMemoryCatalogRepository, PostgresCatalogRepository, PostgresStoreRepository,
};

use crate::api_config::{ApiConfig, StorageBackend};
use crate::identity::{IdentityGate, TrustedHeaderIdentityGate};
use crate::state::AppState;

use super::connect_and_migrate;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let (stores, catalog): (Arc<dyn StoreRepository>, Arc<dyn CatalogRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Validation("DATABASE_URL is required".to_owned())
                })?;
                let pool =
                    connect_and_migrate(database_url, config.database_max_connections).await?;
                info!("using postgres storage backend");
                let stores: Arc<dyn StoreRepository> =
                    Arc::new(PostgresStoreRepository::new(pool.clone()));
                let catalog: Arc<dyn CatalogRepository> =
                    Arc::new(PostgresCatalogRepository::new(pool));
                (stores, catalog)
            }
            StorageBackend::Memory => {
                info!("using in-memory storage backend; data is lost on restart");
                let repository = Arc::new(InMemoryCatalogRepository::new());
                let stores: Arc<dyn StoreRepository> = repository.clone();
                let catalog: Arc<dyn CatalogRepository> = repository;
                (stores, catalog)
            }
        };

    let identity_gate = Arc::new(TrustedHeaderIdentityGate::new(
        config.identity_header.as_str(),
    )?);

    Ok(build_app_state_with_repositories(
        stores,
        catalog,
        identity_gate,
        config.legacy_status_codes,
    ))
}

pub fn build_app_state_with_repositories(
    stores: Arc<dyn StoreRepository>,
    catalog: Arc<dyn CatalogRepository>,
    identity_gate: Arc<dyn IdentityGate>,
    legacy_status_codes: bool,
) -> AppState {
    let ownership = OwnershipService::new(stores.clone());

    AppState {
        catalog_service: CatalogService::new(catalog.clone(), ownership.clone()),
        store_service: StoreService::new(stores, catalog, ownership),
        identity_gate,
        legacy_status_codes,
    }
}
