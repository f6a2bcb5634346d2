use std::sync::Arc;

use vitrine_application::{CatalogService, StoreService};

use crate::identity::IdentityGate;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: CatalogService,
    pub store_service: StoreService,
    pub identity_gate: Arc<dyn IdentityGate>,
    pub legacy_status_codes: bool,
}
