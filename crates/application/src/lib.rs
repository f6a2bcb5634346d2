//! Application services and ports.

#![forbid(unsafe_code)]

mod catalog_ports;
mod catalog_service;
mod integrity_guard;
mod ownership_service;
mod store_service;

#[cfg(test)]
mod test_support;

pub use catalog_ports::{
    CatalogFilter, CatalogRepository, DEFAULT_PAGE_SIZE, DeleteOutcome, MAX_PAGE_SIZE,
    PageRequest, ResourceListQuery, StoreDeleteOutcome, StoreRepository,
};
pub use catalog_service::{CatalogOperation, CatalogService};
pub use integrity_guard::{DeletePermission, IntegrityGuard};
pub use ownership_service::{OwnershipService, require_principal};
pub use store_service::StoreService;
