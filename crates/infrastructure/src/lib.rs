//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_catalog_repository;
mod postgres_catalog_repository;
mod postgres_store_repository;

pub use in_memory_catalog_repository::InMemoryCatalogRepository;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_store_repository::PostgresStoreRepository;
