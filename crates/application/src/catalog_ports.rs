use async_trait::async_trait;
use vitrine_core::{AppError, AppResult, NonEmptyString, ResourceId, StoreId};
use vitrine_domain::{
    CatalogResource, ResourceBody, ResourceKind, ResourceReference, Store, StoreOverview,
};

/// Page size applied when the caller does not send a limit.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on rows returned by one list call.
pub const MAX_PAGE_SIZE: usize = 100;

/// Offset pagination window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped.
    pub offset: usize,
}

impl PageRequest {
    /// Builds a page window, capping the limit at [`MAX_PAGE_SIZE`].
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> AppResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err(AppError::InvalidField {
                field: "limit".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(Self {
            limit: limit.min(MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Equality filters accepted by list queries.
///
/// Filters that do not apply to the listed kind are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Products in this category.
    pub category_id: Option<ResourceId>,
    /// Products with this size.
    pub size_id: Option<ResourceId>,
    /// Products with this color.
    pub color_id: Option<ResourceId>,
    /// Products with this featured flag.
    pub is_featured: Option<bool>,
    /// Keep archived products in the result.
    pub include_archived: bool,
    /// Orders with this payment flag.
    pub is_paid: Option<bool>,
}

impl CatalogFilter {
    /// Returns whether the resource satisfies every applicable filter.
    #[must_use]
    pub fn matches(&self, resource: &CatalogResource) -> bool {
        match resource.body() {
            ResourceBody::Product(product) => {
                (self.include_archived || !product.is_archived())
                    && self
                        .category_id
                        .is_none_or(|value| value == product.category_id())
                    && self.size_id.is_none_or(|value| value == product.size_id())
                    && self.color_id.is_none_or(|value| value == product.color_id())
                    && self
                        .is_featured
                        .is_none_or(|value| value == product.is_featured())
            }
            ResourceBody::Order(order) => self.is_paid.is_none_or(|value| value == order.is_paid()),
            ResourceBody::Billboard(_)
            | ResourceBody::Category(_)
            | ResourceBody::Size(_)
            | ResourceBody::Color(_) => true,
        }
    }
}

/// Inputs for listing one kind inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceListQuery {
    /// Listed kind.
    pub kind: ResourceKind,
    /// Equality filters.
    pub filter: CatalogFilter,
    /// Pagination window.
    pub page: PageRequest,
}

/// Result of an atomic guarded delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The resource was removed; carries its last representation.
    Deleted(CatalogResource),
    /// A dependent still references the resource; nothing was removed.
    Blocked(&'static ResourceReference),
    /// No resource of the kind exists with that id in the store.
    NotFound,
}

/// Result of an atomic store delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDeleteOutcome {
    /// The store was removed.
    Deleted(Store),
    /// The store still owns resources of this kind.
    Blocked(ResourceKind),
    /// The store does not exist.
    NotFound,
}

/// Repository port for store tenants.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Looks up a store by primary key.
    async fn find_store(&self, store_id: StoreId) -> AppResult<Option<Store>>;

    /// Lists stores owned by a subject, oldest first.
    async fn list_stores_for_owner(&self, owner_subject: &str) -> AppResult<Vec<Store>>;

    /// Creates a store owned by the subject.
    async fn create_store(&self, owner_subject: &str, name: NonEmptyString) -> AppResult<Store>;

    /// Renames a store; the owner is never changed.
    async fn rename_store(&self, store_id: StoreId, name: NonEmptyString) -> AppResult<Store>;

    /// Deletes a store only when it owns no resources, atomically.
    async fn delete_empty_store(&self, store_id: StoreId) -> AppResult<StoreDeleteOutcome>;
}

/// Repository port for store-scoped catalog resources.
///
/// Create and update re-verify outgoing references inside the same atomic
/// unit as the write and fail with [`AppError::InvalidField`] on a dangling
/// reference. Delete is only exposed in its guarded form.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists resources of one kind, newest first.
    async fn list_resources(
        &self,
        store_id: StoreId,
        query: &ResourceListQuery,
    ) -> AppResult<Vec<CatalogResource>>;

    /// Returns one resource of a kind inside a store.
    async fn find_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<Option<CatalogResource>>;

    /// Returns whether a resource of the kind exists inside the store.
    async fn resource_exists(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<bool>;

    /// Returns whether any resource references `id` through `reference`.
    async fn has_dependent(
        &self,
        store_id: StoreId,
        reference: &ResourceReference,
        id: ResourceId,
    ) -> AppResult<bool>;

    /// Persists a new resource.
    async fn create_resource(
        &self,
        store_id: StoreId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource>;

    /// Replaces the body of an existing resource of the same kind.
    async fn update_resource(
        &self,
        store_id: StoreId,
        id: ResourceId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource>;

    /// Deletes a resource unless one of `dependents` references it, atomically.
    async fn delete_unreferenced_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
        dependents: &[&'static ResourceReference],
    ) -> AppResult<DeleteOutcome>;

    /// Computes dashboard aggregates for a store.
    async fn store_overview(&self, store_id: StoreId) -> AppResult<StoreOverview>;
}
