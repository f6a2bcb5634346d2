use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde_json::Value;
use vitrine_core::{AppError, AppResult, Principal, ResourceId, StoreId};
use vitrine_domain::{
    CatalogResource, ResourceBody, ResourceKind, parse_order_update, parse_resource_body,
    require_console_deletable,
};

use crate::catalog_ports::{CatalogRepository, ResourceListQuery};
use crate::{IntegrityGuard, OwnershipService, require_principal};

/// Operation of the generic resource endpoint set, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOperation {
    /// Collection read.
    List,
    /// Single resource read.
    Get,
    /// Resource creation.
    Create,
    /// Full replacement of mutable fields.
    Update,
    /// Guarded delete.
    Delete,
}

impl CatalogOperation {
    /// Returns the stable operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for CatalogOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One validation and authorization pipeline for every catalog kind.
///
/// Steps run in a fixed order: store id, principal, ownership, payload,
/// references, guard, repository. Behavior that differs per kind comes from
/// [`ResourceKind::spec`].
#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
    ownership: OwnershipService,
    guard: IntegrityGuard,
}

impl CatalogService {
    /// Creates a catalog service over a repository and ownership resolver.
    #[must_use]
    pub fn new(repository: Arc<dyn CatalogRepository>, ownership: OwnershipService) -> Self {
        Self {
            guard: IntegrityGuard::new(repository.clone()),
            repository,
            ownership,
        }
    }

    /// Lists resources of one kind inside a store.
    ///
    /// Catalog kinds are public; orders and archived products need the owner.
    pub async fn list_resources(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        query: ResourceListQuery,
    ) -> AppResult<Vec<CatalogResource>> {
        let result = async {
            let store_id = StoreId::parse(store_id)?;
            let privileged = !query.kind.spec().publicly_readable
                || (query.kind == ResourceKind::Product && query.filter.include_archived);
            if privileged {
                self.require_owner(principal, store_id).await?;
            }

            self.repository.list_resources(store_id, &query).await
        }
        .await;

        observe(result, query.kind, CatalogOperation::List, store_id)
    }

    /// Returns one resource by id; archived products are still readable.
    pub async fn get_resource(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        kind: ResourceKind,
        id: &str,
    ) -> AppResult<CatalogResource> {
        let result = async {
            let store_id = StoreId::parse(store_id)?;
            if !kind.spec().publicly_readable {
                self.require_owner(principal, store_id).await?;
            }

            let id = parse_resource_id(kind, id)?;
            self.repository
                .find_resource(store_id, kind, id)
                .await?
                .ok_or_else(|| not_found(kind, id, store_id))
        }
        .await;

        observe(result, kind, CatalogOperation::Get, store_id)
    }

    /// Validates a payload and creates a resource in an owned store.
    pub async fn create_resource(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        kind: ResourceKind,
        payload: &Value,
    ) -> AppResult<CatalogResource> {
        let result = async {
            let store_id = self.owned_store(principal, store_id).await?;

            let body = parse_resource_body(kind, payload)?;
            self.require_references(store_id, &body).await?;
            self.repository.create_resource(store_id, body).await
        }
        .await;

        observe(result, kind, CatalogOperation::Create, store_id)
    }

    /// Replaces the mutable fields of a resource in an owned store.
    ///
    /// Orders accept only `isPaid`, `phone`, and `address`; their items never change.
    pub async fn update_resource(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
    ) -> AppResult<CatalogResource> {
        let result = async {
            let store_id = self.owned_store(principal, store_id).await?;
            let id = parse_resource_id(kind, id)?;

            let body = if kind == ResourceKind::Order {
                let update = parse_order_update(payload)?;
                let existing = self
                    .repository
                    .find_resource(store_id, kind, id)
                    .await?
                    .ok_or_else(|| not_found(kind, id, store_id))?;
                match existing.body() {
                    ResourceBody::Order(order) => ResourceBody::Order(order.apply(&update)),
                    _ => return Err(not_found(kind, id, store_id)),
                }
            } else {
                parse_resource_body(kind, payload)?
            };

            self.require_references(store_id, &body).await?;
            self.repository
                .update_resource(store_id, id, body)
                .await
                .map_err(|error| match error {
                    AppError::NotFound(_) => not_found(kind, id, store_id),
                    other => other,
                })
        }
        .await;

        observe(result, kind, CatalogOperation::Update, store_id)
    }

    /// Deletes a resource in an owned store unless dependents reference it.
    ///
    /// Orders are sales records and are never deleted from the console.
    pub async fn delete_resource(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        kind: ResourceKind,
        id: &str,
    ) -> AppResult<CatalogResource> {
        let result = async {
            let store_id = self.owned_store(principal, store_id).await?;
            let id = parse_resource_id(kind, id)?;
            require_console_deletable(kind)?;

            self.guard.delete(store_id, kind, id).await
        }
        .await;

        observe(result, kind, CatalogOperation::Delete, store_id)
    }

    /// Runs the store id, principal, and ownership steps of a mutation.
    ///
    /// Callers that fail to decode a request body use this so that the
    /// ownership check still precedes payload errors.
    pub async fn require_write_access(
        &self,
        principal: Option<&Principal>,
        store_id: &str,
        kind: ResourceKind,
        operation: CatalogOperation,
    ) -> AppResult<StoreId> {
        let result = self.owned_store(principal, store_id).await;
        observe(result, kind, operation, store_id)
    }

    async fn owned_store(&self, principal: Option<&Principal>, store_id: &str) -> AppResult<StoreId> {
        let store_id = StoreId::parse(store_id)?;
        self.require_owner(principal, store_id).await?;
        Ok(store_id)
    }

    async fn require_owner(&self, principal: Option<&Principal>, store_id: StoreId) -> AppResult<()> {
        let principal = require_principal(principal)?;
        self.ownership.require_owner(principal, store_id).await
    }

    /// Rejects bodies whose foreign keys do not resolve inside the store.
    ///
    /// The repository repeats this check atomically with the write.
    async fn require_references(&self, store_id: StoreId, body: &ResourceBody) -> AppResult<()> {
        for (reference, target_id) in body.outgoing_references() {
            if !self
                .repository
                .resource_exists(store_id, reference.target, target_id)
                .await?
            {
                return Err(AppError::InvalidField {
                    field: reference.field.to_owned(),
                    reason: format!(
                        "'{target_id}' does not reference a {} in this store",
                        reference.target.as_str()
                    ),
                });
            }
        }

        Ok(())
    }
}

fn parse_resource_id(kind: ResourceKind, value: &str) -> AppResult<ResourceId> {
    ResourceId::parse_field(&format!("{}Id", kind.as_str()), value)
}

fn not_found(kind: ResourceKind, id: ResourceId, store_id: StoreId) -> AppError {
    AppError::NotFound(format!(
        "{} '{id}' does not exist in store '{store_id}'",
        kind.as_str()
    ))
}

fn observe<T>(
    result: AppResult<T>,
    kind: ResourceKind,
    operation: CatalogOperation,
    store_id: &str,
) -> AppResult<T> {
    result.inspect_err(|error| match error {
        AppError::Internal(_) => tracing::error!(
            resource = kind.plural(),
            operation = operation.as_str(),
            store_id,
            error = %error,
            "catalog operation failed"
        ),
        AppError::Forbidden(_) | AppError::Unauthorized(_) => tracing::warn!(
            resource = kind.plural(),
            operation = operation.as_str(),
            store_id,
            error = %error,
            "catalog operation rejected"
        ),
        AppError::DependentsExist { dependent, .. } => tracing::debug!(
            resource = kind.plural(),
            operation = operation.as_str(),
            store_id,
            blocked_by = dependent.as_str(),
            "delete blocked by dependents"
        ),
        _ => {}
    })
}
