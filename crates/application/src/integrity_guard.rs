use std::sync::Arc;

use vitrine_core::{AppError, AppResult, ResourceId, StoreId};
use vitrine_domain::{CatalogResource, ResourceKind, ResourceReference};

use crate::{CatalogRepository, DeleteOutcome};

/// Answer of a non-mutating delete check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePermission {
    /// No dependent references the resource.
    Allowed,
    /// The resource is still referenced through this edge.
    Blocked(&'static ResourceReference),
}

impl DeletePermission {
    /// Returns a human-readable reason when the delete is blocked.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::Blocked(reference) => Some(blocked_error(reference).to_string()),
        }
    }
}

/// Enforces the referential-integrity invariant on deletes.
///
/// The dependents of each kind come from the dependency graph declared in
/// [`ResourceKind::dependents`]; nothing is configured per route.
#[derive(Clone)]
pub struct IntegrityGuard {
    repository: Arc<dyn CatalogRepository>,
}

impl IntegrityGuard {
    /// Creates a guard over a catalog repository.
    #[must_use]
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    /// Reports whether the resource could be deleted right now.
    ///
    /// Advisory only; [`IntegrityGuard::delete`] repeats the check atomically.
    pub async fn can_delete(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<DeletePermission> {
        for reference in kind.dependents() {
            if self.repository.has_dependent(store_id, reference, id).await? {
                return Ok(DeletePermission::Blocked(reference));
            }
        }

        Ok(DeletePermission::Allowed)
    }

    /// Deletes the resource unless a dependent references it.
    pub async fn delete(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<CatalogResource> {
        let dependents: Vec<&'static ResourceReference> = kind.dependents().collect();

        match self
            .repository
            .delete_unreferenced_resource(store_id, kind, id, &dependents)
            .await?
        {
            DeleteOutcome::Deleted(resource) => Ok(resource),
            DeleteOutcome::Blocked(reference) => Err(blocked_error(reference)),
            DeleteOutcome::NotFound => Err(AppError::NotFound(format!(
                "{} '{id}' does not exist in store '{store_id}'",
                kind.as_str()
            ))),
        }
    }
}

fn blocked_error(reference: &ResourceReference) -> AppError {
    AppError::DependentsExist {
        resource: reference.target.plural().to_owned(),
        dependent: reference.source.plural().to_owned(),
        field: reference.field.to_owned(),
    }
}
