use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use vitrine_application::{
    CatalogRepository, DeleteOutcome, ResourceListQuery, StoreDeleteOutcome, StoreRepository,
};
use vitrine_core::{AppError, AppResult, NonEmptyString, ResourceId, StoreId};
use vitrine_domain::{
    CatalogResource, ResourceBody, ResourceKind, ResourceReference, Store, StoreOverview,
};

/// Reverse index key: (store, source kind, field, referenced id).
type ReferenceKey = (StoreId, ResourceKind, &'static str, ResourceId);

#[derive(Debug)]
struct Sequenced<T> {
    sequence: u64,
    value: T,
}

#[derive(Debug, Default)]
struct CatalogState {
    next_sequence: u64,
    stores: HashMap<StoreId, Sequenced<Store>>,
    resources: HashMap<(StoreId, ResourceId), Sequenced<CatalogResource>>,
    references: HashMap<ReferenceKey, usize>,
}

impl CatalogState {
    fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn find(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> Option<&CatalogResource> {
        self.resources
            .get(&(store_id, id))
            .map(|entry| &entry.value)
            .filter(|resource| resource.kind() == kind)
    }

    fn ensure_references(&self, store_id: StoreId, body: &ResourceBody) -> AppResult<()> {
        for (reference, target_id) in body.outgoing_references() {
            if self.find(store_id, reference.target, target_id).is_none() {
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

    fn index_references(&mut self, store_id: StoreId, body: &ResourceBody) {
        for (reference, target_id) in body.outgoing_references() {
            *self
                .references
                .entry((store_id, reference.source, reference.field, target_id))
                .or_default() += 1;
        }
    }

    fn unindex_references(&mut self, store_id: StoreId, body: &ResourceBody) {
        for (reference, target_id) in body.outgoing_references() {
            let key = (store_id, reference.source, reference.field, target_id);
            if let Some(count) = self.references.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    self.references.remove(&key);
                }
            }
        }
    }

    fn is_referenced(
        &self,
        store_id: StoreId,
        reference: &ResourceReference,
        id: ResourceId,
    ) -> bool {
        self.references
            .contains_key(&(store_id, reference.source, reference.field, id))
    }
}

/// In-memory store and catalog repository.
///
/// Every write takes the single state lock, so reference checks and the write
/// they guard are one atomic unit.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreRepository for InMemoryCatalogRepository {
    async fn find_store(&self, store_id: StoreId) -> AppResult<Option<Store>> {
        Ok(self
            .state
            .read()
            .await
            .stores
            .get(&store_id)
            .map(|entry| entry.value.clone()))
    }

    async fn list_stores_for_owner(&self, owner_subject: &str) -> AppResult<Vec<Store>> {
        let state = self.state.read().await;
        let mut stores: Vec<&Sequenced<Store>> = state
            .stores
            .values()
            .filter(|entry| entry.value.is_owned_by(owner_subject))
            .collect();
        stores.sort_by_key(|entry| entry.sequence);

        Ok(stores.into_iter().map(|entry| entry.value.clone()).collect())
    }

    async fn create_store(&self, owner_subject: &str, name: NonEmptyString) -> AppResult<Store> {
        let now = Utc::now();
        let store = Store::new(StoreId::new(), name, owner_subject, now, now)?;

        let mut state = self.state.write().await;
        let sequence = state.next_sequence();
        state.stores.insert(
            store.id(),
            Sequenced {
                sequence,
                value: store.clone(),
            },
        );

        Ok(store)
    }

    async fn rename_store(&self, store_id: StoreId, name: NonEmptyString) -> AppResult<Store> {
        let mut state = self.state.write().await;
        let entry = state
            .stores
            .get_mut(&store_id)
            .ok_or_else(|| AppError::NotFound(format!("store '{store_id}' does not exist")))?;

        entry.value = entry.value.renamed(name, Utc::now());
        Ok(entry.value.clone())
    }

    async fn delete_empty_store(&self, store_id: StoreId) -> AppResult<StoreDeleteOutcome> {
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&store_id) {
            return Ok(StoreDeleteOutcome::NotFound);
        }

        let blocker = ResourceKind::all().iter().copied().find(|kind| {
            state
                .resources
                .values()
                .any(|entry| entry.value.store_id() == store_id && entry.value.kind() == *kind)
        });
        if let Some(kind) = blocker {
            return Ok(StoreDeleteOutcome::Blocked(kind));
        }

        Ok(state
            .stores
            .remove(&store_id)
            .map(|entry| StoreDeleteOutcome::Deleted(entry.value))
            .unwrap_or(StoreDeleteOutcome::NotFound))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_resources(
        &self,
        store_id: StoreId,
        query: &ResourceListQuery,
    ) -> AppResult<Vec<CatalogResource>> {
        let state = self.state.read().await;
        let mut listed: Vec<&Sequenced<CatalogResource>> = state
            .resources
            .values()
            .filter(|entry| {
                entry.value.store_id() == store_id
                    && entry.value.kind() == query.kind
                    && query.filter.matches(&entry.value)
            })
            .collect();
        listed.sort_by(|left, right| right.sequence.cmp(&left.sequence));

        Ok(listed
            .into_iter()
            .skip(query.page.offset)
            .take(query.page.limit)
            .map(|entry| entry.value.clone())
            .collect())
    }

    async fn find_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<Option<CatalogResource>> {
        Ok(self.state.read().await.find(store_id, kind, id).cloned())
    }

    async fn resource_exists(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<bool> {
        Ok(self.state.read().await.find(store_id, kind, id).is_some())
    }

    async fn has_dependent(
        &self,
        store_id: StoreId,
        reference: &ResourceReference,
        id: ResourceId,
    ) -> AppResult<bool> {
        Ok(self.state.read().await.is_referenced(store_id, reference, id))
    }

    async fn create_resource(
        &self,
        store_id: StoreId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&store_id) {
            return Err(AppError::NotFound(format!("store '{store_id}' does not exist")));
        }
        state.ensure_references(store_id, &body)?;

        let now = Utc::now();
        let resource = CatalogResource::new(ResourceId::new(), store_id, body, now, now);
        state.index_references(store_id, resource.body());
        let sequence = state.next_sequence();
        state.resources.insert(
            (store_id, resource.id()),
            Sequenced {
                sequence,
                value: resource.clone(),
            },
        );

        Ok(resource)
    }

    async fn update_resource(
        &self,
        store_id: StoreId,
        id: ResourceId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let mut state = self.state.write().await;
        let kind = body.kind();
        let previous = state
            .find(store_id, kind, id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{id}' does not exist in store '{store_id}'",
                    kind.as_str()
                ))
            })?;
        state.ensure_references(store_id, &body)?;

        let updated = previous.with_body(body, Utc::now());
        state.unindex_references(store_id, previous.body());
        state.index_references(store_id, updated.body());
        if let Some(entry) = state.resources.get_mut(&(store_id, id)) {
            entry.value = updated.clone();
        }

        Ok(updated)
    }

    async fn delete_unreferenced_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
        dependents: &[&'static ResourceReference],
    ) -> AppResult<DeleteOutcome> {
        let mut state = self.state.write().await;
        if state.find(store_id, kind, id).is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        if let Some(reference) = dependents
            .iter()
            .find(|reference| state.is_referenced(store_id, reference, id))
        {
            return Ok(DeleteOutcome::Blocked(*reference));
        }

        let Some(removed) = state.resources.remove(&(store_id, id)) else {
            return Ok(DeleteOutcome::NotFound);
        };
        state.unindex_references(store_id, removed.value.body());

        Ok(DeleteOutcome::Deleted(removed.value))
    }

    async fn store_overview(&self, store_id: StoreId) -> AppResult<StoreOverview> {
        let guard = self.state.read().await;
        let state: &CatalogState = &guard;
        let in_store = || {
            state
                .resources
                .values()
                .map(|entry| &entry.value)
                .filter(move |resource| resource.store_id() == store_id)
        };

        let prices: HashMap<ResourceId, Decimal> = in_store()
            .filter_map(|resource| match resource.body() {
                ResourceBody::Product(product) => Some((resource.id(), product.price())),
                _ => None,
            })
            .collect();

        let mut overview = StoreOverview::default();
        for resource in in_store() {
            match resource.body() {
                ResourceBody::Product(product) if !product.is_archived() => {
                    overview.stock_count += 1;
                }
                ResourceBody::Order(order) if order.is_paid() => {
                    overview.sales_count += 1;
                    overview.total_revenue += order
                        .items()
                        .iter()
                        .filter_map(|item| prices.get(&item.product_id()))
                        .copied()
                        .sum::<Decimal>();
                }
                _ => {}
            }
        }

        Ok(overview)
    }
}
