use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use vitrine_core::{AppError, AppResult, NonEmptyString, ResourceId, StoreId};
use vitrine_domain::{
    Billboard, CatalogResource, Category, Color, Order, OrderItem, Product, ResourceBody,
    ResourceKind, ResourceReference, Size, Store, StoreOverview,
};

use crate::{
    CatalogRepository, DeleteOutcome, ResourceListQuery, StoreDeleteOutcome, StoreRepository,
};

pub(crate) fn billboard_body() -> ResourceBody {
    ResourceBody::Billboard(
        Billboard::new("Summer", "https://cdn.example.com/summer.png")
            .unwrap_or_else(|_| unreachable!()),
    )
}

pub(crate) fn category_body(billboard_id: ResourceId) -> ResourceBody {
    ResourceBody::Category(Category::new("Shirts", billboard_id).unwrap_or_else(|_| unreachable!()))
}

pub(crate) fn size_body() -> ResourceBody {
    ResourceBody::Size(Size::new("Small", "S").unwrap_or_else(|_| unreachable!()))
}

pub(crate) fn color_body() -> ResourceBody {
    ResourceBody::Color(Color::new("Black", "#000000").unwrap_or_else(|_| unreachable!()))
}

pub(crate) fn product_body(
    category_id: ResourceId,
    size_id: ResourceId,
    color_id: ResourceId,
    is_archived: bool,
) -> ResourceBody {
    ResourceBody::Product(
        Product::new(
            "Tee",
            Decimal::new(2500, 2),
            category_id,
            size_id,
            color_id,
            vec!["https://cdn.example.com/tee.png".to_owned()],
            false,
            is_archived,
        )
        .unwrap_or_else(|_| unreachable!()),
    )
}

pub(crate) fn order_body(product_id: ResourceId, is_paid: bool) -> ResourceBody {
    ResourceBody::Order(
        Order::new(vec![OrderItem::new(product_id)], is_paid, "555-0100", "1 Main St")
            .unwrap_or_else(|_| unreachable!()),
    )
}

/// Catalog repository that serializes every call behind one mutex.
#[derive(Default)]
pub(crate) struct FakeCatalogRepository {
    resources: Mutex<Vec<CatalogResource>>,
    pub(crate) writes: Mutex<usize>,
}

fn dangling(
    resources: &[CatalogResource],
    store_id: StoreId,
    body: &ResourceBody,
) -> Option<String> {
    body.outgoing_references()
        .into_iter()
        .find(|(reference, id)| {
            !resources.iter().any(|resource| {
                resource.store_id() == store_id
                    && resource.kind() == reference.target
                    && resource.id() == *id
            })
        })
        .map(|(reference, _)| reference.field.to_owned())
}

#[async_trait]
impl CatalogRepository for FakeCatalogRepository {
    async fn list_resources(
        &self,
        store_id: StoreId,
        query: &ResourceListQuery,
    ) -> AppResult<Vec<CatalogResource>> {
        let resources = self.resources.lock().await;
        Ok(resources
            .iter()
            .rev()
            .filter(|resource| {
                resource.store_id() == store_id
                    && resource.kind() == query.kind
                    && query.filter.matches(resource)
            })
            .skip(query.page.offset)
            .take(query.page.limit)
            .cloned()
            .collect())
    }

    async fn find_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<Option<CatalogResource>> {
        Ok(self
            .resources
            .lock()
            .await
            .iter()
            .find(|resource| {
                resource.store_id() == store_id && resource.kind() == kind && resource.id() == id
            })
            .cloned())
    }

    async fn resource_exists(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<bool> {
        Ok(self.find_resource(store_id, kind, id).await?.is_some())
    }

    async fn has_dependent(
        &self,
        store_id: StoreId,
        reference: &ResourceReference,
        id: ResourceId,
    ) -> AppResult<bool> {
        Ok(self.resources.lock().await.iter().any(|resource| {
            resource.store_id() == store_id && resource.body().references(reference, id)
        }))
    }

    async fn create_resource(
        &self,
        store_id: StoreId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let mut resources = self.resources.lock().await;
        if let Some(field) = dangling(&resources, store_id, &body) {
            return Err(AppError::InvalidField {
                field,
                reason: "does not resolve".to_owned(),
            });
        }

        let now = Utc::now();
        let resource = CatalogResource::new(ResourceId::new(), store_id, body, now, now);
        resources.push(resource.clone());
        *self.writes.lock().await += 1;
        Ok(resource)
    }

    async fn update_resource(
        &self,
        store_id: StoreId,
        id: ResourceId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let mut resources = self.resources.lock().await;
        if let Some(field) = dangling(&resources, store_id, &body) {
            return Err(AppError::InvalidField {
                field,
                reason: "does not resolve".to_owned(),
            });
        }

        let kind = body.kind();
        let slot = resources
            .iter_mut()
            .find(|resource| {
                resource.store_id() == store_id && resource.kind() == kind && resource.id() == id
            })
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        *slot = slot.with_body(body, Utc::now());
        *self.writes.lock().await += 1;
        Ok(slot.clone())
    }

    async fn delete_unreferenced_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
        dependents: &[&'static ResourceReference],
    ) -> AppResult<DeleteOutcome> {
        let mut resources = self.resources.lock().await;
        let Some(position) = resources.iter().position(|resource| {
            resource.store_id() == store_id && resource.kind() == kind && resource.id() == id
        }) else {
            return Ok(DeleteOutcome::NotFound);
        };

        for reference in dependents {
            if resources.iter().any(|resource| {
                resource.store_id() == store_id && resource.body().references(reference, id)
            }) {
                return Ok(DeleteOutcome::Blocked(*reference));
            }
        }

        *self.writes.lock().await += 1;
        Ok(DeleteOutcome::Deleted(resources.remove(position)))
    }

    async fn store_overview(&self, store_id: StoreId) -> AppResult<StoreOverview> {
        let resources = self.resources.lock().await;
        let prices: HashMap<ResourceId, Decimal> = resources
            .iter()
            .filter(|resource| resource.store_id() == store_id)
            .filter_map(|resource| match resource.body() {
                ResourceBody::Product(product) => Some((resource.id(), product.price())),
                _ => None,
            })
            .collect();

        let mut overview = StoreOverview::default();
        for resource in resources.iter().filter(|resource| resource.store_id() == store_id) {
            match resource.body() {
                ResourceBody::Product(product) if !product.is_archived() => {
                    overview.stock_count += 1;
                }
                ResourceBody::Order(order) if order.is_paid() => {
                    overview.sales_count += 1;
                    for item in order.items() {
                        overview.total_revenue += prices
                            .get(&item.product_id())
                            .copied()
                            .unwrap_or_default();
                    }
                }
                _ => {}
            }
        }

        Ok(overview)
    }
}

#[derive(Default)]
pub(crate) struct FakeStoreRepository {
    stores: Mutex<Vec<Store>>,
    pub(crate) blocker: Mutex<Option<ResourceKind>>,
}

#[async_trait]
impl StoreRepository for FakeStoreRepository {
    async fn find_store(&self, store_id: StoreId) -> AppResult<Option<Store>> {
        Ok(self
            .stores
            .lock()
            .await
            .iter()
            .find(|store| store.id() == store_id)
            .cloned())
    }

    async fn list_stores_for_owner(&self, owner_subject: &str) -> AppResult<Vec<Store>> {
        Ok(self
            .stores
            .lock()
            .await
            .iter()
            .filter(|store| store.is_owned_by(owner_subject))
            .cloned()
            .collect())
    }

    async fn create_store(&self, owner_subject: &str, name: NonEmptyString) -> AppResult<Store> {
        let now = Utc::now();
        let store = Store::new(StoreId::new(), name, owner_subject, now, now)?;
        self.stores.lock().await.push(store.clone());
        Ok(store)
    }

    async fn rename_store(&self, store_id: StoreId, name: NonEmptyString) -> AppResult<Store> {
        let mut stores = self.stores.lock().await;
        let store = stores
            .iter_mut()
            .find(|store| store.id() == store_id)
            .ok_or_else(|| AppError::NotFound(store_id.to_string()))?;
        *store = store.renamed(name, Utc::now());
        Ok(store.clone())
    }

    async fn delete_empty_store(&self, store_id: StoreId) -> AppResult<StoreDeleteOutcome> {
        if let Some(kind) = *self.blocker.lock().await {
            return Ok(StoreDeleteOutcome::Blocked(kind));
        }

        let mut stores = self.stores.lock().await;
        Ok(match stores.iter().position(|store| store.id() == store_id) {
            Some(position) => StoreDeleteOutcome::Deleted(stores.remove(position)),
            None => StoreDeleteOutcome::NotFound,
        })
    }
}
