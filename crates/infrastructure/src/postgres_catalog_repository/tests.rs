use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use vitrine_application::{
    CatalogFilter, CatalogRepository, DeleteOutcome, PageRequest, ResourceListQuery,
    StoreRepository,
};
use vitrine_core::{AppError, NonEmptyString, ResourceId, StoreId};
use vitrine_domain::{
    Billboard, Category, Color, Order, OrderItem, Product, ResourceBody, ResourceKind, Size,
};

use super::PostgresCatalogRepository;
use crate::PostgresStoreRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres catalog repository tests: {error}");
    }

    Some(pool)
}

async fn ensure_store(pool: &PgPool) -> StoreId {
    PostgresStoreRepository::new(pool.clone())
        .create_store(
            "catalog-test-owner",
            NonEmptyString::new("Catalog Test").unwrap_or_else(|_| unreachable!()),
        )
        .await
        .unwrap_or_else(|error| panic!("failed to create test store: {error}"))
        .id()
}

fn billboard() -> ResourceBody {
    ResourceBody::Billboard(
        Billboard::new("Summer", "https://cdn.example.com/summer.png")
            .unwrap_or_else(|_| unreachable!()),
    )
}

fn category(billboard_id: ResourceId) -> ResourceBody {
    ResourceBody::Category(Category::new("Shirts", billboard_id).unwrap_or_else(|_| unreachable!()))
}

async fn create(
    repository: &PostgresCatalogRepository,
    store_id: StoreId,
    body: ResourceBody,
) -> ResourceId {
    repository
        .create_resource(store_id, body)
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"))
        .id()
}

async fn product_fixture(
    repository: &PostgresCatalogRepository,
    store_id: StoreId,
) -> (ResourceId, ResourceId) {
    let billboard_id = create(repository, store_id, billboard()).await;
    let category_id = create(repository, store_id, category(billboard_id)).await;
    let size_id = create(
        repository,
        store_id,
        ResourceBody::Size(Size::new("Small", "S").unwrap_or_else(|_| unreachable!())),
    )
    .await;
    let color_id = create(
        repository,
        store_id,
        ResourceBody::Color(Color::new("Black", "#000000").unwrap_or_else(|_| unreachable!())),
    )
    .await;

    let product = Product::new(
        "Tee",
        Decimal::new(2550, 2),
        category_id,
        size_id,
        color_id,
        vec![
            "https://cdn.example.com/front.png".to_owned(),
            "https://cdn.example.com/back.png".to_owned(),
        ],
        true,
        false,
    )
    .unwrap_or_else(|_| unreachable!());

    let product_id = create(repository, store_id, ResourceBody::Product(product)).await;
    (category_id, product_id)
}

#[tokio::test]
async fn product_round_trips_with_ordered_images() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresCatalogRepository::new(pool.clone());
    let store_id = ensure_store(&pool).await;
    let (category_id, product_id) = product_fixture(&repository, store_id).await;

    let fetched = repository
        .find_resource(store_id, ResourceKind::Product, product_id)
        .await
        .unwrap_or_else(|error| panic!("find failed: {error}"));
    let Some(fetched) = fetched else {
        panic!("product was not persisted");
    };
    match fetched.body() {
        ResourceBody::Product(product) => {
            assert_eq!(product.price(), Decimal::new(2550, 2));
            assert_eq!(product.category_id(), category_id);
            assert_eq!(product.images()[0].as_str(), "https://cdn.example.com/front.png");
            assert_eq!(product.images().len(), 2);
        }
        other => panic!("expected product body, got {other:?}"),
    }

    let filtered = repository
        .list_resources(
            store_id,
            &ResourceListQuery {
                kind: ResourceKind::Product,
                filter: CatalogFilter {
                    category_id: Some(category_id),
                    is_featured: Some(true),
                    ..CatalogFilter::default()
                },
                page: PageRequest::default(),
            },
        )
        .await
        .unwrap_or_default();
    assert_eq!(filtered.len(), 1);
}

#[tokio::test]
async fn references_into_other_stores_are_rejected() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresCatalogRepository::new(pool.clone());
    let first = ensure_store(&pool).await;
    let second = ensure_store(&pool).await;
    let foreign_billboard = create(&repository, first, billboard()).await;

    let result = repository
        .create_resource(second, category(foreign_billboard))
        .await;

    assert!(matches!(
        result,
        Err(AppError::InvalidField { ref field, .. }) if field == "billboardId"
    ));
}

#[tokio::test]
async fn guarded_delete_is_blocked_while_referenced() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresCatalogRepository::new(pool.clone());
    let store_id = ensure_store(&pool).await;
    let billboard_id = create(&repository, store_id, billboard()).await;
    let category_id = create(&repository, store_id, category(billboard_id)).await;
    let dependents: Vec<_> = ResourceKind::Billboard.dependents().collect();

    let blocked = repository
        .delete_unreferenced_resource(store_id, ResourceKind::Billboard, billboard_id, &dependents)
        .await;
    assert!(matches!(blocked, Ok(DeleteOutcome::Blocked(_))));
    assert!(matches!(
        repository
            .resource_exists(store_id, ResourceKind::Billboard, billboard_id)
            .await,
        Ok(true)
    ));

    let removed = repository
        .delete_unreferenced_resource(store_id, ResourceKind::Category, category_id, &[])
        .await;
    assert!(matches!(removed, Ok(DeleteOutcome::Deleted(_))));

    let deleted = repository
        .delete_unreferenced_resource(store_id, ResourceKind::Billboard, billboard_id, &dependents)
        .await;
    assert!(matches!(deleted, Ok(DeleteOutcome::Deleted(_))));
    assert!(matches!(
        repository
            .find_resource(store_id, ResourceKind::Billboard, billboard_id)
            .await,
        Ok(None)
    ));
}

#[tokio::test]
async fn concurrent_delete_and_dependent_create_never_dangle() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let store_id = ensure_store(&pool).await;
    let dependents: Vec<_> = ResourceKind::Billboard.dependents().collect();

    for _ in 0..40 {
        let target = create(&repository, store_id, billboard()).await;

        let deleting = {
            let repository = repository.clone();
            let dependents = dependents.clone();
            tokio::spawn(async move {
                repository
                    .delete_unreferenced_resource(
                        store_id,
                        ResourceKind::Billboard,
                        target,
                        &dependents,
                    )
                    .await
            })
        };
        let creating = {
            let repository = repository.clone();
            tokio::spawn(async move {
                repository
                    .create_resource(store_id, category(target))
                    .await
            })
        };

        let (deleted, created) = tokio::join!(deleting, creating);
        let deleted = deleted.unwrap_or_else(|_| unreachable!());
        let created = created.unwrap_or_else(|_| unreachable!());

        match (deleted, created) {
            (Ok(DeleteOutcome::Deleted(_)), Err(AppError::InvalidField { ref field, .. }))
                if field == "billboardId" => {}
            (Ok(DeleteOutcome::Blocked(_)), Ok(category)) => {
                let billboard_kept = repository
                    .resource_exists(store_id, ResourceKind::Billboard, target)
                    .await;
                assert!(matches!(billboard_kept, Ok(true)));
                let removed = repository
                    .delete_unreferenced_resource(
                        store_id,
                        ResourceKind::Category,
                        category.id(),
                        &[],
                    )
                    .await;
                assert!(matches!(removed, Ok(DeleteOutcome::Deleted(_))));
            }
            other => panic!("unexpected interleaving: {other:?}"),
        }
    }
}

#[tokio::test]
async fn overview_counts_paid_orders() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresCatalogRepository::new(pool.clone());
    let store_id = ensure_store(&pool).await;
    let (_, product_id) = product_fixture(&repository, store_id).await;
    for is_paid in [true, false] {
        let order = Order::new(
            vec![OrderItem::new(product_id), OrderItem::new(product_id)],
            is_paid,
            "555-0100",
            "1 Main St",
        )
        .unwrap_or_else(|_| unreachable!());
        create(&repository, store_id, ResourceBody::Order(order)).await;
    }

    let overview = repository
        .store_overview(store_id)
        .await
        .unwrap_or_else(|error| panic!("overview failed: {error}"));
    assert_eq!(overview.total_revenue, Decimal::new(5100, 2));
    assert_eq!(overview.sales_count, 1);
    assert_eq!(overview.stock_count, 1);

    let order_edge = ResourceKind::Product
        .dependents()
        .next()
        .unwrap_or_else(|| unreachable!());
    assert!(matches!(
        repository
            .has_dependent(store_id, order_edge, product_id)
            .await,
        Ok(true)
    ));
}
