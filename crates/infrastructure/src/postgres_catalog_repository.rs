use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vitrine_application::{CatalogRepository, DeleteOutcome, ResourceListQuery};
use vitrine_core::{AppError, AppResult, ResourceId, StoreId};
use vitrine_domain::{CatalogResource, ResourceBody, ResourceKind, ResourceReference, StoreOverview};

mod rows;
mod writes;

use rows::{push_filters, select_resources};

/// PostgreSQL-backed catalog repository.
///
/// Foreign keys are composite `(store_id, id)` constraints, so a reference
/// can never resolve into another store. Writes lock referenced rows with
/// `FOR KEY SHARE` and guarded deletes lock the target with `FOR UPDATE`.
#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> AppResult<sqlx::pool::PoolConnection<Postgres>> {
        self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire database connection: {error}"))
        })
    }
}

#[derive(Debug, FromRow)]
struct OverviewRow {
    total_revenue: Decimal,
    sales_count: i64,
    stock_count: i64,
}

/// Table holding rows of a kind.
pub(crate) fn table_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Billboard => "billboards",
        ResourceKind::Category => "categories",
        ResourceKind::Size => "sizes",
        ResourceKind::Color => "colors",
        ResourceKind::Product => "products",
        ResourceKind::Order => "orders",
    }
}

/// Table and column storing a foreign-key edge.
fn reference_column(reference: &ResourceReference) -> AppResult<(&'static str, &'static str)> {
    match (reference.source, reference.field) {
        (ResourceKind::Category, "billboardId") => Ok(("categories", "billboard_id")),
        (ResourceKind::Product, "categoryId") => Ok(("products", "category_id")),
        (ResourceKind::Product, "sizeId") => Ok(("products", "size_id")),
        (ResourceKind::Product, "colorId") => Ok(("products", "color_id")),
        (ResourceKind::Order, "orderItems.productId") => Ok(("order_items", "product_id")),
        (source, field) => Err(AppError::Internal(format!(
            "no column is mapped for reference '{field}' on {source}"
        ))),
    }
}

fn field_for_constraint(constraint: &str) -> Option<&'static str> {
    match constraint {
        "categories_billboard_fk" => Some("billboardId"),
        "products_category_fk" => Some("categoryId"),
        "products_size_fk" => Some("sizeId"),
        "products_color_fk" => Some("colorId"),
        "order_items_product_fk" => Some("orderItems.productId"),
        _ => None,
    }
}

/// Maps foreign-key violations and numeric overflow to field errors and
/// everything else to `Internal`.
fn map_write_error(context: &str, error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("22003")
    {
        return AppError::InvalidField {
            field: "price".to_owned(),
            reason: "is out of range".to_owned(),
        };
    }

    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        let field = database_error
            .constraint()
            .and_then(field_for_constraint)
            .unwrap_or("storeId");
        return AppError::InvalidField {
            field: field.to_owned(),
            reason: "does not reference a resource in this store".to_owned(),
        };
    }

    AppError::Internal(format!("failed to {context}: {error}"))
}

async fn fetch_resources(
    connection: &mut PgConnection,
    kind: ResourceKind,
    store_id: StoreId,
    id: Option<ResourceId>,
    query: Option<&ResourceListQuery>,
) -> AppResult<Vec<CatalogResource>> {
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(select_resources(kind));
    builder.push(" WHERE r.store_id = ");
    builder.push_bind(store_id.as_uuid());

    if let Some(id) = id {
        builder.push(" AND r.id = ");
        builder.push_bind(id.as_uuid());
    }

    if let Some(query) = query {
        let limit = i64::try_from(query.page.limit).map_err(|error| {
            AppError::Validation(format!("invalid list limit: {error}"))
        })?;
        let offset = i64::try_from(query.page.offset).map_err(|error| {
            AppError::Validation(format!("invalid list offset: {error}"))
        })?;

        push_filters(&mut builder, kind, &query.filter);
        builder.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }

    rows::decode(connection, kind, &mut builder)
        .await
        .map_err(|error| match error {
            AppError::Internal(detail) => AppError::Internal(format!(
                "failed to load {} for store '{store_id}': {detail}",
                kind.plural()
            )),
            other => other,
        })
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_resources(
        &self,
        store_id: StoreId,
        query: &ResourceListQuery,
    ) -> AppResult<Vec<CatalogResource>> {
        let mut connection = self.acquire().await?;
        fetch_resources(&mut connection, query.kind, store_id, None, Some(query)).await
    }

    async fn find_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<Option<CatalogResource>> {
        let mut connection = self.acquire().await?;
        Ok(fetch_resources(&mut connection, kind, store_id, Some(id), None)
            .await?
            .into_iter()
            .next())
    }

    async fn resource_exists(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE store_id = $1 AND id = $2)",
            table_name(kind)
        );

        sqlx::query_scalar::<_, bool>(sql.as_str())
            .bind(store_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to check {} '{id}' in store '{store_id}': {error}",
                    kind.as_str()
                ))
            })
    }

    async fn has_dependent(
        &self,
        store_id: StoreId,
        reference: &ResourceReference,
        id: ResourceId,
    ) -> AppResult<bool> {
        let mut connection = self.acquire().await?;
        writes::is_referenced(&mut connection, store_id, reference, id).await
    }

    async fn create_resource(
        &self,
        store_id: StoreId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        self.create_resource_impl(store_id, body).await
    }

    async fn update_resource(
        &self,
        store_id: StoreId,
        id: ResourceId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        self.update_resource_impl(store_id, id, body).await
    }

    async fn delete_unreferenced_resource(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
        dependents: &[&'static ResourceReference],
    ) -> AppResult<DeleteOutcome> {
        self.delete_unreferenced_resource_impl(store_id, kind, id, dependents)
            .await
    }

    async fn store_overview(&self, store_id: StoreId) -> AppResult<StoreOverview> {
        let row = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT
                COALESCE((
                    SELECT SUM(p.price)
                    FROM order_items oi
                    JOIN orders o ON o.id = oi.order_id
                    JOIN products p ON p.id = oi.product_id
                    WHERE oi.store_id = $1 AND o.is_paid
                ), 0)::NUMERIC AS total_revenue,
                (SELECT COUNT(*) FROM orders WHERE store_id = $1 AND is_paid) AS sales_count,
                (SELECT COUNT(*) FROM products WHERE store_id = $1 AND NOT is_archived) AS stock_count
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to compute overview for store '{store_id}': {error}"
            ))
        })?;

        let count = |value: i64| {
            u64::try_from(value).map_err(|error| {
                AppError::Internal(format!("store overview count is invalid: {error}"))
            })
        };

        Ok(StoreOverview {
            total_revenue: row.total_revenue,
            sales_count: count(row.sales_count)?,
            stock_count: count(row.stock_count)?,
        })
    }
}

fn uuid_list(ids: impl Iterator<Item = ResourceId>) -> Vec<Uuid> {
    ids.map(|id| id.as_uuid()).collect()
}

#[cfg(test)]
mod tests;
