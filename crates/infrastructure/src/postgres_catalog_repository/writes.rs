use chrono::{DateTime, Utc};
use sqlx::Transaction;

use super::*;

#[derive(Debug, FromRow)]
struct StampRow {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

async fn begin(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
    pool.begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
}

async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

/// Returns whether any row of the reference's source table points at `id`.
pub(super) async fn is_referenced(
    connection: &mut PgConnection,
    store_id: StoreId,
    reference: &ResourceReference,
    id: ResourceId,
) -> AppResult<bool> {
    let (table, column) = reference_column(reference)?;
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE store_id = $1 AND {column} = $2)");

    sqlx::query_scalar::<_, bool>(sql.as_str())
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .fetch_one(&mut *connection)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to check {table}.{column} references to '{id}': {error}"
            ))
        })
}

/// Locks every referenced row against concurrent deletes, failing on the first
/// reference that does not resolve inside the store.
async fn lock_references(
    connection: &mut PgConnection,
    store_id: StoreId,
    body: &ResourceBody,
) -> AppResult<()> {
    for (reference, target_id) in body.outgoing_references() {
        let sql = format!(
            "SELECT id FROM {} WHERE store_id = $1 AND id = $2 FOR KEY SHARE",
            table_name(reference.target)
        );

        let locked = sqlx::query_scalar::<_, Uuid>(sql.as_str())
            .bind(store_id.as_uuid())
            .bind(target_id.as_uuid())
            .fetch_optional(&mut *connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to lock {} '{target_id}': {error}",
                    reference.target.as_str()
                ))
            })?;

        if locked.is_none() {
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

async fn insert_body(
    connection: &mut PgConnection,
    store_id: StoreId,
    id: ResourceId,
    body: &ResourceBody,
) -> AppResult<StampRow> {
    let context = format!("create {}", body.kind().as_str());

    let stamps = match body {
        ResourceBody::Billboard(billboard) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO billboards (id, store_id, label, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(billboard.label().as_str())
        .bind(billboard.image_url().as_str())
        .fetch_one(&mut *connection)
        .await,
        ResourceBody::Category(category) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO categories (id, store_id, name, billboard_id)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(category.name().as_str())
        .bind(category.billboard_id().as_uuid())
        .fetch_one(&mut *connection)
        .await,
        ResourceBody::Size(size) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO sizes (id, store_id, name, value)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(size.name().as_str())
        .bind(size.value().as_str())
        .fetch_one(&mut *connection)
        .await,
        ResourceBody::Color(color) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO colors (id, store_id, name, value)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(color.name().as_str())
        .bind(color.value().as_str())
        .fetch_one(&mut *connection)
        .await,
        ResourceBody::Product(product) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO products (
                id, store_id, name, price, category_id, size_id, color_id, is_featured, is_archived
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(product.name().as_str())
        .bind(product.price())
        .bind(product.category_id().as_uuid())
        .bind(product.size_id().as_uuid())
        .bind(product.color_id().as_uuid())
        .bind(product.is_featured())
        .bind(product.is_archived())
        .fetch_one(&mut *connection)
        .await,
        ResourceBody::Order(order) => sqlx::query_as::<_, StampRow>(
            r#"
            INSERT INTO orders (id, store_id, is_paid, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(order.is_paid())
        .bind(order.phone())
        .bind(order.address())
        .fetch_one(&mut *connection)
        .await,
    }
    .map_err(|error| map_write_error(context.as_str(), error))?;

    match body {
        ResourceBody::Product(product) => {
            insert_product_images(connection, store_id, id, product.images()).await?;
        }
        ResourceBody::Order(order) => {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, store_id, position, product_id)
                SELECT $1, $2, item.ordinality::INTEGER, item.product_id
                FROM UNNEST($3::UUID[]) WITH ORDINALITY AS item(product_id, ordinality)
                "#,
            )
            .bind(id.as_uuid())
            .bind(store_id.as_uuid())
            .bind(uuid_list(order.items().iter().map(|item| item.product_id())))
            .execute(&mut *connection)
            .await
            .map_err(|error| map_write_error("create order items", error))?;
        }
        ResourceBody::Billboard(_)
        | ResourceBody::Category(_)
        | ResourceBody::Size(_)
        | ResourceBody::Color(_) => {}
    }

    Ok(stamps)
}

async fn insert_product_images(
    connection: &mut PgConnection,
    store_id: StoreId,
    product_id: ResourceId,
    images: &[vitrine_core::NonEmptyString],
) -> AppResult<()> {
    let urls: Vec<String> = images.iter().map(|url| url.as_str().to_owned()).collect();

    sqlx::query(
        r#"
        INSERT INTO product_images (product_id, store_id, position, url)
        SELECT $1, $2, image.ordinality::INTEGER, image.url
        FROM UNNEST($3::TEXT[]) WITH ORDINALITY AS image(url, ordinality)
        "#,
    )
    .bind(product_id.as_uuid())
    .bind(store_id.as_uuid())
    .bind(urls)
    .execute(&mut *connection)
    .await
    .map_err(|error| map_write_error("store product images", error))?;

    Ok(())
}

async fn update_body(
    connection: &mut PgConnection,
    store_id: StoreId,
    id: ResourceId,
    body: &ResourceBody,
) -> AppResult<Option<StampRow>> {
    let context = format!("update {}", body.kind().as_str());

    let stamps = match body {
        ResourceBody::Billboard(billboard) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE billboards
            SET label = $3, image_url = $4, updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(billboard.label().as_str())
        .bind(billboard.image_url().as_str())
        .fetch_optional(&mut *connection)
        .await,
        ResourceBody::Category(category) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE categories
            SET name = $3, billboard_id = $4, updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(category.name().as_str())
        .bind(category.billboard_id().as_uuid())
        .fetch_optional(&mut *connection)
        .await,
        ResourceBody::Size(size) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE sizes
            SET name = $3, value = $4, updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(size.name().as_str())
        .bind(size.value().as_str())
        .fetch_optional(&mut *connection)
        .await,
        ResourceBody::Color(color) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE colors
            SET name = $3, value = $4, updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(color.name().as_str())
        .bind(color.value().as_str())
        .fetch_optional(&mut *connection)
        .await,
        ResourceBody::Product(product) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE products
            SET name = $3,
                price = $4,
                category_id = $5,
                size_id = $6,
                color_id = $7,
                is_featured = $8,
                is_archived = $9,
                updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(product.name().as_str())
        .bind(product.price())
        .bind(product.category_id().as_uuid())
        .bind(product.size_id().as_uuid())
        .bind(product.color_id().as_uuid())
        .bind(product.is_featured())
        .bind(product.is_archived())
        .fetch_optional(&mut *connection)
        .await,
        ResourceBody::Order(order) => sqlx::query_as::<_, StampRow>(
            r#"
            UPDATE orders
            SET is_paid = $3, phone = $4, address = $5, updated_at = now()
            WHERE store_id = $1 AND id = $2
            RETURNING created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(id.as_uuid())
        .bind(order.is_paid())
        .bind(order.phone())
        .bind(order.address())
        .fetch_optional(&mut *connection)
        .await,
    }
    .map_err(|error| map_write_error(context.as_str(), error))?;

    if stamps.is_some()
        && let ResourceBody::Product(product) = body
    {
        sqlx::query("DELETE FROM product_images WHERE store_id = $1 AND product_id = $2")
            .bind(store_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to replace images of product '{id}': {error}"))
            })?;
        insert_product_images(connection, store_id, id, product.images()).await?;
    }

    Ok(stamps)
}

impl PostgresCatalogRepository {
    pub(super) async fn create_resource_impl(
        &self,
        store_id: StoreId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let mut transaction = begin(&self.pool).await?;
        lock_references(&mut transaction, store_id, &body).await?;

        let id = ResourceId::new();
        let stamps = insert_body(&mut transaction, store_id, id, &body).await?;
        commit(transaction).await?;

        Ok(CatalogResource::new(
            id,
            store_id,
            body,
            stamps.created_at,
            stamps.updated_at,
        ))
    }

    pub(super) async fn update_resource_impl(
        &self,
        store_id: StoreId,
        id: ResourceId,
        body: ResourceBody,
    ) -> AppResult<CatalogResource> {
        let kind = body.kind();
        let mut transaction = begin(&self.pool).await?;
        lock_references(&mut transaction, store_id, &body).await?;

        let stamps = update_body(&mut transaction, store_id, id, &body)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{id}' does not exist in store '{store_id}'",
                    kind.as_str()
                ))
            })?;

        commit(transaction).await?;

        Ok(CatalogResource::new(
            id,
            store_id,
            body,
            stamps.created_at,
            stamps.updated_at,
        ))
    }

    pub(super) async fn delete_unreferenced_resource_impl(
        &self,
        store_id: StoreId,
        kind: ResourceKind,
        id: ResourceId,
        dependents: &[&'static ResourceReference],
    ) -> AppResult<DeleteOutcome> {
        let table = table_name(kind);
        let mut transaction = begin(&self.pool).await?;

        let lock_sql = format!("SELECT id FROM {table} WHERE store_id = $1 AND id = $2 FOR UPDATE");
        let locked = sqlx::query_scalar::<_, Uuid>(lock_sql.as_str())
            .bind(store_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to lock {} '{id}' for delete: {error}",
                    kind.as_str()
                ))
            })?;
        if locked.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        for reference in dependents {
            if is_referenced(&mut transaction, store_id, reference, id).await? {
                tracing::debug!(
                    resource = kind.as_str(),
                    dependent = reference.source.as_str(),
                    field = reference.field,
                    "delete blocked by dependent rows"
                );
                return Ok(DeleteOutcome::Blocked(*reference));
            }
        }

        let Some(resource) = fetch_resources(&mut transaction, kind, store_id, Some(id), None)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(DeleteOutcome::NotFound);
        };

        let delete_sql = format!("DELETE FROM {table} WHERE store_id = $1 AND id = $2");
        sqlx::query(delete_sql.as_str())
            .bind(store_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete {} '{id}' in store '{store_id}': {error}",
                    kind.as_str()
                ))
            })?;
        commit(transaction).await?;

        Ok(DeleteOutcome::Deleted(resource))
    }
}
