use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;

use super::*;
use vitrine_application::CatalogFilter;
use vitrine_domain::{Billboard, Category, Color, Order, OrderItem, Product, Size};

const BILLBOARD_SELECT: &str = "SELECT r.id, r.store_id, r.label, r.image_url, \
     r.created_at, r.updated_at FROM billboards r";
const CATEGORY_SELECT: &str = "SELECT r.id, r.store_id, r.name, r.billboard_id, \
     r.created_at, r.updated_at FROM categories r";
const SIZE_SELECT: &str = "SELECT r.id, r.store_id, r.name, r.value, \
     r.created_at, r.updated_at FROM sizes r";
const COLOR_SELECT: &str = "SELECT r.id, r.store_id, r.name, r.value, \
     r.created_at, r.updated_at FROM colors r";
const PRODUCT_SELECT: &str = "SELECT r.id, r.store_id, r.name, r.price, r.category_id, \
     r.size_id, r.color_id, r.is_featured, r.is_archived, \
     ARRAY(SELECT i.url FROM product_images i WHERE i.product_id = r.id ORDER BY i.position) \
     AS images, r.created_at, r.updated_at FROM products r";
const ORDER_SELECT: &str = "SELECT r.id, r.store_id, r.is_paid, r.phone, r.address, \
     ARRAY(SELECT oi.product_id FROM order_items oi WHERE oi.order_id = r.id \
     ORDER BY oi.position) AS product_ids, r.created_at, r.updated_at FROM orders r";

/// Base `SELECT ... FROM <table> r` for a kind; callers append the `WHERE` clause.
pub(super) fn select_resources(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Billboard => BILLBOARD_SELECT,
        ResourceKind::Category => CATEGORY_SELECT,
        ResourceKind::Size => SIZE_SELECT,
        ResourceKind::Color => COLOR_SELECT,
        ResourceKind::Product => PRODUCT_SELECT,
        ResourceKind::Order => ORDER_SELECT,
    }
}

pub(super) fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    kind: ResourceKind,
    filter: &CatalogFilter,
) {
    match kind {
        ResourceKind::Product => {
            if !filter.include_archived {
                builder.push(" AND NOT r.is_archived");
            }
            if let Some(category_id) = filter.category_id {
                builder.push(" AND r.category_id = ");
                builder.push_bind(category_id.as_uuid());
            }
            if let Some(size_id) = filter.size_id {
                builder.push(" AND r.size_id = ");
                builder.push_bind(size_id.as_uuid());
            }
            if let Some(color_id) = filter.color_id {
                builder.push(" AND r.color_id = ");
                builder.push_bind(color_id.as_uuid());
            }
            if let Some(is_featured) = filter.is_featured {
                builder.push(" AND r.is_featured = ");
                builder.push_bind(is_featured);
            }
        }
        ResourceKind::Order => {
            if let Some(is_paid) = filter.is_paid {
                builder.push(" AND r.is_paid = ");
                builder.push_bind(is_paid);
            }
        }
        ResourceKind::Billboard
        | ResourceKind::Category
        | ResourceKind::Size
        | ResourceKind::Color => {}
    }
}

pub(super) async fn decode(
    connection: &mut PgConnection,
    kind: ResourceKind,
    builder: &mut QueryBuilder<'_, Postgres>,
) -> AppResult<Vec<CatalogResource>> {
    match kind {
        ResourceKind::Billboard => decode_rows::<BillboardRow>(connection, builder).await,
        ResourceKind::Category => decode_rows::<CategoryRow>(connection, builder).await,
        ResourceKind::Size => decode_rows::<SizeRow>(connection, builder).await,
        ResourceKind::Color => decode_rows::<ColorRow>(connection, builder).await,
        ResourceKind::Product => decode_rows::<ProductRow>(connection, builder).await,
        ResourceKind::Order => decode_rows::<OrderRow>(connection, builder).await,
    }
}

async fn decode_rows<R>(
    connection: &mut PgConnection,
    builder: &mut QueryBuilder<'_, Postgres>,
) -> AppResult<Vec<CatalogResource>>
where
    R: ResourceRow,
{
    builder
        .build_query_as::<R>()
        .fetch_all(&mut *connection)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?
        .into_iter()
        .map(ResourceRow::into_resource)
        .collect()
}

/// Row shape of one kind's `SELECT`.
trait ResourceRow: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    fn into_resource(self) -> AppResult<CatalogResource>;
}

fn assemble(
    id: Uuid,
    store_id: Uuid,
    body: AppResult<ResourceBody>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> AppResult<CatalogResource> {
    let body = body.map_err(|error| {
        AppError::Internal(format!("persisted resource '{id}' is invalid: {error}"))
    })?;

    Ok(CatalogResource::new(
        ResourceId::from_uuid(id),
        StoreId::from_uuid(store_id),
        body,
        created_at,
        updated_at,
    ))
}

#[derive(Debug, FromRow)]
struct BillboardRow {
    id: Uuid,
    store_id: Uuid,
    label: String,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for BillboardRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let body = Billboard::new(self.label, self.image_url).map(ResourceBody::Billboard);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    store_id: Uuid,
    name: String,
    billboard_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for CategoryRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let body = Category::new(self.name, ResourceId::from_uuid(self.billboard_id))
            .map(ResourceBody::Category);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}

#[derive(Debug, FromRow)]
struct SizeRow {
    id: Uuid,
    store_id: Uuid,
    name: String,
    value: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for SizeRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let body = Size::new(self.name, self.value).map(ResourceBody::Size);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}

#[derive(Debug, FromRow)]
struct ColorRow {
    id: Uuid,
    store_id: Uuid,
    name: String,
    value: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for ColorRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let body = Color::new(self.name, self.value).map(ResourceBody::Color);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    store_id: Uuid,
    name: String,
    price: Decimal,
    category_id: Uuid,
    size_id: Uuid,
    color_id: Uuid,
    is_featured: bool,
    is_archived: bool,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for ProductRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let body = Product::new(
            self.name,
            self.price,
            ResourceId::from_uuid(self.category_id),
            ResourceId::from_uuid(self.size_id),
            ResourceId::from_uuid(self.color_id),
            self.images,
            self.is_featured,
            self.is_archived,
        )
        .map(ResourceBody::Product);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    store_id: Uuid,
    is_paid: bool,
    phone: String,
    address: String,
    product_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow for OrderRow {
    fn into_resource(self) -> AppResult<CatalogResource> {
        let items = self
            .product_ids
            .into_iter()
            .map(|product_id| OrderItem::new(ResourceId::from_uuid(product_id)))
            .collect();
        let body = Order::new(items, self.is_paid, self.phone, self.address).map(ResourceBody::Order);
        assemble(self.id, self.store_id, body, self.created_at, self.updated_at)
    }
}
