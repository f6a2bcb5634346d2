use serde::Serialize;
use ts_rs::TS;

mod conversions;

/// API representation of a billboard.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/billboard-response.ts"
)]
pub struct BillboardResponse {
    pub id: String,
    pub store_id: String,
    pub label: String,
    pub image_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// API representation of a category.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/category-response.ts"
)]
pub struct CategoryResponse {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub billboard_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// API representation of a size.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/size-response.ts"
)]
pub struct SizeResponse {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}

/// API representation of a color.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/color-response.ts"
)]
pub struct ColorResponse {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// `#RGB` or `#RRGGBB`.
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One product image.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-image-response.ts"
)]
pub struct ProductImageResponse {
    pub url: String,
}

/// API representation of a product.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-response.ts"
)]
pub struct ProductResponse {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// Decimal amount with two fractional digits.
    pub price: String,
    pub category_id: String,
    pub size_id: String,
    pub color_id: String,
    pub images: Vec<ProductImageResponse>,
    pub is_featured: bool,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One ordered product.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/order-item-response.ts"
)]
pub struct OrderItemResponse {
    pub product_id: String,
}

/// API representation of an order.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/order-response.ts"
)]
pub struct OrderResponse {
    pub id: String,
    pub store_id: String,
    pub order_items: Vec<OrderItemResponse>,
    pub is_paid: bool,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Any catalog resource, serialized without a tag.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/catalog-resource-response.ts"
)]
pub enum CatalogResourceResponse {
    Billboard(BillboardResponse),
    Category(CategoryResponse),
    Size(SizeResponse),
    Color(ColorResponse),
    Product(ProductResponse),
    Order(OrderResponse),
}
