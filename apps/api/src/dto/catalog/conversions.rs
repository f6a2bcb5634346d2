use vitrine_domain::{CatalogResource, ResourceBody};

use super::{
    BillboardResponse, CatalogResourceResponse, CategoryResponse, ColorResponse,
    OrderItemResponse, OrderResponse, ProductImageResponse, ProductResponse, SizeResponse,
};

impl From<CatalogResource> for CatalogResourceResponse {
    fn from(value: CatalogResource) -> Self {
        let id = value.id().to_string();
        let store_id = value.store_id().to_string();
        let created_at = value.created_at().to_rfc3339();
        let updated_at = value.updated_at().to_rfc3339();

        match value.body() {
            ResourceBody::Billboard(billboard) => Self::Billboard(BillboardResponse {
                id,
                store_id,
                label: billboard.label().as_str().to_owned(),
                image_url: billboard.image_url().as_str().to_owned(),
                created_at,
                updated_at,
            }),
            ResourceBody::Category(category) => Self::Category(CategoryResponse {
                id,
                store_id,
                name: category.name().as_str().to_owned(),
                billboard_id: category.billboard_id().to_string(),
                created_at,
                updated_at,
            }),
            ResourceBody::Size(size) => Self::Size(SizeResponse {
                id,
                store_id,
                name: size.name().as_str().to_owned(),
                value: size.value().as_str().to_owned(),
                created_at,
                updated_at,
            }),
            ResourceBody::Color(color) => Self::Color(ColorResponse {
                id,
                store_id,
                name: color.name().as_str().to_owned(),
                value: color.value().as_str().to_owned(),
                created_at,
                updated_at,
            }),
            ResourceBody::Product(product) => Self::Product(ProductResponse {
                id,
                store_id,
                name: product.name().as_str().to_owned(),
                price: format!("{:.2}", product.price()),
                category_id: product.category_id().to_string(),
                size_id: product.size_id().to_string(),
                color_id: product.color_id().to_string(),
                images: product
                    .images()
                    .iter()
                    .map(|url| ProductImageResponse {
                        url: url.as_str().to_owned(),
                    })
                    .collect(),
                is_featured: product.is_featured(),
                is_archived: product.is_archived(),
                created_at,
                updated_at,
            }),
            ResourceBody::Order(order) => Self::Order(OrderResponse {
                id,
                store_id,
                order_items: order
                    .items()
                    .iter()
                    .map(|item| OrderItemResponse {
                        product_id: item.product_id().to_string(),
                    })
                    .collect(),
                is_paid: order.is_paid(),
                phone: order.phone().to_owned(),
                address: order.address().to_owned(),
                created_at,
                updated_at,
            }),
        }
    }
}
