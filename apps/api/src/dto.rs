mod catalog;
mod common;
mod stores;

pub use catalog::{
    BillboardResponse, CatalogResourceResponse, CategoryResponse, ColorResponse,
    OrderItemResponse, OrderResponse, ProductImageResponse, ProductResponse, SizeResponse,
};
pub use common::HealthResponse;
pub use stores::{StoreNameRequest, StoreOverviewResponse, StoreResponse};
