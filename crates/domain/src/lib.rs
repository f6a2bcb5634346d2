//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod payload;
mod resource;
mod store;

pub use catalog::{
    Billboard, CatalogResource, Category, Color, ColorValue, Order, OrderItem, OrderUpdate,
    PRICE_MAX_INTEGER_DIGITS, PRICE_MAX_SCALE, Product, ResourceBody, Size,
};
pub use payload::{
    BillboardRequest, CategoryRequest, ImageInput, OptionRequest, OrderUpdateRequest,
    PriceInput, ProductRequest, parse_order_update, parse_resource_body,
    require_console_deletable,
};
pub use resource::{FieldShape, PayloadField, ResourceKind, ResourceReference, ResourceSpec};
pub use store::{Store, StoreOverview};
