use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Number;
use ts_rs::TS;
use vitrine_core::{AppError, AppResult};

/// Console write body for a billboard.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/billboard-request.ts"
)]
pub struct BillboardRequest {
    /// Banner text.
    pub label: String,
    /// Banner image URL.
    pub image_url: String,
}

/// Console write body for a category.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/category-request.ts"
)]
pub struct CategoryRequest {
    /// Category name.
    pub name: String,
    /// Billboard shown above the category.
    pub billboard_id: String,
}

/// Console write body shared by sizes and colors.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/option-request.ts"
)]
pub struct OptionRequest {
    /// Display name.
    pub name: String,
    /// Size code or hex color token.
    pub value: String,
}

/// Console write body for a product.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/product-request.ts"
)]
pub struct ProductRequest {
    /// Product name.
    pub name: String,
    /// Unit price with at most two decimal places.
    #[ts(type = "number | string")]
    pub price: PriceInput,
    /// Referenced category.
    pub category_id: String,
    /// Referenced size.
    pub size_id: String,
    /// Referenced color.
    pub color_id: String,
    /// Image URLs in display order.
    #[ts(type = "Array<string | { url: string }>")]
    pub images: Vec<ImageInput>,
    /// Featured on the storefront home page; defaults to false.
    #[ts(optional)]
    pub is_featured: Option<bool>,
    /// Hidden from storefront lists; defaults to false.
    #[ts(optional)]
    pub is_archived: Option<bool>,
}

/// Console-editable subset of an order.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/order-update-request.ts"
)]
pub struct OrderUpdateRequest {
    /// New payment state.
    #[ts(optional)]
    pub is_paid: Option<bool>,
    /// Customer phone number.
    #[ts(optional)]
    pub phone: Option<String>,
    /// Shipping address.
    #[ts(optional)]
    pub address: Option<String>,
}

/// Price sent either as a JSON number or as a decimal string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// JSON number.
    Number(Number),
    /// Decimal string such as `"19.99"`.
    Text(String),
}

impl PriceInput {
    /// Converts the input into an exact decimal amount.
    pub fn into_decimal(self) -> AppResult<Decimal> {
        let text = match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        };

        Decimal::from_str(text.as_str())
            .or_else(|_| Decimal::from_scientific(text.as_str()))
            .map_err(|_| AppError::InvalidField {
                field: "price".to_owned(),
                reason: format!("'{text}' is not a valid amount"),
            })
    }
}

/// Product image sent as a bare URL or as an `{ "url": ... }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    /// Bare URL.
    Url(String),
    /// Object carrying the URL.
    Object {
        /// Image URL.
        url: String,
    },
}

impl ImageInput {
    /// Returns the image URL.
    #[must_use]
    pub fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Object { url } => url,
        }
    }
}
