use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vitrine_core::{AppError, AppResult, NonEmptyString, ResourceId, StoreId};

use crate::resource::{ResourceKind, ResourceReference};

/// Maximum number of fractional digits accepted on a price.
pub const PRICE_MAX_SCALE: u32 = 2;

/// Maximum number of integer digits accepted on a price; matches `NUMERIC(12, 2)`.
pub const PRICE_MAX_INTEGER_DIGITS: u32 = 10;

/// Hero banner displayed at the top of category pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Billboard {
    label: NonEmptyString,
    image_url: NonEmptyString,
}

impl Billboard {
    /// Creates a validated billboard body.
    pub fn new(label: impl Into<String>, image_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            label: field_text("label", label)?,
            image_url: field_text("imageUrl", image_url)?,
        })
    }

    /// Returns the billboard label.
    #[must_use]
    pub fn label(&self) -> &NonEmptyString {
        &self.label
    }

    /// Returns the billboard image URL.
    #[must_use]
    pub fn image_url(&self) -> &NonEmptyString {
        &self.image_url
    }
}

/// Product grouping that renders beneath a billboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: NonEmptyString,
    billboard_id: ResourceId,
}

impl Category {
    /// Creates a validated category body.
    pub fn new(name: impl Into<String>, billboard_id: ResourceId) -> AppResult<Self> {
        Ok(Self {
            name: field_text("name", name)?,
            billboard_id,
        })
    }

    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the referenced billboard.
    #[must_use]
    pub fn billboard_id(&self) -> ResourceId {
        self.billboard_id
    }
}

/// Size option such as `Small` / `S`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Size {
    name: NonEmptyString,
    value: NonEmptyString,
}

impl Size {
    /// Creates a validated size body.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            name: field_text("name", name)?,
            value: field_text("value", value)?,
        })
    }

    /// Returns the size name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the short size value.
    #[must_use]
    pub fn value(&self) -> &NonEmptyString {
        &self.value
    }
}

/// Hex color token in `#RGB` or `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorValue(String);

impl ColorValue {
    /// Creates a validated color token.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').ok_or_else(|| AppError::InvalidField {
            field: "value".to_owned(),
            reason: "must be a hex color starting with '#'".to_owned(),
        })?;

        if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(AppError::InvalidField {
                field: "value".to_owned(),
                reason: format!("'{trimmed}' is not a #RGB or #RRGGBB color"),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the color token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Color option shown as a swatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    name: NonEmptyString,
    value: ColorValue,
}

impl Color {
    /// Creates a validated color body.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            name: field_text("name", name)?,
            value: ColorValue::new(value)?,
        })
    }

    /// Returns the color name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the hex color token.
    #[must_use]
    pub fn value(&self) -> &ColorValue {
        &self.value
    }
}

/// Sellable catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    name: NonEmptyString,
    price: Decimal,
    category_id: ResourceId,
    size_id: ResourceId,
    color_id: ResourceId,
    images: Vec<NonEmptyString>,
    is_featured: bool,
    is_archived: bool,
}

impl Product {
    /// Creates a validated product body.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        category_id: ResourceId,
        size_id: ResourceId,
        color_id: ResourceId,
        images: Vec<String>,
        is_featured: bool,
        is_archived: bool,
    ) -> AppResult<Self> {
        if price <= Decimal::ZERO {
            return Err(AppError::InvalidField {
                field: "price".to_owned(),
                reason: "must be greater than zero".to_owned(),
            });
        }

        if price >= Decimal::new(10_i64.pow(PRICE_MAX_INTEGER_DIGITS), 0) {
            return Err(AppError::InvalidField {
                field: "price".to_owned(),
                reason: format!("must have at most {PRICE_MAX_INTEGER_DIGITS} integer digits"),
            });
        }

        let price = price.normalize();
        if price.scale() > PRICE_MAX_SCALE {
            return Err(AppError::InvalidField {
                field: "price".to_owned(),
                reason: format!("must have at most {PRICE_MAX_SCALE} decimal places"),
            });
        }

        if images.is_empty() {
            return Err(AppError::InvalidField {
                field: "images".to_owned(),
                reason: "at least one image is required".to_owned(),
            });
        }

        let images = images
            .into_iter()
            .map(|url| field_text("images", url))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name: field_text("name", name)?,
            price,
            category_id,
            size_id,
            color_id,
            images,
            is_featured,
            is_archived,
        })
    }

    /// Returns the product name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the unit price.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the referenced category.
    #[must_use]
    pub fn category_id(&self) -> ResourceId {
        self.category_id
    }

    /// Returns the referenced size.
    #[must_use]
    pub fn size_id(&self) -> ResourceId {
        self.size_id
    }

    /// Returns the referenced color.
    #[must_use]
    pub fn color_id(&self) -> ResourceId {
        self.color_id
    }

    /// Returns the product image URLs in display order.
    #[must_use]
    pub fn images(&self) -> &[NonEmptyString] {
        &self.images
    }

    /// Returns whether the product is featured on the storefront home page.
    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    /// Returns whether the product is hidden from storefront listings.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.is_archived
    }
}

/// One purchased product inside an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    product_id: ResourceId,
}

impl OrderItem {
    /// Creates an order item for a product.
    #[must_use]
    pub fn new(product_id: ResourceId) -> Self {
        Self { product_id }
    }

    /// Returns the purchased product.
    #[must_use]
    pub fn product_id(&self) -> ResourceId {
        self.product_id
    }
}

/// Storefront order placed through checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    items: Vec<OrderItem>,
    is_paid: bool,
    phone: String,
    address: String,
}

impl Order {
    /// Creates an order body.
    pub fn new(
        items: Vec<OrderItem>,
        is_paid: bool,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> AppResult<Self> {
        if items.is_empty() {
            return Err(AppError::InvalidField {
                field: "orderItems".to_owned(),
                reason: "an order must contain at least one item".to_owned(),
            });
        }

        Ok(Self {
            items,
            is_paid,
            phone: phone.into(),
            address: address.into(),
        })
    }

    /// Returns the purchased items.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns whether checkout completed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    /// Returns the customer phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Returns the shipping address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Returns a copy with the console-editable fields replaced.
    #[must_use]
    pub fn apply(&self, update: &OrderUpdate) -> Self {
        Self {
            items: self.items.clone(),
            is_paid: update.is_paid.unwrap_or(self.is_paid),
            phone: update.phone.clone().unwrap_or_else(|| self.phone.clone()),
            address: update
                .address
                .clone()
                .unwrap_or_else(|| self.address.clone()),
        }
    }
}

/// Console edit of an order; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    /// New payment flag.
    pub is_paid: Option<bool>,
    /// New customer phone.
    pub phone: Option<String>,
    /// New shipping address.
    pub address: Option<String>,
}

/// Kind-specific attributes of a catalog resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBody {
    /// Billboard attributes.
    Billboard(Billboard),
    /// Category attributes.
    Category(Category),
    /// Size attributes.
    Size(Size),
    /// Color attributes.
    Color(Color),
    /// Product attributes.
    Product(Product),
    /// Order attributes.
    Order(Order),
}

impl ResourceBody {
    /// Returns the kind of this body.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Billboard(_) => ResourceKind::Billboard,
            Self::Category(_) => ResourceKind::Category,
            Self::Size(_) => ResourceKind::Size,
            Self::Color(_) => ResourceKind::Color,
            Self::Product(_) => ResourceKind::Product,
            Self::Order(_) => ResourceKind::Order,
        }
    }

    /// Returns the foreign-key values held by this body, paired with their edge.
    #[must_use]
    pub fn outgoing_references(&self) -> Vec<(&'static ResourceReference, ResourceId)> {
        let references = self.kind().spec().references;
        match self {
            Self::Billboard(_) | Self::Size(_) | Self::Color(_) => Vec::new(),
            Self::Category(category) => references
                .iter()
                .map(|reference| (reference, category.billboard_id()))
                .collect(),
            Self::Product(product) => references
                .iter()
                .filter_map(|reference| {
                    let value = match reference.field {
                        "categoryId" => product.category_id(),
                        "sizeId" => product.size_id(),
                        "colorId" => product.color_id(),
                        _ => return None,
                    };
                    Some((reference, value))
                })
                .collect(),
            Self::Order(order) => references
                .iter()
                .flat_map(|reference| {
                    order
                        .items()
                        .iter()
                        .map(move |item| (reference, item.product_id()))
                })
                .collect(),
        }
    }

    /// Returns whether this body holds `id` in the foreign key described by `reference`.
    #[must_use]
    pub fn references(&self, reference: &ResourceReference, id: ResourceId) -> bool {
        self.kind() == reference.source
            && self
                .outgoing_references()
                .iter()
                .any(|(edge, value)| edge.field == reference.field && *value == id)
    }
}

/// Persisted store-scoped resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResource {
    id: ResourceId,
    store_id: StoreId,
    body: ResourceBody,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CatalogResource {
    /// Assembles a persisted resource.
    #[must_use]
    pub fn new(
        id: ResourceId,
        store_id: StoreId,
        body: ResourceBody,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            store_id,
            body,
            created_at,
            updated_at,
        }
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the owning store.
    #[must_use]
    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.body.kind()
    }

    /// Returns the kind-specific attributes.
    #[must_use]
    pub fn body(&self) -> &ResourceBody {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy carrying a replaced body and update timestamp.
    #[must_use]
    pub fn with_body(&self, body: ResourceBody, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            store_id: self.store_id,
            body,
            created_at: self.created_at,
            updated_at,
        }
    }
}

fn field_text(field: &str, value: impl Into<String>) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value).map_err(|_| AppError::InvalidField {
        field: field.to_owned(),
        reason: "is required".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use vitrine_core::{AppError, ResourceId};

    use super::{Color, ColorValue, Order, OrderItem, OrderUpdate, Product, ResourceBody};
    use crate::ResourceKind;

    fn product_with_price(price: Decimal) -> Result<Product, AppError> {
        Product::new(
            "Tee",
            price,
            ResourceId::new(),
            ResourceId::new(),
            ResourceId::new(),
            vec!["https://cdn.example.com/tee.png".to_owned()],
            false,
            false,
        )
    }

    #[test]
    fn color_accepts_short_and_long_hex() {
        assert!(ColorValue::new("#fff").is_ok());
        assert!(ColorValue::new("#00AAff").is_ok());
    }

    #[test]
    fn color_rejects_named_colors() {
        let result = Color::new("Red", "red");
        assert!(matches!(
            result,
            Err(AppError::InvalidField { ref field, .. }) if field == "value"
        ));
    }

    #[test]
    fn product_rejects_non_positive_price() {
        assert!(product_with_price(Decimal::ZERO).is_err());
        assert!(product_with_price(Decimal::new(-100, 2)).is_err());
        assert!(product_with_price(Decimal::new(1999, 2)).is_ok());
    }

    #[test]
    fn product_rejects_sub_cent_price() {
        let result = product_with_price(Decimal::new(19999, 3));
        assert!(matches!(
            result,
            Err(AppError::InvalidField { ref field, .. }) if field == "price"
        ));
    }

    #[test]
    fn product_price_scale_ignores_trailing_zeros() {
        let product = product_with_price(Decimal::new(10500, 3)).unwrap_or_else(|_| unreachable!());
        assert_eq!(product.price(), Decimal::new(1050, 2));
    }

    #[test]
    fn product_price_fits_twelve_digit_column() {
        assert!(product_with_price(Decimal::new(999_999_999_999, 2)).is_ok());
        assert!(matches!(
            product_with_price(Decimal::new(10_000_000_000, 0)),
            Err(AppError::InvalidField { ref field, .. }) if field == "price"
        ));
        assert!(product_with_price(Decimal::from_i128_with_scale(10_i128.pow(20), 0)).is_err());
    }

    #[test]
    fn product_references_expose_all_three_foreign_keys() {
        let product = product_with_price(Decimal::ONE).unwrap_or_else(|_| unreachable!());
        let body = ResourceBody::Product(product.clone());
        let fields: Vec<_> = body
            .outgoing_references()
            .iter()
            .map(|(reference, _)| reference.field)
            .collect();
        assert_eq!(fields, vec!["categoryId", "sizeId", "colorId"]);

        let category_edge = ResourceKind::Category
            .dependents()
            .next()
            .unwrap_or_else(|| unreachable!());
        assert!(body.references(category_edge, product.category_id()));
        assert!(!body.references(category_edge, product.size_id()));
    }

    #[test]
    fn order_update_keeps_absent_fields() {
        let order = Order::new(vec![OrderItem::new(ResourceId::new())], false, "555", "Main St")
            .unwrap_or_else(|_| unreachable!());
        let updated = order.apply(&OrderUpdate {
            is_paid: Some(true),
            ..OrderUpdate::default()
        });

        assert!(updated.is_paid());
        assert_eq!(updated.phone(), "555");
        assert_eq!(updated.items(), order.items());
    }

    proptest! {
        #[test]
        fn six_digit_hex_colors_are_accepted(value in "#[0-9a-fA-F]{6}") {
            prop_assert!(ColorValue::new(value).is_ok());
        }

        #[test]
        fn colors_without_hash_are_rejected(value in "[0-9a-fA-F]{6}") {
            prop_assert!(ColorValue::new(value).is_err());
        }

        #[test]
        fn positive_cent_prices_are_accepted(cents in 1_i64..1_000_000_000) {
            prop_assert!(product_with_price(Decimal::new(cents, 2)).is_ok());
        }
    }
}
