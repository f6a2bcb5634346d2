//! Typed parsing of console write payloads.
//!
//! Presence and JSON shape of every field are checked generically from the
//! kind's [`ResourceSpec`] so that errors name the offending field; the body
//! is then decoded into the kind's request type and validated by the domain
//! constructors.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use vitrine_core::{AppError, AppResult, ResourceId};

use crate::catalog::{Billboard, Category, Color, OrderUpdate, Product, ResourceBody, Size};
use crate::resource::{FieldShape, ResourceKind, ResourceSpec};

mod requests;

pub use requests::{
    BillboardRequest, CategoryRequest, ImageInput, OptionRequest, OrderUpdateRequest,
    PriceInput, ProductRequest,
};

/// Parses a create or update payload for a console-creatable kind.
pub fn parse_resource_body(kind: ResourceKind, payload: &Value) -> AppResult<ResourceBody> {
    let spec = kind.spec();
    if !spec.console_creatable {
        return Err(not_console_writable(kind));
    }
    check_fields(spec, payload)?;

    let body = match kind {
        ResourceKind::Billboard => {
            let request: BillboardRequest = decode(kind, payload)?;
            ResourceBody::Billboard(Billboard::new(request.label, request.image_url)?)
        }
        ResourceKind::Category => {
            let request: CategoryRequest = decode(kind, payload)?;
            ResourceBody::Category(Category::new(
                request.name,
                ResourceId::parse_field("billboardId", request.billboard_id.as_str())?,
            )?)
        }
        ResourceKind::Size => {
            let request: OptionRequest = decode(kind, payload)?;
            ResourceBody::Size(Size::new(request.name, request.value)?)
        }
        ResourceKind::Color => {
            let request: OptionRequest = decode(kind, payload)?;
            ResourceBody::Color(Color::new(request.name, request.value)?)
        }
        ResourceKind::Product => {
            let request: ProductRequest = decode(kind, payload)?;
            ResourceBody::Product(Product::new(
                request.name,
                request.price.into_decimal()?,
                ResourceId::parse_field("categoryId", request.category_id.as_str())?,
                ResourceId::parse_field("sizeId", request.size_id.as_str())?,
                ResourceId::parse_field("colorId", request.color_id.as_str())?,
                request.images.into_iter().map(ImageInput::into_url).collect(),
                request.is_featured.unwrap_or(false),
                request.is_archived.unwrap_or(false),
            )?)
        }
        ResourceKind::Order => return Err(not_console_writable(kind)),
    };

    Ok(body)
}

/// Parses the console-editable subset of an order.
pub fn parse_order_update(payload: &Value) -> AppResult<OrderUpdate> {
    let kind = ResourceKind::Order;
    check_fields(kind.spec(), payload)?;
    let request: OrderUpdateRequest = decode(kind, payload)?;

    Ok(OrderUpdate {
        is_paid: request.is_paid,
        phone: request.phone,
        address: request.address,
    })
}

/// Rejects console deletes of kinds that are kept as checkout records.
pub fn require_console_deletable(kind: ResourceKind) -> AppResult<()> {
    if kind.spec().console_deletable {
        Ok(())
    } else {
        Err(not_console_writable(kind))
    }
}

fn not_console_writable(kind: ResourceKind) -> AppError {
    AppError::Validation(format!(
        "{} are created by checkout and cannot be written from the console",
        kind.plural()
    ))
}

fn check_fields(spec: &ResourceSpec, payload: &Value) -> AppResult<()> {
    let object = payload_object(payload)?;

    for field in spec.fields {
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => return Err(missing(field.name)),
            None | Some(Value::Null) => {}
            Some(value) if field.required && is_blank(value) => return Err(missing(field.name)),
            Some(value) if !has_shape(field.shape, value) => {
                return Err(AppError::InvalidField {
                    field: field.name.to_owned(),
                    reason: field.shape.expectation().to_owned(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn decode<T: DeserializeOwned>(kind: ResourceKind, payload: &Value) -> AppResult<T> {
    T::deserialize(payload).map_err(|error| {
        AppError::Validation(format!("invalid {} payload: {error}", kind.as_str()))
    })
}

fn payload_object(payload: &Value) -> AppResult<&Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| AppError::Validation("request body must be a JSON object".to_owned()))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn has_shape(shape: FieldShape, value: &Value) -> bool {
    match shape {
        FieldShape::Text => value.is_string(),
        FieldShape::Flag => value.is_boolean(),
        FieldShape::Price => value.is_number() || value.is_string(),
        FieldShape::Images => value.as_array().is_some_and(|items| {
            items.iter().all(|item| {
                item.is_string() || item.get("url").is_some_and(Value::is_string)
            })
        }),
    }
}

fn missing(field: &str) -> AppError {
    AppError::InvalidField {
        field: field.to_owned(),
        reason: "is required".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use vitrine_core::{AppError, ResourceId};

    use super::{parse_order_update, parse_resource_body, require_console_deletable};
    use crate::{ResourceBody, ResourceKind};

    fn field_of(error: AppError) -> String {
        match error {
            AppError::InvalidField { field, .. } => field,
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[test]
    fn category_requires_billboard_id() {
        let result = parse_resource_body(ResourceKind::Category, &json!({ "name": "Shirts" }));
        assert_eq!(
            result.map_err(field_of).err().as_deref(),
            Some("billboardId")
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let result = parse_resource_body(
            ResourceKind::Billboard,
            &json!({ "label": "   ", "imageUrl": "https://cdn.example.com/a.png" }),
        );
        assert_eq!(result.map_err(field_of).err().as_deref(), Some("label"));
    }

    #[test]
    fn product_parses_numeric_and_object_images() {
        let category_id = ResourceId::new();
        let payload = json!({
            "name": "Tee",
            "price": 19.99,
            "categoryId": category_id.to_string(),
            "sizeId": ResourceId::new().to_string(),
            "colorId": ResourceId::new().to_string(),
            "images": [{ "url": "https://cdn.example.com/a.png" }, "https://cdn.example.com/b.png"],
            "isFeatured": true
        });

        let product = match parse_resource_body(ResourceKind::Product, &payload) {
            Ok(ResourceBody::Product(product)) => product,
            other => panic!("expected product body, got {other:?}"),
        };
        assert_eq!(product.price(), Decimal::new(1999, 2));
        assert_eq!(product.category_id(), category_id);
        assert_eq!(product.images().len(), 2);
        assert!(product.is_featured());
        assert!(!product.is_archived());
    }

    #[test]
    fn product_price_string_must_be_positive() {
        let payload = json!({
            "name": "Tee",
            "price": "0",
            "categoryId": ResourceId::new().to_string(),
            "sizeId": ResourceId::new().to_string(),
            "colorId": ResourceId::new().to_string(),
            "images": ["https://cdn.example.com/a.png"]
        });

        let result = parse_resource_body(ResourceKind::Product, &payload);
        assert_eq!(result.map_err(field_of).err().as_deref(), Some("price"));
    }

    #[test]
    fn malformed_foreign_key_names_the_field() {
        let payload = json!({
            "name": "Tee",
            "price": 10,
            "categoryId": "C1",
            "sizeId": ResourceId::new().to_string(),
            "colorId": ResourceId::new().to_string(),
            "images": ["https://cdn.example.com/a.png"]
        });

        let result = parse_resource_body(ResourceKind::Product, &payload);
        assert_eq!(
            result.map_err(field_of).err().as_deref(),
            Some("categoryId")
        );
    }

    #[test]
    fn orders_cannot_be_parsed_as_console_writes() {
        let result = parse_resource_body(ResourceKind::Order, &json!({}));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn only_orders_refuse_console_deletes() {
        for kind in ResourceKind::all() {
            let result = require_console_deletable(*kind);
            assert_eq!(result.is_err(), *kind == ResourceKind::Order);
        }
    }

    #[test]
    fn wrong_json_types_name_the_field() {
        let result = parse_resource_body(
            ResourceKind::Billboard,
            &json!({ "label": 5, "imageUrl": "https://cdn.example.com/a.png" }),
        );
        assert_eq!(result.map_err(field_of).err().as_deref(), Some("label"));

        let payload = json!({
            "name": "Tee",
            "price": "12.00",
            "categoryId": ResourceId::new().to_string(),
            "sizeId": ResourceId::new().to_string(),
            "colorId": ResourceId::new().to_string(),
            "images": [{ "href": "https://cdn.example.com/a.png" }],
        });
        let result = parse_resource_body(ResourceKind::Product, &payload);
        assert_eq!(result.map_err(field_of).err().as_deref(), Some("images"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let result = parse_resource_body(ResourceKind::Size, &json!(["Small", "S"]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn order_update_reads_optional_fields() {
        let update = parse_order_update(&json!({ "isPaid": true, "phone": "555-0100" }));
        let update = update.unwrap_or_default();
        assert_eq!(update.is_paid, Some(true));
        assert_eq!(update.phone.as_deref(), Some("555-0100"));
        assert!(update.address.is_none());
    }

    #[test]
    fn order_update_rejects_wrong_types() {
        let result = parse_order_update(&json!({ "isPaid": "yes" }));
        assert_eq!(result.map_err(field_of).err().as_deref(), Some("isPaid"));
    }
}
