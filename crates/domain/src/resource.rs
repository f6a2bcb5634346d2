use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use vitrine_core::AppError;

/// Store-scoped resource kinds managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Hero banner shown above a category.
    Billboard,
    /// Product grouping that points at a billboard.
    Category,
    /// Product size option.
    Size,
    /// Product color option.
    Color,
    /// Sellable catalog item.
    Product,
    /// Checkout order placed by a storefront customer.
    Order,
}

/// Foreign-key edge in the resource dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceReference {
    /// Kind that holds the foreign key.
    pub source: ResourceKind,
    /// Wire name of the foreign-key field on the source kind.
    pub field: &'static str,
    /// Kind the foreign key points at.
    pub target: ResourceKind,
}

/// JSON shape a payload field must have before it is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// JSON string.
    Text,
    /// JSON boolean.
    Flag,
    /// JSON number or numeric string.
    Price,
    /// Array of URL strings or `{ "url": ... }` objects.
    Images,
}

impl FieldShape {
    /// Short description used in validation messages.
    #[must_use]
    pub fn expectation(&self) -> &'static str {
        match self {
            Self::Text => "must be a string",
            Self::Flag => "must be a boolean",
            Self::Price => "must be a number",
            Self::Images => "must be an array of image URLs",
        }
    }
}

/// Payload field accepted by a console write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadField {
    /// Wire name of the field.
    pub name: &'static str,
    /// Expected JSON shape.
    pub shape: FieldShape,
    /// Whether the field must be present and non-empty.
    pub required: bool,
}

const fn required(name: &'static str, shape: FieldShape) -> PayloadField {
    PayloadField {
        name,
        shape,
        required: true,
    }
}

const fn optional(name: &'static str, shape: FieldShape) -> PayloadField {
    PayloadField {
        name,
        shape,
        required: false,
    }
}

/// Per-kind rules shared by every endpoint of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Described kind.
    pub kind: ResourceKind,
    /// Payload fields accepted on console writes.
    pub fields: &'static [PayloadField],
    /// Outgoing foreign keys; each must resolve inside the same store.
    pub references: &'static [ResourceReference],
    /// Whether the console may create this kind directly.
    pub console_creatable: bool,
    /// Whether the console may delete this kind.
    pub console_deletable: bool,
    /// Whether the public storefront may read this kind.
    pub publicly_readable: bool,
}

const BILLBOARD_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Billboard,
    fields: &[
        required("label", FieldShape::Text),
        required("imageUrl", FieldShape::Text),
    ],
    references: &[],
    console_creatable: true,
    console_deletable: true,
    publicly_readable: true,
};

const CATEGORY_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Category,
    fields: &[
        required("name", FieldShape::Text),
        required("billboardId", FieldShape::Text),
    ],
    references: &[ResourceReference {
        source: ResourceKind::Category,
        field: "billboardId",
        target: ResourceKind::Billboard,
    }],
    console_creatable: true,
    console_deletable: true,
    publicly_readable: true,
};

const SIZE_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Size,
    fields: &[
        required("name", FieldShape::Text),
        required("value", FieldShape::Text),
    ],
    references: &[],
    console_creatable: true,
    console_deletable: true,
    publicly_readable: true,
};

const COLOR_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Color,
    fields: &[
        required("name", FieldShape::Text),
        required("value", FieldShape::Text),
    ],
    references: &[],
    console_creatable: true,
    console_deletable: true,
    publicly_readable: true,
};

const PRODUCT_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Product,
    fields: &[
        required("name", FieldShape::Text),
        required("price", FieldShape::Price),
        required("categoryId", FieldShape::Text),
        required("sizeId", FieldShape::Text),
        required("colorId", FieldShape::Text),
        required("images", FieldShape::Images),
        optional("isFeatured", FieldShape::Flag),
        optional("isArchived", FieldShape::Flag),
    ],
    references: &[
        ResourceReference {
            source: ResourceKind::Product,
            field: "categoryId",
            target: ResourceKind::Category,
        },
        ResourceReference {
            source: ResourceKind::Product,
            field: "sizeId",
            target: ResourceKind::Size,
        },
        ResourceReference {
            source: ResourceKind::Product,
            field: "colorId",
            target: ResourceKind::Color,
        },
    ],
    console_creatable: true,
    console_deletable: true,
    publicly_readable: true,
};

const ORDER_SPEC: ResourceSpec = ResourceSpec {
    kind: ResourceKind::Order,
    fields: &[
        optional("isPaid", FieldShape::Flag),
        optional("phone", FieldShape::Text),
        optional("address", FieldShape::Text),
    ],
    references: &[ResourceReference {
        source: ResourceKind::Order,
        field: "orderItems.productId",
        target: ResourceKind::Product,
    }],
    console_creatable: false,
    console_deletable: false,
    publicly_readable: false,
};

impl ResourceSpec {
    /// Returns the names of fields that must be present on create and update.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + use<> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
    }
}

impl ResourceKind {
    /// Returns every kind in dependency order, parents first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceKind] = &[
            ResourceKind::Billboard,
            ResourceKind::Category,
            ResourceKind::Size,
            ResourceKind::Color,
            ResourceKind::Product,
            ResourceKind::Order,
        ];

        ALL
    }

    /// Returns the singular storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billboard => "billboard",
            Self::Category => "category",
            Self::Size => "size",
            Self::Color => "color",
            Self::Product => "product",
            Self::Order => "order",
        }
    }

    /// Returns the plural collection name used in request paths.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Billboard => "billboards",
            Self::Category => "categories",
            Self::Size => "sizes",
            Self::Color => "colors",
            Self::Product => "products",
            Self::Order => "orders",
        }
    }

    /// Resolves a collection path segment into a kind.
    pub fn from_path_segment(segment: &str) -> Result<Self, AppError> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.plural() == segment)
            .ok_or_else(|| AppError::NotFound(format!("unknown resource collection '{segment}'")))
    }

    /// Returns the rules for this kind.
    #[must_use]
    pub fn spec(&self) -> &'static ResourceSpec {
        match self {
            Self::Billboard => &BILLBOARD_SPEC,
            Self::Category => &CATEGORY_SPEC,
            Self::Size => &SIZE_SPEC,
            Self::Color => &COLOR_SPEC,
            Self::Product => &PRODUCT_SPEC,
            Self::Order => &ORDER_SPEC,
        }
    }

    /// Returns every foreign key in the catalog that points at this kind.
    pub fn dependents(&self) -> impl Iterator<Item = &'static ResourceReference> + use<> {
        let target = *self;
        Self::all()
            .iter()
            .flat_map(|kind| kind.spec().references.iter())
            .filter(move |reference| reference.target == target)
    }
}

impl Display for ResourceKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceKind;

    #[test]
    fn every_kind_resolves_from_its_collection_name() {
        for kind in ResourceKind::all() {
            let restored = ResourceKind::from_path_segment(kind.plural());
            assert_eq!(restored.ok(), Some(*kind));
        }
    }

    #[test]
    fn path_segments_resolve_to_kinds() {
        assert_eq!(
            ResourceKind::from_path_segment("categories").ok(),
            Some(ResourceKind::Category)
        );
        assert!(ResourceKind::from_path_segment("stores").is_err());
    }

    #[test]
    fn billboard_dependents_are_categories() {
        let dependents: Vec<_> = ResourceKind::Billboard.dependents().collect();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].source, ResourceKind::Category);
        assert_eq!(dependents[0].field, "billboardId");
    }

    #[test]
    fn product_is_referenced_by_orders_only() {
        let sources: Vec<_> = ResourceKind::Product
            .dependents()
            .map(|reference| reference.source)
            .collect();
        assert_eq!(sources, vec![ResourceKind::Order]);
    }

    #[test]
    fn leaf_kinds_have_no_dependents() {
        assert_eq!(ResourceKind::Order.dependents().count(), 0);
    }

    #[test]
    fn every_reference_names_a_required_field_or_order_item() {
        for kind in ResourceKind::all() {
            let spec = kind.spec();
            for reference in spec.references {
                assert_eq!(reference.source, *kind);
                assert!(
                    spec.required_fields().any(|field| field == reference.field)
                        || *kind == ResourceKind::Order
                );
            }
        }
    }

    #[test]
    fn orders_accept_only_contact_and_payment_fields() {
        let spec = ResourceKind::Order.spec();
        let names: Vec<_> = spec.fields.iter().map(|field| field.name).collect();
        assert_eq!(names, vec!["isPaid", "phone", "address"]);
        assert_eq!(spec.required_fields().count(), 0);
    }

    #[test]
    fn orders_are_private_and_not_console_writable() {
        let spec = ResourceKind::Order.spec();
        assert!(!spec.console_creatable);
        assert!(!spec.console_deletable);
        assert!(!spec.publicly_readable);
    }
}
