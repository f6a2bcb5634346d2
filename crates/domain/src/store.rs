use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vitrine_core::{AppResult, NonEmptyString, StoreId};

/// Tenant root; every catalog resource lives under exactly one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    id: StoreId,
    name: NonEmptyString,
    owner_subject: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Store {
    /// Creates a store record.
    pub fn new(
        id: StoreId,
        name: impl Into<String>,
        owner_subject: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            owner_subject: owner_subject.into(),
            created_at,
            updated_at,
        })
    }

    /// Returns the store identifier.
    #[must_use]
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the subject of the owning principal.
    #[must_use]
    pub fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    /// Returns whether `subject` owns this store.
    #[must_use]
    pub fn is_owned_by(&self, subject: &str) -> bool {
        self.owner_subject == subject
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

    /// Returns a renamed copy; the owner never changes.
    #[must_use]
    pub fn renamed(&self, name: NonEmptyString, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            name,
            owner_subject: self.owner_subject.clone(),
            created_at: self.created_at,
            updated_at,
        }
    }
}

/// Dashboard aggregates for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOverview {
    /// Sum of product prices across items of paid orders.
    pub total_revenue: Decimal,
    /// Number of paid orders.
    pub sales_count: u64,
    /// Number of products that are not archived.
    pub stock_count: u64,
}
