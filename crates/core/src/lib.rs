//! Shared primitives for all Rust crates in Vitrine.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::Principal;

/// Result type used across Vitrine crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Store identifier used as the partition key for every catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Creates a random store identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a store identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a store identifier taken from a request path.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("store id is required".to_owned()));
        }

        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| AppError::Validation(format!("store id '{trimmed}' is malformed")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StoreId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a store-scoped catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Creates a random resource identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a resource identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a resource identifier, naming `field` when it is missing or malformed.
    pub fn parse_field(field: &str, value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidField {
                field: field.to_owned(),
                reason: "is required".to_owned(),
            });
        }

        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| AppError::InvalidField {
                field: field.to_owned(),
                reason: format!("'{trimmed}' is not a valid identifier"),
            })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single payload field is missing or invalid.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Wire name of the offending field.
        field: String,
        /// Short explanation of the violated constraint.
        reason: String,
    },

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Delete blocked because other resources still reference the target.
    #[error("{resource} is still referenced by {dependent} ({field}); remove them first")]
    DependentsExist {
        /// Plural name of the kind being deleted.
        resource: String,
        /// Plural name of the blocking kind.
        dependent: String,
        /// Foreign-key field on the blocking kind.
        field: String,
    },

    /// No authenticated principal accompanied the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Principal is authenticated but does not own the target store.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
