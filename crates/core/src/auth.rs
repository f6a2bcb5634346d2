use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Maximum accepted length of a principal subject.
pub const PRINCIPAL_MAX_LENGTH: usize = 255;

/// Authenticated caller as reported by the identity provider.
///
/// The subject is opaque; the only guarantee is that it is 1 to 255 visible
/// ASCII characters without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
}

impl Principal {
    /// Creates a principal from a validated subject.
    pub fn new(subject: impl Into<String>) -> AppResult<Self> {
        let subject = subject.into();
        if subject.is_empty() || subject.len() > PRINCIPAL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "principal subject must be between 1 and {PRINCIPAL_MAX_LENGTH} characters"
            )));
        }

        if !subject.bytes().all(|byte| byte.is_ascii_graphic()) {
            return Err(AppError::Validation(
                "principal subject must contain only visible ASCII characters".to_owned(),
            ));
        }

        Ok(Self { subject })
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }
}
