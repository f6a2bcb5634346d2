use axum::http::HeaderMap;
use axum::http::header::HeaderName;
use vitrine_core::{AppError, Principal};

/// Resolves the caller's principal from inbound request headers.
///
/// Implementations never fail: missing or malformed credentials resolve to
/// `None` and the request continues anonymously.
pub trait IdentityGate: Send + Sync {
    fn resolve_principal(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Trusts a header populated by the upstream identity provider.
#[derive(Debug, Clone)]
pub struct TrustedHeaderIdentityGate {
    header: HeaderName,
}

impl TrustedHeaderIdentityGate {
    pub fn new(header: &str) -> Result<Self, AppError> {
        let header = HeaderName::from_bytes(header.trim().as_bytes()).map_err(|error| {
            AppError::Validation(format!("invalid IDENTITY_HEADER '{header}': {error}"))
        })?;
        Ok(Self { header })
    }
}

impl IdentityGate for TrustedHeaderIdentityGate {
    fn resolve_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let mut values = headers.get_all(&self.header).iter();
        let value = values.next()?;
        if values.next().is_some() {
            return None;
        }

        let subject = value.to_str().ok()?;
        Principal::new(subject).ok()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::{IdentityGate, TrustedHeaderIdentityGate};

    fn gate() -> TrustedHeaderIdentityGate {
        TrustedHeaderIdentityGate::new("x-principal-id").unwrap_or_else(|_| unreachable!())
    }

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append("x-principal-id", HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn resolves_well_formed_subject() {
        let principal = gate().resolve_principal(&headers(&["user_2abc"]));
        assert_eq!(
            principal.as_ref().map(|principal| principal.subject()),
            Some("user_2abc")
        );
    }

    #[test]
    fn malformed_or_missing_values_are_anonymous() {
        assert!(gate().resolve_principal(&HeaderMap::new()).is_none());
        assert!(gate().resolve_principal(&headers(&[""])).is_none());
        assert!(gate().resolve_principal(&headers(&["two words"])).is_none());
        assert!(gate().resolve_principal(&headers(&["a", "b"])).is_none());

        let mut opaque = HeaderMap::new();
        opaque.insert(
            "x-principal-id",
            HeaderValue::from_bytes(&[0xE2, 0x98, 0x83]).unwrap_or_else(|_| unreachable!()),
        );
        assert!(gate().resolve_principal(&opaque).is_none());
    }

    #[test]
    fn rejects_invalid_header_names() {
        assert!(TrustedHeaderIdentityGate::new("bad header").is_err());
    }
}
