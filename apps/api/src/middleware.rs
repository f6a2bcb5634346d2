use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use vitrine_core::Principal;

use crate::state::AppState;

/// Principal resolved for the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct RequestPrincipal(pub Option<Principal>);

impl RequestPrincipal {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = state.identity_gate.resolve_principal(request.headers());
    request.extensions_mut().insert(RequestPrincipal(principal));
    next.run(request).await
}

/// Rewrites authorization failures to the status codes older consoles expect.
pub async fn legacy_status_codes(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if state.legacy_status_codes {
        let status = response.status_mut();
        *status = legacy_status(*status);
    }

    response
}

fn legacy_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::UNAUTHORIZED => StatusCode::FORBIDDEN,
        StatusCode::FORBIDDEN => StatusCode::METHOD_NOT_ALLOWED,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::legacy_status;

    #[test]
    fn legacy_mapping_only_touches_authorization_failures() {
        assert_eq!(legacy_status(StatusCode::UNAUTHORIZED), StatusCode::FORBIDDEN);
        assert_eq!(
            legacy_status(StatusCode::FORBIDDEN),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(legacy_status(StatusCode::CONFLICT), StatusCode::CONFLICT);
    }
}
