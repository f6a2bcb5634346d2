use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use vitrine_core::AppError;

pub(super) fn build_cors_layer(
    origins: &[&str],
    identity_header: &str,
) -> Result<CorsLayer, AppError> {
    let identity_header = HeaderName::from_bytes(identity_header.trim().as_bytes())
        .map_err(|error| AppError::Internal(format!("invalid IDENTITY_HEADER: {error}")))?;
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|error| {
                AppError::Internal(format!("invalid CORS origin '{origin}': {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, identity_header]))
}
