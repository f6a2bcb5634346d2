use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use vitrine_application::require_principal;
use vitrine_core::AppResult;

use crate::dto::{StoreNameRequest, StoreOverviewResponse, StoreResponse};
use crate::error::ApiResult;
use crate::handlers::resources::json_payload;
use crate::middleware::RequestPrincipal;
use crate::state::AppState;

pub async fn create_store_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    payload: Result<Json<StoreNameRequest>, JsonRejection>,
) -> ApiResult<Json<StoreResponse>> {
    let payload = name_payload(&state, &principal, None, payload).await?;

    let store = state
        .store_service
        .create_store(principal.principal(), payload.name.as_str())
        .await?;

    Ok(Json(StoreResponse::from(store)))
}

pub async fn list_stores_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
) -> ApiResult<Json<Vec<StoreResponse>>> {
    let stores = state
        .store_service
        .list_owned_stores(principal.principal())
        .await?
        .into_iter()
        .map(StoreResponse::from)
        .collect();

    Ok(Json(stores))
}

pub async fn get_store_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<StoreResponse>> {
    let store = state
        .store_service
        .get_store(principal.principal(), store_id.as_str())
        .await?;

    Ok(Json(StoreResponse::from(store)))
}

pub async fn rename_store_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path(store_id): Path<String>,
    payload: Result<Json<StoreNameRequest>, JsonRejection>,
) -> ApiResult<Json<StoreResponse>> {
    let payload = name_payload(&state, &principal, Some(store_id.as_str()), payload).await?;

    let store = state
        .store_service
        .rename_store(
            principal.principal(),
            store_id.as_str(),
            payload.name.as_str(),
        )
        .await?;

    Ok(Json(StoreResponse::from(store)))
}

pub async fn delete_store_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<StoreResponse>> {
    let store = state
        .store_service
        .delete_store(principal.principal(), store_id.as_str())
        .await?;

    Ok(Json(StoreResponse::from(store)))
}

pub async fn store_overview_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<StoreOverviewResponse>> {
    let overview = state
        .store_service
        .overview(principal.principal(), store_id.as_str())
        .await?;

    Ok(Json(StoreOverviewResponse::from(overview)))
}

/// Unwraps a name body, reporting path, authentication, and ownership errors first.
async fn name_payload(
    state: &AppState,
    principal: &RequestPrincipal,
    store_id: Option<&str>,
    payload: Result<Json<StoreNameRequest>, JsonRejection>,
) -> AppResult<StoreNameRequest> {
    if payload.is_err() {
        match store_id {
            Some(store_id) => {
                state
                    .store_service
                    .require_owned_store(principal.principal(), store_id)
                    .await?;
            }
            None => {
                require_principal(principal.principal())?;
            }
        }
    }

    json_payload(payload)
}
