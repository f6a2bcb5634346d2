use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use serde_json::Value;
use vitrine_application::{CatalogFilter, CatalogOperation, PageRequest, ResourceListQuery};
use vitrine_core::{AppError, AppResult, ResourceId};
use vitrine_domain::ResourceKind;

use crate::dto::CatalogResourceResponse;
use crate::error::ApiResult;
use crate::middleware::RequestPrincipal;
use crate::state::AppState;

/// Query string of a collection read. Unknown parameters are ignored.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub category_id: Option<String>,
    pub size_id: Option<String>,
    pub color_id: Option<String>,
    pub is_featured: Option<String>,
    pub include_archived: Option<String>,
    pub is_paid: Option<String>,
}

impl ResourceListParams {
    fn into_query(self, kind: ResourceKind) -> AppResult<ResourceListQuery> {
        let page = PageRequest::new(
            optional_count("limit", self.limit)?,
            optional_count("offset", self.offset)?,
        )?;

        let filter = CatalogFilter {
            category_id: optional_id("categoryId", self.category_id)?,
            size_id: optional_id("sizeId", self.size_id)?,
            color_id: optional_id("colorId", self.color_id)?,
            is_featured: optional_flag("isFeatured", self.is_featured)?,
            include_archived: optional_flag("includeArchived", self.include_archived)?
                .unwrap_or(false),
            is_paid: optional_flag("isPaid", self.is_paid)?,
        };

        Ok(ResourceListQuery { kind, filter, page })
    }
}

pub async fn list_resources_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path((store_id, resource)): Path<(String, String)>,
    query: Result<Query<ResourceListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<CatalogResourceResponse>>> {
    let kind = ResourceKind::from_path_segment(resource.as_str())?;
    let Query(params) = query.map_err(|rejection| {
        AppError::Validation(format!("invalid query string: {}", rejection.body_text()))
    })?;

    let resources = state
        .catalog_service
        .list_resources(
            principal.principal(),
            store_id.as_str(),
            params.into_query(kind)?,
        )
        .await?
        .into_iter()
        .map(CatalogResourceResponse::from)
        .collect();

    Ok(Json(resources))
}

pub async fn get_resource_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path((store_id, resource, id)): Path<(String, String, String)>,
) -> ApiResult<Json<CatalogResourceResponse>> {
    let kind = ResourceKind::from_path_segment(resource.as_str())?;
    let resource = state
        .catalog_service
        .get_resource(principal.principal(), store_id.as_str(), kind, id.as_str())
        .await?;

    Ok(Json(CatalogResourceResponse::from(resource)))
}

pub async fn create_resource_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path((store_id, resource)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CatalogResourceResponse>> {
    let kind = ResourceKind::from_path_segment(resource.as_str())?;
    let payload = write_payload(
        &state,
        &principal,
        store_id.as_str(),
        kind,
        CatalogOperation::Create,
        payload,
    )
    .await?;
    let resource = state
        .catalog_service
        .create_resource(principal.principal(), store_id.as_str(), kind, &payload)
        .await?;

    Ok(Json(CatalogResourceResponse::from(resource)))
}

pub async fn update_resource_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path((store_id, resource, id)): Path<(String, String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CatalogResourceResponse>> {
    let kind = ResourceKind::from_path_segment(resource.as_str())?;
    let payload = write_payload(
        &state,
        &principal,
        store_id.as_str(),
        kind,
        CatalogOperation::Update,
        payload,
    )
    .await?;
    let resource = state
        .catalog_service
        .update_resource(
            principal.principal(),
            store_id.as_str(),
            kind,
            id.as_str(),
            &payload,
        )
        .await?;

    Ok(Json(CatalogResourceResponse::from(resource)))
}

pub async fn delete_resource_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<RequestPrincipal>,
    Path((store_id, resource, id)): Path<(String, String, String)>,
) -> ApiResult<Json<CatalogResourceResponse>> {
    let kind = ResourceKind::from_path_segment(resource.as_str())?;
    let resource = state
        .catalog_service
        .delete_resource(principal.principal(), store_id.as_str(), kind, id.as_str())
        .await?;

    Ok(Json(CatalogResourceResponse::from(resource)))
}

pub(crate) fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        AppError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
    })
}

/// Unwraps a write body; an undecodable body is reported only to the store owner.
async fn write_payload(
    state: &AppState,
    principal: &RequestPrincipal,
    store_id: &str,
    kind: ResourceKind,
    operation: CatalogOperation,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Value> {
    if payload.is_err() {
        state
            .catalog_service
            .require_write_access(principal.principal(), store_id, kind, operation)
            .await?;
    }

    json_payload(payload)
}

fn optional_count(field: &str, value: Option<String>) -> AppResult<Option<usize>> {
    value
        .map(|value| {
            value.trim().parse::<usize>().map_err(|_| AppError::InvalidField {
                field: field.to_owned(),
                reason: format!("'{value}' is not a non-negative integer"),
            })
        })
        .transpose()
}

fn optional_id(field: &str, value: Option<String>) -> AppResult<Option<ResourceId>> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| ResourceId::parse_field(field, value.trim()))
        .transpose()
}

fn optional_flag(field: &str, value: Option<String>) -> AppResult<Option<bool>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(flag) if flag.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(flag) if flag.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(other) => Err(AppError::InvalidField {
            field: field.to_owned(),
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}
