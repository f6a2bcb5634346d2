use serde::{Deserialize, Serialize};
use ts_rs::TS;
use vitrine_domain::{Store, StoreOverview};

/// Incoming payload for store creation and rename.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/store-name-request.ts"
)]
pub struct StoreNameRequest {
    #[serde(default)]
    pub name: String,
}

/// API representation of a store.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/store-response.ts"
)]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Dashboard aggregates of a store.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/store-overview-response.ts"
)]
pub struct StoreOverviewResponse {
    /// Decimal amount rendered as a string to keep cents exact.
    pub total_revenue: String,
    #[ts(type = "number")]
    pub sales_count: u64,
    #[ts(type = "number")]
    pub stock_count: u64,
}

impl From<Store> for StoreResponse {
    fn from(value: Store) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            owner_id: value.owner_subject().to_owned(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

impl From<StoreOverview> for StoreOverviewResponse {
    fn from(value: StoreOverview) -> Self {
        Self {
            total_revenue: format!("{:.2}", value.total_revenue),
            sales_count: value.sales_count,
            stock_count: value.stock_count,
        }
    }
}
