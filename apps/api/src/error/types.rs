use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    blocked_by: Option<String>,
}

impl ErrorResponse {
    pub(super) fn new(message: String) -> Self {
        Self {
            message,
            field: None,
            blocked_by: None,
        }
    }

    pub(super) fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub(super) fn blocked_by(mut self, dependent: String) -> Self {
        self.blocked_by = Some(dependent);
        self
    }
}
