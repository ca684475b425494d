//! OpenAPI schemas for payloads whose Rust types do not derive `ToSchema`.
//!
//! These mirror the serialised shape of their counterparts and exist only for
//! documentation.

use utoipa::ToSchema;

use crate::domain::PollAnalysis;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error payload.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "topic must not be blank")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field and machine-readable cause, when known.
    details: Option<serde_json::Value>,
}

/// Tagged outcome of an option suggestion.
///
/// `data` is present when `success` is true, `error` otherwise.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SuggestOptionsResponseSchema {
    success: bool,
    #[schema(example = json!(["Pizza", "Sushi", "Tacos", "Salad"]))]
    data: Option<Vec<String>>,
    #[schema(example = "Failed to generate poll options")]
    error: Option<String>,
}

/// Tagged outcome of a result analysis.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AnalysisResponseSchema {
    success: bool,
    data: Option<PollAnalysis>,
    #[schema(example = "Failed to analyze poll results")]
    error: Option<String>,
}
