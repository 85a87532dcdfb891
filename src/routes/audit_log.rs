use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::audit_dto::{AuditLogListQuery, ClientErrorPayload, CreateAuditLogPayload},
    error::Result,
    models::audit_log::{AuditAction, AuditLogEntry, NewAuditLogEntry},
    utils::request_meta::{client_ip, user_agent},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/audit-logs",
    request_body = CreateAuditLogPayload,
    responses(
        (status = 201, description = "Audit entry recorded", body = Json<AuditLogEntry>),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Audit store unavailable")
    )
)]
#[axum::debug_handler]
pub async fn create_audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAuditLogPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let entry = state
        .audit_service
        .log(payload, client_ip(&headers), user_agent(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(AuditLogListQuery),
    responses(
        (status = 200, description = "Entries, newest first", body = Json<Vec<AuditLogEntry>>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
        (status = 500, description = "Audit store unavailable")
    )
)]
#[axum::debug_handler]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogListQuery>,
) -> Result<impl IntoResponse> {
    let entries = state
        .audit_service
        .list_recent(&query.filter(), query.limit)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/client-errors",
    request_body = ClientErrorPayload,
    responses(
        (status = 200, description = "`success` tells whether the report was stored")
    )
)]
#[axum::debug_handler]
pub async fn report_client_error(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ClientErrorPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable client error report");
            return Ok(Json(json!({ "success": false })));
        }
    };
    if let Err(e) = payload.validate() {
        tracing::warn!(error = %e, "invalid client error report");
        return Ok(Json(json!({ "success": false })));
    }

    let details = json!({
        "message": payload.message,
        "stack": payload.stack,
        "url": payload.url,
    });
    let mut entry = NewAuditLogEntry::new(AuditAction::ClientError)
        .details(details.to_string())
        .provenance(client_ip(&headers), user_agent(&headers));
    entry.user_id = payload.user_id;

    // Error reports are best-effort; a store failure is logged, not surfaced.
    let success = match state.audit_service.append(entry).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "failed to record client error");
            false
        }
    };
    Ok(Json(json!({ "success": success })))
}
