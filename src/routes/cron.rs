use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};

use crate::{
    config::MAX_RETENTION_DAYS,
    dto::audit_dto::{CleanupQuery, CleanupResponse},
    error::{Error, Result},
    middleware::auth::verify_bearer_secret,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/cron/cleanup-audit-logs",
    params(CleanupQuery),
    responses(
        (status = 200, description = "Sweep finished", body = Json<CleanupResponse>),
        (status = 400, description = "Invalid retention window"),
        (status = 401, description = "Missing or wrong cron secret"),
        (status = 500, description = "Audit store unavailable")
    )
)]
#[axum::debug_handler]
pub async fn cleanup_audit_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<CleanupQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    verify_bearer_secret(&headers, &state.config.cron_secret)?;

    let Query(query) =
        query.map_err(|_| Error::BadRequest("days must be a non-negative integer".into()))?;
    let days = match query.days {
        None => state.retention_sweeper.default_days(),
        Some(days) => u32::try_from(days)
            .ok()
            .filter(|d| *d <= MAX_RETENTION_DAYS)
            .ok_or_else(|| {
                Error::BadRequest(format!(
                    "days must be an integer between 0 and {}",
                    MAX_RETENTION_DAYS
                ))
            })?,
    };

    let outcome = state.retention_sweeper.sweep(days).await?;
    Ok(Json(CleanupResponse {
        success: true,
        message: format!(
            "Deleted {} audit log entries older than {} days",
            outcome.deleted, outcome.retention_days
        ),
        deleted: outcome.deleted,
        cutoff: outcome.cutoff,
    }))
}
