//! Operator-facing consistency endpoints.

use axum::extract::State;
use axum::Json;

use facia_engine::reconcile::DriftReport;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/maintenance/drift
///
/// Compares local encodings against the remote collection and reports the
/// symmetric difference. Read-only; repair stays a manual decision.
pub async fn drift_report(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DriftReport>>> {
    let report = state.engine.audit_drift().await?;
    Ok(Json(DataResponse { data: report }))
}
