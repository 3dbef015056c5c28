//! Per-device status history for the dashboard chart.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use domain::models::{StatusLogEntry, TimeRange};
use domain::services::device_status_log;
use domain::DomainError;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusQuery {
    /// `15m`, `30m` or `1hr`; anything else means `15m`.
    pub time_range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceStatusResponse {
    pub logs: Vec<StatusLogEntry>,
}

/// GET /api/device-status/:id?timeRange=15m|30m|1hr
pub async fn get_device_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeviceStatusQuery>,
) -> Result<Json<DeviceStatusResponse>, ApiError> {
    let id = parse_id(&id, DomainError::device_not_found)?;
    let device = state.registry.get(id).await?;
    let range = TimeRange::parse_lenient(query.time_range.as_deref());

    let logs = device_status_log(state.history.as_ref(), &device, range, Utc::now()).await?;
    Ok(Json(DeviceStatusResponse { logs }))
}
