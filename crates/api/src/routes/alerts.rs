//! Recent status alerts.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::FeedEntry;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    /// Only alerts with a greater id are returned.
    pub after: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    pub alerts: Vec<FeedEntry>,
    pub latest_id: u64,
}

/// GET /api/alerts?after=<id>
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let Query(query) = query?;
    let (alerts, latest_id) = state.alerts.since(query.after);
    Ok(Json(AlertsResponse { alerts, latest_id }))
}
