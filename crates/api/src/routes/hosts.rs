//! Live host view.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use domain::models::HostView;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostsResponse {
    pub hosts: Vec<HostView>,
    pub last_updated: DateTime<Utc>,
    /// True when the status source was unreachable and every active host
    /// is reported offline.
    pub degraded: bool,
}

/// Reconciles the registry against the status source for this request.
///
/// GET /api/hosts
pub async fn get_hosts(State(state): State<AppState>) -> Result<Json<HostsResponse>, ApiError> {
    let devices = state.registry.list().await?;
    let reconciliation = state.reconciler.reconcile(&devices).await?;

    Ok(Json(HostsResponse {
        hosts: reconciliation.hosts,
        last_updated: Utc::now(),
        degraded: reconciliation.degraded,
    }))
}
