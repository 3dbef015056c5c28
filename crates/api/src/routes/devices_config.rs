//! Device registry endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use domain::models::{Device, DeviceOrder, UpsertDeviceRequest};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::parse_id;
use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub success: bool,
    pub device: Device,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub updated: usize,
}

/// Reorder body: `{deviceOrders: [...]}` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReorderRequest {
    Wrapped {
        #[serde(rename = "deviceOrders")]
        device_orders: Vec<DeviceOrder>,
    },
    Bare(Vec<DeviceOrder>),
}

impl ReorderRequest {
    pub fn into_orders(self) -> Vec<DeviceOrder> {
        match self {
            ReorderRequest::Wrapped { device_orders } => device_orders,
            ReorderRequest::Bare(orders) => orders,
        }
    }
}

fn validated_input(
    payload: Result<Json<UpsertDeviceRequest>, JsonRejection>,
) -> Result<domain::models::DeviceInput, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    request
        .into_input()
        .ok_or_else(|| ApiError::Validation("Category is required".to_string()))
}

/// GET /api/devices-config
pub async fn list_devices(State(state): State<AppState>) -> Result<Json<DevicesResponse>, ApiError> {
    let devices = state.registry.list().await?;
    Ok(Json(DevicesResponse { devices }))
}

/// POST /api/devices-config
pub async fn create_device(
    State(state): State<AppState>,
    payload: Result<Json<UpsertDeviceRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let input = validated_input(payload)?;
    let device = state.registry.create(input).await?;
    Ok(Json(DeviceResponse {
        success: true,
        device,
    }))
}

/// PUT /api/devices-config/:id
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpsertDeviceRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let id = parse_id(&id, DomainError::device_not_found)?;
    let input = validated_input(payload)?;
    let device = state.registry.update(id, input).await?;
    Ok(Json(DeviceResponse {
        success: true,
        device,
    }))
}

/// DELETE /api/devices-config/:id
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id, DomainError::device_not_found)?;
    state.registry.delete(id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Applies every `{id, order}` pair; unknown ids are skipped.
///
/// PUT /api/devices-config/reorder
pub async fn reorder_devices(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Json<ReorderResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|_| ApiError::Validation("deviceOrders must be an array".to_string()))?;

    let outcome = state.registry.reorder(&request.into_orders()).await?;
    Ok(Json(ReorderResponse {
        success: true,
        updated: outcome.updated,
    }))
}
