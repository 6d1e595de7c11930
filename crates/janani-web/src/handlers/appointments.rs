//! 진료 예약 API 핸들러.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use janani_core::models::health_record::{Appointment, NewAppointment};
use serde::Deserialize;

use super::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

/// 예약 생성 요청 (본문에 사용자 ID 포함)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub appointment: NewAppointment,
}

/// GET /api/appointments/{user_id}
pub async fn list_appointments(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(state.store.list_appointments(&user_id).await?))
}

/// POST /api/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId가 비어 있음".to_string()));
    }
    let created = state
        .store
        .add_appointment(&req.user_id, &req.appointment)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/appointments/{user_id}
pub async fn create_appointment_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(appointment): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let created = state.store.add_appointment(&user_id, &appointment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 예약 수정 (없으면 404)
///
/// PUT /api/appointments/{user_id}/{id}
pub async fn update_appointment(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
    Json(appointment): Json<NewAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    let updated = state
        .store
        .update_appointment(&user_id, &id, &appointment)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/appointments/{user_id}/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_appointment(&user_id, &id).await?;
    Ok(Json(MessageResponse::new("Appointment deleted")))
}
