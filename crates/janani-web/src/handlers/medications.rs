//! 복약 API 핸들러.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use janani_core::models::health_record::{Medication, NewMedication};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

/// 복약 생성 요청 (본문에 사용자 ID 포함)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub medication: NewMedication,
}

/// 복용 체크 요청
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// 복용 날짜 (YYYY-MM-DD)
    pub date: String,
}

/// 복용 체크 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub id: String,
    pub last_taken_date: Option<String>,
}

/// 복약 목록 조회
///
/// GET /api/medications/{user_id}
pub async fn list_medications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    Ok(Json(state.store.list_medications(&user_id).await?))
}

/// 복약 추가
///
/// POST /api/medications
pub async fn create_medication(
    State(state): State<AppState>,
    Json(req): Json<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId가 비어 있음".to_string()));
    }
    let created = state.store.add_medication(&req.user_id, &req.medication).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 경로의 사용자에게 복약 추가
///
/// POST /api/medications/{user_id}
pub async fn create_medication_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(medication): Json<NewMedication>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let created = state.store.add_medication(&user_id, &medication).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 복약 삭제
///
/// DELETE /api/medications/{user_id}/{id}
pub async fn delete_medication(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_medication(&user_id, &id).await?;
    Ok(Json(MessageResponse::new("Medication deleted")))
}

/// ID만으로 복약 삭제
///
/// DELETE /api/medications/{id}
pub async fn delete_medication_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let owner = owner_of(&state, &id).await?;
    state.store.delete_medication(&owner, &id).await?;
    Ok(Json(MessageResponse::new("Medication deleted")))
}

/// 복용 체크 토글 (같은 날짜면 해제)
///
/// PATCH /api/medications/{user_id}/{id}/toggle
pub async fn toggle_medication(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let medication = state.store.toggle_medication(&user_id, &id, &req.date).await?;
    Ok(Json(ToggleResponse {
        id: medication.id,
        last_taken_date: medication.last_taken_date,
    }))
}

/// ID만으로 복용 체크 토글
///
/// PATCH /api/medications/{id}/toggle
pub async fn toggle_medication_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let owner = owner_of(&state, &id).await?;
    let medication = state.store.toggle_medication(&owner, &id, &req.date).await?;
    Ok(Json(ToggleResponse {
        id: medication.id,
        last_taken_date: medication.last_taken_date,
    }))
}

async fn owner_of(state: &AppState, id: &str) -> Result<String, ApiError> {
    state
        .store
        .medication_owner(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Medication not found: {id}")))
}
