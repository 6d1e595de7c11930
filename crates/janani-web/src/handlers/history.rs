//! 병력 API 핸들러.

use axum::extract::{Path, State};
use axum::Json;
use janani_core::models::health_record::MedicalHistory;
use serde::Deserialize;
use tracing::debug;

use super::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

/// 병력 저장 요청 (본문에 사용자 ID 포함)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHistoryRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub history: MedicalHistory,
}

/// 병력 조회 (없으면 빈 문서)
///
/// GET /api/history/{user_id}
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MedicalHistory>, ApiError> {
    let history = state.store.get_history(&user_id).await?;
    Ok(Json(history.unwrap_or_default()))
}

/// 병력 저장
///
/// POST /api/history
pub async fn save_history(
    State(state): State<AppState>,
    Json(req): Json<SaveHistoryRequest>,
) -> Result<Json<MedicalHistory>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId가 비어 있음".to_string()));
    }
    debug!("병력 저장: user={}", req.user_id);
    let saved = state.store.upsert_history(&req.user_id, &req.history).await?;
    Ok(Json(saved))
}

/// 병력 교체
///
/// PUT /api/history/{user_id}
pub async fn replace_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(history): Json<MedicalHistory>,
) -> Result<Json<MedicalHistory>, ApiError> {
    let saved = state.store.upsert_history(&user_id, &history).await?;
    Ok(Json(saved))
}

/// 병력 삭제 (없어도 성공)
///
/// DELETE /api/history/{user_id}
pub async fn delete_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_history(&user_id).await?;
    Ok(Json(MessageResponse::new("History deleted")))
}
