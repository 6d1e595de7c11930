//! 원격 상담 통화 API 핸들러.
//!
//! 클리닉 브리지가 연결되지 않았으면 모든 엔드포인트가 503을 반환한다.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use janani_call::consult::NewConsult;
use janani_call::{CallSnapshot, ClinicalBridge};
use janani_core::models::call::CallKind;
use janani_core::models::consult::{CallAppointment, Doctor};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// 즉시 상담 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    pub doctor_id: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
}

/// 통화 시작 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStartedResponse {
    pub call_id: String,
}

fn bridge(state: &AppState) -> Result<&ClinicalBridge, ApiError> {
    state
        .bridge
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("통화 기능이 비활성화됨".to_string()))
}

/// 현재 통화 상태
///
/// GET /api/call/status
pub async fn call_status(State(state): State<AppState>) -> Result<Json<CallSnapshot>, ApiError> {
    Ok(Json(bridge(&state)?.controller().snapshot()))
}

/// GET /api/doctors
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Vec<Doctor>>, ApiError> {
    Ok(Json(bridge(&state)?.doctors()))
}

/// GET /api/consults
pub async fn list_consults(
    State(state): State<AppState>,
) -> Result<Json<Vec<CallAppointment>>, ApiError> {
    Ok(Json(bridge(&state)?.consults()))
}

/// 상담 예약
///
/// POST /api/consults
pub async fn schedule_consult(
    State(state): State<AppState>,
    Json(req): Json<NewConsult>,
) -> Result<(StatusCode, Json<CallAppointment>), ApiError> {
    let consult = bridge(&state)?.schedule(&req)?;
    Ok((StatusCode::CREATED, Json(consult)))
}

/// 예약 상담 참여
///
/// POST /api/consults/{id}/join
pub async fn join_consult(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CallStartedResponse>, ApiError> {
    let call_id = bridge(&state)?.join(&id).await?;
    Ok(Json(CallStartedResponse { call_id }))
}

/// 예약 없이 상담 통화 시작
///
/// POST /api/call/start
pub async fn start_call(
    State(state): State<AppState>,
    Json(req): Json<StartCallRequest>,
) -> Result<Json<CallStartedResponse>, ApiError> {
    let call_id = bridge(&state)?
        .call_now(&req.doctor_id, &req.reason, req.kind)
        .await?;
    Ok(Json(CallStartedResponse { call_id }))
}

/// 응급 통화
///
/// POST /api/call/emergency
pub async fn emergency_call(
    State(state): State<AppState>,
) -> Result<Json<CallStartedResponse>, ApiError> {
    let call_id = bridge(&state)?.emergency().await?;
    Ok(Json(CallStartedResponse { call_id }))
}

/// POST /api/call/end
pub async fn end_call(State(state): State<AppState>) -> Result<Json<CallSnapshot>, ApiError> {
    let controller = bridge(&state)?.controller();
    controller.end_call().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/call/mute
pub async fn toggle_mute(State(state): State<AppState>) -> Result<Json<CallSnapshot>, ApiError> {
    let controller = bridge(&state)?.controller();
    controller.toggle_mute().await?;
    Ok(Json(controller.snapshot()))
}

/// POST /api/call/video
pub async fn toggle_video(State(state): State<AppState>) -> Result<Json<CallSnapshot>, ApiError> {
    let controller = bridge(&state)?.controller();
    controller.toggle_video().await?;
    Ok(Json(controller.snapshot()))
}
