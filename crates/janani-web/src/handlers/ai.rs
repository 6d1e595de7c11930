//! AI 건강 분석 API 핸들러.
//!
//! 분석기가 연결되지 않았으면 503. 분석기 호출이 실패하면
//! 각 기능의 대체 응답(고위험 판정, 의사 상담 권고, 빈 식단, 연결 실패 문구)을 200으로 돌려준다.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use janani_core::i18n::Language;
use janani_core::models::advisor::{
    ChatTurn, DietDay, HealthMetrics, RiskAssessment, SymptomAnalysis, CHAT_FALLBACK,
};
use janani_core::models::health_record::MedicalHistory;
use janani_core::ports::advisor::{
    ChatRequest, DietRequest, HealthAdvisor, RiskRequest, SymptomRequest,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// 위험도 평가 요청 본문
#[derive(Debug, Deserialize)]
pub struct RiskBody {
    pub metrics: HealthMetrics,
    #[serde(default)]
    pub history: Option<MedicalHistory>,
    #[serde(default)]
    pub language: Language,
}

/// 증상 분석 요청 본문
#[derive(Debug, Deserialize)]
pub struct SymptomBody {
    pub symptoms: String,
    #[serde(default)]
    pub language: Language,
}

/// 식단 요청 본문
#[derive(Debug, Deserialize)]
pub struct DietBody {
    pub metrics: HealthMetrics,
    #[serde(default)]
    pub preference: String,
    #[serde(default)]
    pub language: Language,
}

/// 챗봇 요청 본문
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
    #[serde(default)]
    pub language: Language,
}

/// 챗봇 응답
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

fn advisor(state: &AppState) -> Result<Arc<dyn HealthAdvisor>, ApiError> {
    state
        .advisor
        .clone()
        .ok_or_else(|| ApiError::Unavailable("AI 건강 분석이 비활성화됨".to_string()))
}

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field}가 비어 있음")));
    }
    Ok(())
}

/// 산전 위험도 평가
///
/// POST /api/ai/risk
pub async fn assess_risk(
    State(state): State<AppState>,
    Json(body): Json<RiskBody>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let advisor = advisor(&state)?;
    body.metrics.validate()?;
    let request = RiskRequest {
        metrics: body.metrics,
        history: body.history,
        language: body.language,
    };
    let assessment = advisor.assess_risk(&request).await.unwrap_or_else(|e| {
        warn!("위험도 평가 실패, 대체 응답 사용: {e}");
        RiskAssessment::fallback()
    });
    Ok(Json(assessment))
}

/// 증상 분석
///
/// POST /api/ai/symptoms
pub async fn check_symptoms(
    State(state): State<AppState>,
    Json(body): Json<SymptomBody>,
) -> Result<Json<SymptomAnalysis>, ApiError> {
    let advisor = advisor(&state)?;
    required("symptoms", &body.symptoms)?;
    let request = SymptomRequest {
        symptoms: body.symptoms,
        language: body.language,
    };
    let analysis = advisor.check_symptoms(&request).await.unwrap_or_else(|e| {
        warn!("증상 분석 실패, 대체 응답 사용: {e}");
        SymptomAnalysis::fallback()
    });
    Ok(Json(analysis))
}

/// 7일 식단
///
/// POST /api/ai/diet
pub async fn diet_plan(
    State(state): State<AppState>,
    Json(body): Json<DietBody>,
) -> Result<Json<Vec<DietDay>>, ApiError> {
    let advisor = advisor(&state)?;
    body.metrics.validate()?;
    let request = DietRequest {
        metrics: body.metrics,
        preference: body.preference,
        language: body.language,
    };
    let days = advisor.diet_plan(&request).await.unwrap_or_else(|e| {
        warn!("식단 생성 실패, 빈 식단 반환: {e}");
        Vec::new()
    });
    Ok(Json(days))
}

/// 상담 챗봇
///
/// POST /api/ai/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let advisor = advisor(&state)?;
    required("message", &body.message)?;
    let request = ChatRequest {
        history: body.history,
        message: body.message,
        language: body.language,
    };
    let reply = advisor.chat(&request).await.unwrap_or_else(|e| {
        warn!("챗봇 응답 실패: {e}");
        CHAT_FALLBACK.to_string()
    });
    Ok(Json(ChatReply { reply }))
}
