//! AI 건강 분석 포트.
//!
//! 건강 지표/증상/대화를 생성형 AI에 보내 구조화된 답을 받는다.
//! 구현: `janani-network` crate (reqwest)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::i18n::Language;
use crate::models::advisor::{ChatTurn, DietDay, HealthMetrics, RiskAssessment, SymptomAnalysis};
use crate::models::health_record::MedicalHistory;

/// 보고되지 않은 병력 항목 표기
const NOT_REPORTED: &str = "None reported";

/// 위험도 평가 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    pub metrics: HealthMetrics,
    pub history: Option<MedicalHistory>,
    pub language: Language,
}

impl RiskRequest {
    /// 사용자 프롬프트 생성
    pub fn prompt(&self) -> String {
        let m = &self.metrics;
        let history = self
            .history
            .as_ref()
            .map(|h| {
                format!(
                    "\nPatient Medical History:\n\
                     - Pre-existing Conditions: {}\n\
                     - Previous Surgeries: {}\n\
                     - Allergies: {}\n",
                    or_not_reported(&h.conditions),
                    or_not_reported(&h.surgeries),
                    or_not_reported(&h.allergies)
                )
            })
            .unwrap_or_default();

        format!(
            "Analyze the following health metrics for a pregnant woman to detect antenatal complications:\n\
             - Systolic BP: {} mmHg\n\
             - Diastolic BP: {} mmHg\n\
             - Fasting Blood Sugar: {} mg/dL\n\
             - Hemoglobin: {} g/dL\n\
             - Weight: {} kg\n\
             - Age: {}\n\
             - Pregnancy Week: {}\n\
             - HIV Status: {:?}\n\
             - Blood Group Rh Factor: {}\n\
             {history}\n\
             IMPORTANT: Provide the \"reasoning\" and \"recommendations\" in {}.\n\n\
             Perform a detailed multi-class classification.\n\
             1. Classify Risk Level: \"Low Risk\", \"Moderate Risk\", \"High Risk\", \"Critical\".\n\
             2. Calculate a Risk Score from 0 to 100.\n\
             3. Identify Potential Conditions (Include considerations for Rh-isoimmunization \
             if Rh- is present and HIV management if Positive).",
            m.systolic_bp,
            m.diastolic_bp,
            m.blood_sugar,
            m.hemoglobin,
            m.weight,
            m.age,
            m.week_of_pregnancy,
            m.hiv_status,
            m.rh_factor.label(),
            self.language.name()
        )
    }
}

/// 증상 분석 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: String,
    pub language: Language,
}

impl SymptomRequest {
    /// 사용자 프롬프트 생성
    pub fn prompt(&self) -> String {
        format!(
            "A pregnant woman is describing the following symptoms: \"{}\".\n\
             Analyze severity and provide a response in {}.\n\
             1. Severity: \"Self-Care\", \"Consult Doctor\", \"Immediate Emergency\"\n\
             2. Possible medical causes.\n\
             3. Short action plan.",
            self.symptoms.trim(),
            self.language.name()
        )
    }
}

/// 주간 식단 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietRequest {
    pub metrics: HealthMetrics,
    /// 식습관 (예: "Vegetarian")
    pub preference: String,
    pub language: Language,
}

impl DietRequest {
    /// 사용자 프롬프트 생성
    pub fn prompt(&self) -> String {
        let m = &self.metrics;
        let preference = if self.preference.trim().is_empty() {
            "No restriction"
        } else {
            self.preference.trim()
        };
        format!(
            "Create a highly personalized 7-day weekly diet plan for a pregnant woman (Week {}) in {}.\n\
             Food Preference: {preference}\n\
             Current Health Status:\n\
             - Hemoglobin: {} g/dL (Target: 11.0+)\n\
             - Blood Pressure: {}/{} mmHg (Normal: 120/80)\n\
             - Blood Sugar: {} mg/dL (Normal fasting: 70-95 mg/dL)\n\
             - Weight: {} kg\n\
             - HIV Status: {:?}\n\
             - Rh Factor: {}\n\n\
             Specific Clinical Guidance:\n\
             1. If Hemoglobin is low (< 11.0), prioritize iron-rich local foods (e.g., green leafy vegetables, jaggery, beetroot).\n\
             2. If Blood Pressure is high (> 130/85), suggest low-sodium, heart-healthy options and potassium-rich foods.\n\
             3. If Blood Sugar is high (> 95 fasting), provide a low-glycemic diet to manage potential gestational diabetes.\n\
             4. If HIV Positive, ensure high protein and calorie intake to maintain immunity, focusing on zinc and vitamin A/C.\n\
             5. Ensure the diet is balanced for the current week of pregnancy.\n\
             6. Focus on locally available foods in rural India.\n\n\
             Return JSON array of 7 days.",
            m.week_of_pregnancy,
            self.language.name(),
            m.hemoglobin,
            m.systolic_bp,
            m.diastolic_bp,
            m.blood_sugar,
            m.weight,
            m.hiv_status,
            m.rh_factor.label()
        )
    }
}

/// 챗봇 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 이전 대화 (오래된 순)
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub language: Language,
}

fn or_not_reported(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_REPORTED
    } else {
        value
    }
}

/// AI 건강 분석기
///
/// 실패 시 `CoreError::Advisor` 또는 `CoreError::Network`. 대체 응답은 호출자가 정한다.
#[async_trait]
pub trait HealthAdvisor: Send + Sync {
    /// 산전 위험도 평가
    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment, CoreError>;

    /// 증상 심각도 분류
    async fn check_symptoms(
        &self,
        request: &SymptomRequest,
    ) -> Result<SymptomAnalysis, CoreError>;

    /// 7일 식단 생성
    async fn diet_plan(&self, request: &DietRequest) -> Result<Vec<DietDay>, CoreError>;

    /// 상담 챗봇 응답
    async fn chat(&self, request: &ChatRequest) -> Result<String, CoreError>;

    /// 제공자 이름
    fn provider_name(&self) -> &str;
}
