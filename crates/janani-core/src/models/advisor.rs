//! AI 건강 분석 모델.
//!
//! 산전 위험도 평가, 증상 분류, 주간 식단, 상담 챗봇의 요청/응답 데이터.
//! JSON 필드명은 프론트엔드 계약(camelCase)을 따른다.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 임신 주차 상한
pub const MAX_PREGNANCY_WEEK: u32 = 42;

/// 챗봇 연결 실패 시 응답
pub const CHAT_FALLBACK: &str = "Error connecting.";

/// HIV 검사 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HivStatus {
    Positive,
    Negative,
    #[default]
    Unknown,
}

/// Rh 혈액형 인자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RhFactor {
    #[default]
    #[serde(rename = "Rh+")]
    Positive,
    #[serde(rename = "Rh-")]
    Negative,
}

impl RhFactor {
    /// 표기 ("Rh+", "Rh-")
    pub fn label(&self) -> &'static str {
        match self {
            RhFactor::Positive => "Rh+",
            RhFactor::Negative => "Rh-",
        }
    }
}

/// 산전 건강 지표
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// 수축기 혈압 (mmHg)
    #[serde(rename = "systolicBP")]
    pub systolic_bp: f64,
    /// 이완기 혈압 (mmHg)
    #[serde(rename = "diastolicBP")]
    pub diastolic_bp: f64,
    /// 공복 혈당 (mg/dL)
    pub blood_sugar: f64,
    /// 헤모글로빈 (g/dL)
    pub hemoglobin: f64,
    /// 체중 (kg)
    pub weight: f64,
    pub age: u32,
    pub week_of_pregnancy: u32,
    #[serde(default)]
    pub hiv_status: HivStatus,
    #[serde(default)]
    pub rh_factor: RhFactor,
}

impl HealthMetrics {
    /// 측정값 범위 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let readings = [
            ("systolicBP", self.systolic_bp),
            ("diastolicBP", self.diastolic_bp),
            ("bloodSugar", self.blood_sugar),
            ("hemoglobin", self.hemoglobin),
            ("weight", self.weight),
        ];
        for (field, value) in readings {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::validation(field, format!("양수가 아님: {value}")));
            }
        }
        if self.week_of_pregnancy == 0 || self.week_of_pregnancy > MAX_PREGNANCY_WEEK {
            return Err(CoreError::validation(
                "weekOfPregnancy",
                format!("1~{MAX_PREGNANCY_WEEK} 범위 밖: {}", self.week_of_pregnancy),
            ));
        }
        Ok(())
    }
}

/// 위험 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    Critical,
}

/// 위험도 평가 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// 0~100
    pub risk_score: f64,
    pub potential_conditions: Vec<String>,
    pub reasoning: String,
    pub recommendations: Vec<String>,
}

impl RiskAssessment {
    /// 분석 실패 시 결과: 의사 상담을 권하는 고위험 판정
    pub fn fallback() -> Self {
        Self {
            risk_level: RiskLevel::High,
            risk_score: 85.0,
            potential_conditions: vec!["Error".to_string()],
            reasoning: "Analysis unavailable.".to_string(),
            recommendations: vec!["Consult a doctor".to_string()],
        }
    }
}

/// 증상 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymptomSeverity {
    #[serde(rename = "Self-Care")]
    SelfCare,
    #[serde(rename = "Consult Doctor")]
    ConsultDoctor,
    #[serde(rename = "Immediate Emergency")]
    Emergency,
}

/// 증상 분석 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub severity: SymptomSeverity,
    pub possible_causes: Vec<String>,
    pub action_required: String,
}

impl SymptomAnalysis {
    /// 분석 실패 시 결과
    pub fn fallback() -> Self {
        Self {
            severity: SymptomSeverity::ConsultDoctor,
            possible_causes: Vec::new(),
            action_required: "Error".to_string(),
        }
    }
}

/// 하루 식단
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietDay {
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub snack: String,
    pub dinner: String,
    pub calories: String,
}

/// 대화 발화자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// 이전 대화 한 턴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> HealthMetrics {
        HealthMetrics {
            systolic_bp: 142.0,
            diastolic_bp: 92.0,
            blood_sugar: 88.0,
            hemoglobin: 9.8,
            weight: 61.5,
            age: 27,
            week_of_pregnancy: 30,
            hiv_status: HivStatus::Negative,
            rh_factor: RhFactor::Negative,
        }
    }

    #[test]
    fn metrics_use_frontend_field_names() {
        let json = serde_json::to_value(metrics()).unwrap();
        assert_eq!(json["systolicBP"], 142.0);
        assert_eq!(json["weekOfPregnancy"], 30);
        assert_eq!(json["rhFactor"], "Rh-");
        assert_eq!(json["hivStatus"], "Negative");
    }

    #[test]
    fn metrics_default_status_fields() {
        let parsed: HealthMetrics = serde_json::from_str(
            r#"{"systolicBP":120,"diastolicBP":80,"bloodSugar":90,"hemoglobin":11.5,
                "weight":58,"age":24,"weekOfPregnancy":12}"#,
        )
        .unwrap();
        assert_eq!(parsed.hiv_status, HivStatus::Unknown);
        assert_eq!(parsed.rh_factor, RhFactor::Positive);
    }

    #[test]
    fn metrics_validation() {
        assert!(metrics().validate().is_ok());

        let mut bad = metrics();
        bad.week_of_pregnancy = 43;
        assert!(matches!(
            bad.validate(),
            Err(CoreError::Validation { field, .. }) if field == "weekOfPregnancy"
        ));

        let mut bad = metrics();
        bad.hemoglobin = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn risk_level_labels() {
        let parsed: RiskAssessment = serde_json::from_str(
            r#"{"riskLevel":"Moderate Risk","riskScore":48,"potentialConditions":["Anemia"],
                "reasoning":"Low hemoglobin.","recommendations":["Iron supplements"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.risk_level, RiskLevel::Moderate);
        assert_eq!(
            serde_json::to_value(RiskAssessment::fallback()).unwrap()["riskLevel"],
            "High Risk"
        );
    }

    #[test]
    fn severity_labels() {
        let json = serde_json::to_value(SymptomAnalysis::fallback()).unwrap();
        assert_eq!(json["severity"], "Consult Doctor");
        assert_eq!(json["actionRequired"], "Error");
        let parsed: SymptomSeverity = serde_json::from_str(r#""Immediate Emergency""#).unwrap();
        assert_eq!(parsed, SymptomSeverity::Emergency);
    }
}
