//! 건강 기록 문서 모델.
//!
//! 사용자별로 저장되는 병력, 복약, 진료 예약 문서.
//! REST API에서 camelCase JSON으로 주고받는다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 병력 문서 (사용자당 1건)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    /// 기저 질환
    #[serde(default)]
    pub conditions: String,
    /// 수술 이력
    #[serde(default)]
    pub surgeries: String,
    /// 알레르기
    #[serde(default)]
    pub allergies: String,
    /// 마지막 수정 시각 (저장 전이면 None)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 복약 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// 항목 ID
    pub id: String,
    /// 약 이름
    pub name: String,
    /// 용량
    pub dosage: String,
    /// 복용 시각 (예: "08:00 AM")
    pub time: String,
    /// 마지막 복용 날짜 (YYYY-MM-DD)
    #[serde(default)]
    pub last_taken_date: Option<String>,
}

/// 복약 항목 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub time: String,
    #[serde(default)]
    pub last_taken_date: Option<String>,
}

impl NewMedication {
    /// 필수 필드 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("dosage", &self.dosage)?;
        require_non_empty("time", &self.time)?;
        if let Some(date) = &self.last_taken_date {
            validate_date("lastTakenDate", date)?;
        }
        Ok(())
    }
}

/// 진료 예약 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// 저장용 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// 저장된 문자열에서 변환
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(CoreError::validation(
                "status",
                format!("알 수 없는 예약 상태: {other}"),
            )),
        }
    }
}

/// 진료 예약
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    /// 날짜 (YYYY-MM-DD)
    pub date: String,
    pub time: String,
    /// 진료 종류 (예: "Antenatal Checkup")
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AppointmentStatus,
}

/// 진료 예약 생성/수정 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_name: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl NewAppointment {
    /// 필수 필드 및 날짜 형식 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_empty("patientName", &self.patient_name)?;
        require_non_empty("date", &self.date)?;
        require_non_empty("time", &self.time)?;
        require_non_empty("type", &self.kind)?;
        validate_date("date", &self.date)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "필수 값이 비어 있음"));
    }
    Ok(())
}

/// `YYYY-MM-DD` 날짜 형식 검증
pub fn validate_date(field: &str, value: &str) -> Result<(), CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| CoreError::validation(field, format!("YYYY-MM-DD 형식이 아님: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_defaults_to_empty_strings() {
        let history: MedicalHistory = serde_json::from_str("{}").unwrap();
        assert_eq!(history, MedicalHistory::default());
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"{"conditions":"","surgeries":"","allergies":""}"#);
    }

    #[test]
    fn medication_uses_camel_case() {
        let med = Medication {
            id: "m1".to_string(),
            name: "Iron Folic Acid".to_string(),
            dosage: "1 tablet".to_string(),
            time: "08:00 AM".to_string(),
            last_taken_date: Some("2026-10-18".to_string()),
        };
        let json = serde_json::to_string(&med).unwrap();
        assert!(json.contains("lastTakenDate"));
    }

    #[test]
    fn new_medication_requires_name() {
        let req = NewMedication {
            name: "  ".to_string(),
            dosage: "500mg".to_string(),
            time: "09:00".to_string(),
            last_taken_date: None,
        };
        assert!(matches!(
            req.validate(),
            Err(CoreError::Validation { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn new_appointment_rejects_bad_date() {
        let req = NewAppointment {
            patient_name: "Sita".to_string(),
            date: "18/10/2026".to_string(),
            time: "10:00".to_string(),
            kind: "Ultrasound".to_string(),
            status: AppointmentStatus::Scheduled,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn appointment_type_field_name() {
        let json = r#"{"patientName":"Sita","date":"2026-10-20","time":"10:00","type":"Ultrasound"}"#;
        let req: NewAppointment = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind, "Ultrasound");
        assert_eq!(req.status, AppointmentStatus::Scheduled);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn appointment_status_parse() {
        assert_eq!(
            AppointmentStatus::parse("Cancelled").unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!(AppointmentStatus::parse("Pending").is_err());
    }
}
