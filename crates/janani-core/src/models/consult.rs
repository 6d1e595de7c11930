//! 상담 예약 모델.
//!
//! 의사 디렉토리와 예약된 원격 상담(통화 약속)을 표현.

use serde::{Deserialize, Serialize};

use super::call::CallKind;

/// 상담 가능한 의사
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    /// 의사 ID (예: "D1")
    pub id: String,
    /// 표시 이름
    pub name: String,
    /// 전문 분야
    pub specialty: String,
}

/// 상담 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsultStatus {
    /// 예정됨
    Upcoming,
    /// 통화 중
    Live,
    /// 완료됨
    Completed,
    /// 놓침
    Missed,
}

/// 예약된 원격 상담
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAppointment {
    /// 상담 ID
    pub id: String,
    /// 담당 의사 이름
    pub doctor_name: String,
    /// 환자 이름
    pub patient_name: String,
    /// 날짜 (YYYY-MM-DD)
    pub date: String,
    /// 시간 (HH:MM)
    pub time: String,
    /// 상담 사유
    pub reason: String,
    /// 상태
    pub status: ConsultStatus,
    /// 통화 종류
    #[serde(rename = "type")]
    pub kind: CallKind,
}
