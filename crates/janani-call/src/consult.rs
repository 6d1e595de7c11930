//! 상담 예약부.
//!
//! 고정 의사 목록과 예약된 원격 상담 목록을 관리한다.

use chrono::Local;
use janani_core::error::CoreError;
use janani_core::models::call::{CallKind, CallSession};
use janani_core::models::consult::{CallAppointment, ConsultStatus, Doctor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 응급 통화 상대방 이름
pub const EMERGENCY_COUNTERPART: &str = "Emergency Unit";
/// 응급 통화 사유
pub const EMERGENCY_REASON: &str = "Emergency";

/// 기본 의사 목록
pub fn doctor_directory() -> Vec<Doctor> {
    [
        ("D1", "Dr. Anita Sharma", "Obstetrician"),
        ("D2", "Dr. Priya Varma", "Gynecologist"),
        ("D3", "Dr. Rahul Mehta", "General Physician"),
    ]
    .into_iter()
    .map(|(id, name, specialty)| Doctor {
        id: id.to_string(),
        name: name.to_string(),
        specialty: specialty.to_string(),
    })
    .collect()
}

/// 상담 예약 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsult {
    pub doctor_id: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: CallKind,
    /// 날짜 (없으면 오늘)
    #[serde(default)]
    pub date: Option<String>,
    /// 시각 (HH:MM, 없으면 현재 시각)
    #[serde(default)]
    pub time: Option<String>,
}

/// 상담 예약부
#[derive(Debug, Clone)]
pub struct ConsultBook {
    patient_name: String,
    doctors: Vec<Doctor>,
    consults: Vec<CallAppointment>,
    /// 진행 중인 통화 ID → 상담 ID
    live_calls: HashMap<String, String>,
}

impl ConsultBook {
    /// 빈 예약부 생성
    pub fn new(patient_name: &str) -> Self {
        Self {
            patient_name: patient_name.to_string(),
            doctors: doctor_directory(),
            consults: Vec::new(),
            live_calls: HashMap::new(),
        }
    }

    /// 오늘 09:00 정기 점검 상담 1건이 들어 있는 예약부 생성
    pub fn with_demo(patient_name: &str) -> Self {
        let mut book = Self::new(patient_name);
        book.consults.push(CallAppointment {
            id: "demo-1".to_string(),
            doctor_name: "Dr. Anita Sharma".to_string(),
            patient_name: patient_name.to_string(),
            date: today(),
            time: "09:00".to_string(),
            reason: "Routine follow-up on vitals".to_string(),
            status: ConsultStatus::Upcoming,
            kind: CallKind::Video,
        });
        book
    }

    /// 의사 목록
    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    /// 상담 목록
    pub fn consults(&self) -> &[CallAppointment] {
        &self.consults
    }

    /// ID로 의사 조회
    pub fn doctor(&self, doctor_id: &str) -> Result<&Doctor, CoreError> {
        self.doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .ok_or_else(|| CoreError::not_found("Doctor", doctor_id))
    }

    /// ID로 상담 조회
    pub fn consult(&self, consult_id: &str) -> Result<&CallAppointment, CoreError> {
        self.consults
            .iter()
            .find(|c| c.id == consult_id)
            .ok_or_else(|| CoreError::not_found("CallAppointment", consult_id))
    }

    /// 새 상담 예약 (Upcoming)
    pub fn schedule(&mut self, request: &NewConsult) -> Result<CallAppointment, CoreError> {
        if request.reason.trim().is_empty() {
            return Err(CoreError::validation("reason", "필수 값이 비어 있음"));
        }
        if let Some(date) = &request.date {
            janani_core::models::health_record::validate_date("date", date)?;
        }
        let doctor = self.doctor(&request.doctor_id)?;

        let consult = CallAppointment {
            id: Uuid::new_v4().to_string(),
            doctor_name: doctor.name.clone(),
            patient_name: self.patient_name.clone(),
            date: request.date.clone().unwrap_or_else(today),
            time: request
                .time
                .clone()
                .unwrap_or_else(|| Local::now().format("%H:%M").to_string()),
            reason: request.reason.trim().to_string(),
            status: ConsultStatus::Upcoming,
            kind: request.kind,
        };
        self.consults.insert(0, consult.clone());
        Ok(consult)
    }

    /// 상담을 진행 중으로 표시하고 통화 ID와 연결
    pub fn mark_live(&mut self, consult_id: &str, call_id: &str) -> Result<(), CoreError> {
        let consult = self.consult_mut(consult_id)?;
        consult.status = ConsultStatus::Live;
        self.live_calls
            .insert(call_id.to_string(), consult_id.to_string());
        Ok(())
    }

    /// 보관된 통화를 상담 상태에 반영
    ///
    /// 미디어 획득에 실패한 통화는 다시 참여할 수 있도록 Upcoming으로 되돌린다.
    pub fn record_archived(&mut self, session: &CallSession) -> Option<&CallAppointment> {
        let consult_id = self.live_calls.remove(&session.id)?;
        let status = if session.media_acquisition_failed {
            ConsultStatus::Upcoming
        } else {
            ConsultStatus::Completed
        };
        let consult = self.consult_mut(&consult_id).ok()?;
        consult.status = status;
        Some(consult)
    }

    fn consult_mut(&mut self, consult_id: &str) -> Result<&mut CallAppointment, CoreError> {
        self.consults
            .iter_mut()
            .find(|c| c.id == consult_id)
            .ok_or_else(|| CoreError::not_found("CallAppointment", consult_id))
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(doctor_id: &str) -> NewConsult {
        NewConsult {
            doctor_id: doctor_id.to_string(),
            reason: "Swelling in feet".to_string(),
            kind: CallKind::Voice,
            date: Some("2026-10-20".to_string()),
            time: Some("11:30".to_string()),
        }
    }

    #[test]
    fn directory_has_three_doctors() {
        let book = ConsultBook::new("Sita");
        assert_eq!(book.doctors().len(), 3);
        assert_eq!(book.doctor("D2").unwrap().specialty, "Gynecologist");
    }

    #[test]
    fn schedule_adds_upcoming_consult_first() {
        let mut book = ConsultBook::with_demo("Sita");
        let consult = book.schedule(&request("D3")).unwrap();
        assert_eq!(consult.doctor_name, "Dr. Rahul Mehta");
        assert_eq!(consult.status, ConsultStatus::Upcoming);
        assert_eq!(consult.patient_name, "Sita");
        assert_eq!(book.consults()[0].id, consult.id);
        assert_eq!(book.consults().len(), 2);
    }

    #[test]
    fn schedule_unknown_doctor_is_not_found() {
        let mut book = ConsultBook::new("Sita");
        assert!(matches!(
            book.schedule(&request("D9")),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn schedule_requires_reason() {
        let mut book = ConsultBook::new("Sita");
        let mut req = request("D1");
        req.reason = " ".to_string();
        assert!(matches!(
            book.schedule(&req),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn archived_call_completes_consult() {
        let mut book = ConsultBook::with_demo("Sita");
        let mut session =
            CallSession::with_id("call-1".to_string(), "Dr. Anita Sharma", "vitals", CallKind::Video);
        book.mark_live("demo-1", "call-1").unwrap();
        assert_eq!(book.consult("demo-1").unwrap().status, ConsultStatus::Live);

        session.phase = janani_core::models::call::CallPhase::Ended;
        let updated = book.record_archived(&session).unwrap();
        assert_eq!(updated.status, ConsultStatus::Completed);
        assert!(book.record_archived(&session).is_none());
    }

    #[test]
    fn failed_media_returns_consult_to_upcoming() {
        let mut book = ConsultBook::with_demo("Sita");
        let mut session =
            CallSession::with_id("call-1".to_string(), "Dr. Anita Sharma", "vitals", CallKind::Video);
        session.media_acquisition_failed = true;
        book.mark_live("demo-1", "call-1").unwrap();

        let updated = book.record_archived(&session).unwrap();
        assert_eq!(updated.status, ConsultStatus::Upcoming);
    }
}
