//! 건강 기록 저장소 포트.
//!
//! 구현: `janani-storage` crate (rusqlite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::health_record::{
    Appointment, MedicalHistory, Medication, NewAppointment, NewMedication,
};

/// 사용자별 병력/복약/예약 문서 저장소
///
/// 모든 수정 연산은 upsert 또는 대상이 없을 때 `CoreError::NotFound`를 반환한다.
#[async_trait]
pub trait HealthRecordStore: Send + Sync {
    /// 병력 조회 (없으면 None)
    async fn get_history(&self, user_id: &str) -> Result<Option<MedicalHistory>, CoreError>;

    /// 병력 upsert: 저장된 문서를 반환
    async fn upsert_history(
        &self,
        user_id: &str,
        history: &MedicalHistory,
    ) -> Result<MedicalHistory, CoreError>;

    /// 병력 삭제: 삭제 여부 반환
    async fn delete_history(&self, user_id: &str) -> Result<bool, CoreError>;

    /// 복약 목록 조회
    async fn list_medications(&self, user_id: &str) -> Result<Vec<Medication>, CoreError>;

    /// 복약 항목 추가
    async fn add_medication(
        &self,
        user_id: &str,
        medication: &NewMedication,
    ) -> Result<Medication, CoreError>;

    /// 복약 항목 소유자 조회 (ID만 아는 경로용, 없으면 None)
    async fn medication_owner(&self, id: &str) -> Result<Option<String>, CoreError>;

    /// 복약 항목 삭제
    async fn delete_medication(&self, user_id: &str, id: &str) -> Result<(), CoreError>;

    /// 복용 체크 토글: 같은 날짜면 해제, 다르면 설정
    async fn toggle_medication(
        &self,
        user_id: &str,
        id: &str,
        date: &str,
    ) -> Result<Medication, CoreError>;

    /// 진료 예약 목록 조회
    async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CoreError>;

    /// 진료 예약 추가
    async fn add_appointment(
        &self,
        user_id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError>;

    /// 진료 예약 수정
    async fn update_appointment(
        &self,
        user_id: &str,
        id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError>;

    /// 진료 예약 삭제
    async fn delete_appointment(&self, user_id: &str, id: &str) -> Result<(), CoreError>;
}
