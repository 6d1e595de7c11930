//! SQLite 저장소 어댑터.
//!
//! `HealthRecordStore` 포트 구현.
//!
//! # 모듈 구조
//! - `history`: 병력 문서 (사용자당 1건, upsert)
//! - `medications`: 복약 항목 + 복용 체크 토글
//! - `appointments`: 진료 예약

mod appointments;
mod history;
mod medications;

use async_trait::async_trait;
use janani_core::error::CoreError;
use janani_core::models::health_record::{
    Appointment, MedicalHistory, Medication, NewAppointment, NewMedication,
};
use janani_core::ports::storage::HealthRecordStore;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::migration;

/// SQLite 저장소: `HealthRecordStore` 포트 구현
pub struct SqliteStorage {
    pub(super) conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// 파일 기반 SQLite 저장소 생성
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| CoreError::Internal(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            ",
        )
        .map_err(|e| CoreError::Internal(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Internal(format!("마이그레이션 실패: {e}")))?;

        info!("SQLite 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Internal(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Internal(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|e| CoreError::Internal(format!("잠금 획득 실패: {e}")))
    }
}

pub(super) fn query_err(e: rusqlite::Error) -> CoreError {
    CoreError::Internal(format!("쿼리 실행 실패: {e}"))
}

#[async_trait]
impl HealthRecordStore for SqliteStorage {
    async fn get_history(&self, user_id: &str) -> Result<Option<MedicalHistory>, CoreError> {
        self.find_history(user_id)
    }

    async fn upsert_history(
        &self,
        user_id: &str,
        history: &MedicalHistory,
    ) -> Result<MedicalHistory, CoreError> {
        self.save_history(user_id, history)
    }

    async fn delete_history(&self, user_id: &str) -> Result<bool, CoreError> {
        self.remove_history(user_id)
    }

    async fn list_medications(&self, user_id: &str) -> Result<Vec<Medication>, CoreError> {
        self.medications_for(user_id)
    }

    async fn add_medication(
        &self,
        user_id: &str,
        medication: &NewMedication,
    ) -> Result<Medication, CoreError> {
        medication.validate()?;
        self.insert_medication(user_id, medication)
    }

    async fn medication_owner(&self, id: &str) -> Result<Option<String>, CoreError> {
        self.owner_of_medication(id)
    }

    async fn delete_medication(&self, user_id: &str, id: &str) -> Result<(), CoreError> {
        self.remove_medication(user_id, id)
    }

    async fn toggle_medication(
        &self,
        user_id: &str,
        id: &str,
        date: &str,
    ) -> Result<Medication, CoreError> {
        janani_core::models::health_record::validate_date("date", date)?;
        self.toggle_taken(user_id, id, date)
    }

    async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, CoreError> {
        self.appointments_for(user_id)
    }

    async fn add_appointment(
        &self,
        user_id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError> {
        appointment.validate()?;
        self.insert_appointment(user_id, appointment)
    }

    async fn update_appointment(
        &self,
        user_id: &str,
        id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError> {
        appointment.validate()?;
        self.replace_appointment(user_id, id, appointment)
    }

    async fn delete_appointment(&self, user_id: &str, id: &str) -> Result<(), CoreError> {
        self.remove_appointment(user_id, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janani_core::models::health_record::AppointmentStatus;
    use tempfile::TempDir;

    fn storage() -> SqliteStorage {
        SqliteStorage::open_in_memory().unwrap()
    }

    fn medication(name: &str) -> NewMedication {
        NewMedication {
            name: name.to_string(),
            dosage: "1 tablet".to_string(),
            time: "08:00 AM".to_string(),
            last_taken_date: None,
        }
    }

    fn appointment(date: &str) -> NewAppointment {
        NewAppointment {
            patient_name: "Sita".to_string(),
            date: date.to_string(),
            time: "10:00".to_string(),
            kind: "Antenatal Checkup".to_string(),
            status: AppointmentStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn history_upsert_and_get() {
        let store = storage();
        assert!(store.get_history("u1").await.unwrap().is_none());

        let saved = store
            .upsert_history(
                "u1",
                &MedicalHistory {
                    conditions: "Anemia".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(saved.updated_at.is_some());

        store
            .upsert_history(
                "u1",
                &MedicalHistory {
                    conditions: "Anemia".to_string(),
                    allergies: "Penicillin".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let history = store.get_history("u1").await.unwrap().unwrap();
        assert_eq!(history.conditions, "Anemia");
        assert_eq!(history.allergies, "Penicillin");
        assert!(store.get_history("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_delete_is_idempotent() {
        let store = storage();
        store
            .upsert_history("u1", &MedicalHistory::default())
            .await
            .unwrap();
        assert!(store.delete_history("u1").await.unwrap());
        assert!(!store.delete_history("u1").await.unwrap());
    }

    #[tokio::test]
    async fn medications_are_scoped_per_user() {
        let store = storage();
        store.add_medication("u1", &medication("Iron")).await.unwrap();
        store.add_medication("u1", &medication("Calcium")).await.unwrap();
        store.add_medication("u2", &medication("Folic Acid")).await.unwrap();

        let names: Vec<String> = store
            .list_medications("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Iron".to_string(), "Calcium".to_string()]);
    }

    #[tokio::test]
    async fn add_medication_validates() {
        let store = storage();
        let result = store.add_medication("u1", &medication("")).await;
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[tokio::test]
    async fn toggle_sets_then_clears() {
        let store = storage();
        let med = store.add_medication("u1", &medication("Iron")).await.unwrap();

        let taken = store
            .toggle_medication("u1", &med.id, "2026-10-18")
            .await
            .unwrap();
        assert_eq!(taken.last_taken_date.as_deref(), Some("2026-10-18"));

        let other_day = store
            .toggle_medication("u1", &med.id, "2026-10-19")
            .await
            .unwrap();
        assert_eq!(other_day.last_taken_date.as_deref(), Some("2026-10-19"));

        let cleared = store
            .toggle_medication("u1", &med.id, "2026-10-19")
            .await
            .unwrap();
        assert!(cleared.last_taken_date.is_none());
    }

    #[tokio::test]
    async fn toggle_unknown_is_not_found() {
        let store = storage();
        let med = store.add_medication("u1", &medication("Iron")).await.unwrap();
        let result = store.toggle_medication("u2", &med.id, "2026-10-18").await;
        assert!(matches!(result, Err(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn medication_owner_lookup() {
        let store = storage();
        let med = store.add_medication("u2", &medication("Iron")).await.unwrap();
        assert_eq!(
            store.medication_owner(&med.id).await.unwrap().as_deref(),
            Some("u2")
        );
        assert!(store.medication_owner("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_medication_not_found() {
        let store = storage();
        let med = store.add_medication("u1", &medication("Iron")).await.unwrap();
        store.delete_medication("u1", &med.id).await.unwrap();
        assert!(matches!(
            store.delete_medication("u1", &med.id).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn appointments_sorted_by_date() {
        let store = storage();
        store.add_appointment("u1", &appointment("2026-11-02")).await.unwrap();
        store.add_appointment("u1", &appointment("2026-10-20")).await.unwrap();

        let dates: Vec<String> = store
            .list_appointments("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(dates, vec!["2026-10-20".to_string(), "2026-11-02".to_string()]);
    }

    #[tokio::test]
    async fn update_appointment_or_not_found() {
        let store = storage();
        let created = store.add_appointment("u1", &appointment("2026-10-20")).await.unwrap();

        let mut change = appointment("2026-10-21");
        change.status = AppointmentStatus::Completed;
        let updated = store
            .update_appointment("u1", &created.id, &change)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.date, "2026-10-21");
        assert_eq!(updated.status, AppointmentStatus::Completed);

        assert!(matches!(
            store.update_appointment("u1", "missing", &change).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_appointment_not_found() {
        let store = storage();
        let created = store.add_appointment("u1", &appointment("2026-10-20")).await.unwrap();
        assert!(matches!(
            store.delete_appointment("u2", &created.id).await,
            Err(CoreError::NotFound { .. })
        ));
        store.delete_appointment("u1", &created.id).await.unwrap();
        assert!(store.list_appointments("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_storage_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("janani.db");

        {
            let store = SqliteStorage::open(&path).unwrap();
            store.add_medication("u1", &medication("Iron")).await.unwrap();
        }

        let store = SqliteStorage::open(&path).unwrap();
        assert_eq!(store.list_medications("u1").await.unwrap().len(), 1);
    }
}
