//! 복약 항목 스토리지 메서드.
//!
//! 항목 추가/삭제와 날짜 기준 복용 체크 토글.

use janani_core::error::CoreError;
use janani_core::models::health_record::{Medication, NewMedication};
use rusqlite::{OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::{query_err, SqliteStorage};

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        name: row.get(1)?,
        dosage: row.get(2)?,
        time: row.get(3)?,
        last_taken_date: row.get(4)?,
    })
}

impl SqliteStorage {
    /// 사용자 복약 목록 (등록 순)
    pub(super) fn medications_for(&self, user_id: &str) -> Result<Vec<Medication>, CoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, name, dosage, time, last_taken_date
                 FROM medications WHERE user_id = ?1 ORDER BY rowid",
            )
            .map_err(|e| CoreError::Internal(format!("쿼리 준비 실패: {e}")))?;

        let medications = stmt
            .query_map(rusqlite::params![user_id], medication_from_row)
            .map_err(query_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)?;

        Ok(medications)
    }

    /// 복약 항목 추가
    pub(super) fn insert_medication(
        &self,
        user_id: &str,
        medication: &NewMedication,
    ) -> Result<Medication, CoreError> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO medications (id, user_id, name, dosage, time, last_taken_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id,
                user_id,
                medication.name.trim(),
                medication.dosage.trim(),
                medication.time.trim(),
                medication.last_taken_date
            ],
        )
        .map_err(|e| CoreError::Internal(format!("복약 항목 추가 실패: {e}")))?;

        debug!("복약 항목 추가: user={}, id={}", user_id, id);

        Ok(Medication {
            id,
            name: medication.name.trim().to_string(),
            dosage: medication.dosage.trim().to_string(),
            time: medication.time.trim().to_string(),
            last_taken_date: medication.last_taken_date.clone(),
        })
    }

    /// 복약 항목의 사용자 ID
    pub(super) fn owner_of_medication(&self, id: &str) -> Result<Option<String>, CoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT user_id FROM medications WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(query_err)
    }

    /// 복약 항목 삭제 (없으면 NotFound)
    pub(super) fn remove_medication(&self, user_id: &str, id: &str) -> Result<(), CoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "DELETE FROM medications WHERE user_id = ?1 AND id = ?2",
                rusqlite::params![user_id, id],
            )
            .map_err(|e| CoreError::Internal(format!("복약 항목 삭제 실패: {e}")))?;

        if affected == 0 {
            return Err(CoreError::not_found("Medication", id));
        }
        Ok(())
    }

    /// 복용 체크 토글: 같은 날짜면 해제, 다르면 설정
    pub(super) fn toggle_taken(
        &self,
        user_id: &str,
        id: &str,
        date: &str,
    ) -> Result<Medication, CoreError> {
        let conn = self.lock()?;

        let mut medication = conn
            .query_row(
                "SELECT id, name, dosage, time, last_taken_date
                 FROM medications WHERE user_id = ?1 AND id = ?2",
                rusqlite::params![user_id, id],
                medication_from_row,
            )
            .optional()
            .map_err(query_err)?
            .ok_or_else(|| CoreError::not_found("Medication", id))?;

        medication.last_taken_date = match medication.last_taken_date.as_deref() {
            Some(current) if current == date => None,
            _ => Some(date.to_string()),
        };

        conn.execute(
            "UPDATE medications SET last_taken_date = ?1 WHERE user_id = ?2 AND id = ?3",
            rusqlite::params![medication.last_taken_date, user_id, id],
        )
        .map_err(|e| CoreError::Internal(format!("복용 체크 갱신 실패: {e}")))?;

        debug!(
            "복용 체크 토글: id={}, last_taken={:?}",
            id, medication.last_taken_date
        );
        Ok(medication)
    }
}
