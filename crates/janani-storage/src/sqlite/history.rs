//! 병력 문서 스토리지 메서드.

use chrono::{DateTime, Utc};
use janani_core::error::CoreError;
use janani_core::models::health_record::MedicalHistory;
use rusqlite::OptionalExtension;
use tracing::debug;

use super::{query_err, SqliteStorage};

impl SqliteStorage {
    /// 사용자 병력 조회
    pub(super) fn find_history(&self, user_id: &str) -> Result<Option<MedicalHistory>, CoreError> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT conditions, surgeries, allergies, updated_at
                 FROM medical_history WHERE user_id = ?1",
                rusqlite::params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(query_err)?;

        Ok(row.map(|(conditions, surgeries, allergies, updated_at)| MedicalHistory {
            conditions,
            surgeries,
            allergies,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
        }))
    }

    /// 병력 upsert: 수정 시각을 갱신한 문서 반환
    pub(super) fn save_history(
        &self,
        user_id: &str,
        history: &MedicalHistory,
    ) -> Result<MedicalHistory, CoreError> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO medical_history (user_id, conditions, surgeries, allergies, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                conditions = excluded.conditions,
                surgeries = excluded.surgeries,
                allergies = excluded.allergies,
                updated_at = excluded.updated_at",
            rusqlite::params![
                user_id,
                history.conditions,
                history.surgeries,
                history.allergies,
                now.to_rfc3339()
            ],
        )
        .map_err(|e| CoreError::Internal(format!("병력 저장 실패: {e}")))?;

        debug!("병력 저장: user={}", user_id);

        Ok(MedicalHistory {
            updated_at: Some(now),
            ..history.clone()
        })
    }

    /// 병력 삭제: 삭제된 행이 있으면 true
    pub(super) fn remove_history(&self, user_id: &str) -> Result<bool, CoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "DELETE FROM medical_history WHERE user_id = ?1",
                rusqlite::params![user_id],
            )
            .map_err(|e| CoreError::Internal(format!("병력 삭제 실패: {e}")))?;
        Ok(affected > 0)
    }
}
