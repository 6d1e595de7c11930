//! 진료 예약 스토리지 메서드.

use janani_core::error::CoreError;
use janani_core::models::health_record::{Appointment, AppointmentStatus, NewAppointment};
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use super::{query_err, SqliteStorage};

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<(Appointment, String)> {
    let status: String = row.get(5)?;
    Ok((
        Appointment {
            id: row.get(0)?,
            patient_name: row.get(1)?,
            date: row.get(2)?,
            time: row.get(3)?,
            kind: row.get(4)?,
            status: AppointmentStatus::Scheduled,
        },
        status,
    ))
}

fn with_status((mut appointment, status): (Appointment, String)) -> Result<Appointment, CoreError> {
    appointment.status = AppointmentStatus::parse(&status)?;
    Ok(appointment)
}

fn build(id: String, appointment: &NewAppointment) -> Appointment {
    Appointment {
        id,
        patient_name: appointment.patient_name.trim().to_string(),
        date: appointment.date.clone(),
        time: appointment.time.trim().to_string(),
        kind: appointment.kind.trim().to_string(),
        status: appointment.status,
    }
}

impl SqliteStorage {
    /// 사용자 진료 예약 목록 (날짜, 시각 순)
    pub(super) fn appointments_for(&self, user_id: &str) -> Result<Vec<Appointment>, CoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, patient_name, date, time, kind, status
                 FROM appointments WHERE user_id = ?1 ORDER BY date, time",
            )
            .map_err(|e| CoreError::Internal(format!("쿼리 준비 실패: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![user_id], appointment_from_row)
            .map_err(query_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)?;

        rows.into_iter().map(with_status).collect()
    }

    /// 진료 예약 추가
    pub(super) fn insert_appointment(
        &self,
        user_id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError> {
        let conn = self.lock()?;
        let created = build(Uuid::new_v4().to_string(), appointment);

        conn.execute(
            "INSERT INTO appointments (id, user_id, patient_name, date, time, kind, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                created.id,
                user_id,
                created.patient_name,
                created.date,
                created.time,
                created.kind,
                created.status.as_str()
            ],
        )
        .map_err(|e| CoreError::Internal(format!("진료 예약 추가 실패: {e}")))?;

        debug!("진료 예약 추가: user={}, id={}", user_id, created.id);
        Ok(created)
    }

    /// 진료 예약 수정 (없으면 NotFound)
    pub(super) fn replace_appointment(
        &self,
        user_id: &str,
        id: &str,
        appointment: &NewAppointment,
    ) -> Result<Appointment, CoreError> {
        let conn = self.lock()?;
        let updated = build(id.to_string(), appointment);

        let affected = conn
            .execute(
                "UPDATE appointments
                 SET patient_name = ?1, date = ?2, time = ?3, kind = ?4, status = ?5
                 WHERE user_id = ?6 AND id = ?7",
                rusqlite::params![
                    updated.patient_name,
                    updated.date,
                    updated.time,
                    updated.kind,
                    updated.status.as_str(),
                    user_id,
                    id
                ],
            )
            .map_err(|e| CoreError::Internal(format!("진료 예약 수정 실패: {e}")))?;

        if affected == 0 {
            return Err(CoreError::not_found("Appointment", id));
        }
        debug!("진료 예약 수정: id={}", id);
        Ok(updated)
    }

    /// 진료 예약 삭제 (없으면 NotFound)
    pub(super) fn remove_appointment(&self, user_id: &str, id: &str) -> Result<(), CoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "DELETE FROM appointments WHERE user_id = ?1 AND id = ?2",
                rusqlite::params![user_id, id],
            )
            .map_err(|e| CoreError::Internal(format!("진료 예약 삭제 실패: {e}")))?;

        if affected == 0 {
            return Err(CoreError::not_found("Appointment", id));
        }
        Ok(())
    }
}
