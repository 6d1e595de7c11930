//! Janani 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러 타입에서 `From<CoreError>`로 변환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 유효성 검증, 통화 협력자 실패 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Medication", "Appointment")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 마이크/카메라 획득 실패 (권한 거부, 장치 없음)
    #[error("미디어 획득 실패: {0}")]
    MediaAcquisition(String),

    /// 통화 요약 생성 실패
    #[error("요약 생성 실패: {0}")]
    Summarization(String),

    /// AI 건강 분석 응답 해석 실패
    #[error("건강 분석 실패: {0}")]
    Advisor(String),

    /// 타이머 예약 실패
    #[error("타이머 예약 실패: {0}")]
    Scheduling(String),

    /// 이미 진행 중인 통화가 있음
    #[error("진행 중인 통화 있음: {0}")]
    CallInProgress(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// `NotFound` 에러 생성 헬퍼
    pub fn not_found(resource_type: &str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.into(),
        }
    }

    /// `Validation` 에러 생성 헬퍼
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = CoreError::not_found("Medication", "abc");
        assert_eq!(err.to_string(), "Medication 미발견: abc");
    }

    #[test]
    fn validation_display() {
        let err = CoreError::validation("name", "비어 있음");
        assert!(err.to_string().contains("name"));
        assert!(err.to_string().contains("비어 있음"));
    }
}
