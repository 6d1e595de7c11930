//! 통화 제어기 에러.

use janani_core::error::CoreError;
use thiserror::Error;

/// 통화 명령 처리 에러
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallError {
    /// 연결 중이거나 통화 중인 세션이 이미 있음
    #[error("이미 진행 중인 통화가 있음: {0}")]
    AlreadyInCall(String),

    /// 종료/토글할 통화가 없음
    #[error("진행 중인 통화 없음")]
    NoActiveCall,

    /// 이벤트 루프가 종료됨
    #[error("통화 제어기가 중지됨")]
    Stopped,
}

impl From<CallError> for CoreError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::AlreadyInCall(id) => CoreError::CallInProgress(id),
            CallError::NoActiveCall => CoreError::not_found("CallSession", "active"),
            CallError::Stopped => CoreError::Internal("통화 제어기가 중지됨".to_string()),
        }
    }
}
