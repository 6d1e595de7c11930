//! 미디어 캡처 포트.
//!
//! 마이크/카메라 스트림 획득과 해제. 스트림은 통화 제어기가 독점 소유한다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::call::CallKind;

/// 캡처 요청 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// 오디오 트랙 요청
    pub audio: bool,
    /// 비디오 트랙 요청
    pub video: bool,
}

impl MediaConstraints {
    /// 통화 세션 참여 시 조건: 통화 종류와 무관하게 항상 오디오+비디오를 요청
    pub fn for_call(_kind: CallKind) -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// 획득한 캡처 스트림 핸들
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    /// 구현체가 부여한 스트림 ID
    pub id: u64,
    /// 실제로 포함된 트랙 조건
    pub constraints: MediaConstraints,
}

/// 미디어 캡처 인터페이스
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// 스트림 획득 (권한 거부/장치 없음 시 `CoreError::MediaAcquisition`)
    async fn acquire(&self, constraints: MediaConstraints) -> Result<StreamHandle, CoreError>;

    /// 스트림 해제: 같은 핸들로 여러 번 호출해도 안전해야 한다
    fn release(&self, handle: &StreamHandle);
}
