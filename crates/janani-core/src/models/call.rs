//! 통화 세션 모델.
//!
//! 시뮬레이션 원격 상담 한 건(초대 → 연결 시뮬레이션 → 통화 → 종료)의 상태를 표현.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 연결 중 화면에 순서대로 표시되는 상태 문구
pub const CONNECTION_STEPS: [&str; 4] = [
    "Initializing clinical signal...",
    "Allocating dedicated bandwidth...",
    "Securing end-to-end tunnel...",
    "Finalizing secure handshake...",
];

/// 마지막 연결 단계 인덱스
pub const LAST_CONNECTION_STEP: usize = CONNECTION_STEPS.len() - 1;

/// 통화 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    /// 음성 통화
    Voice,
    /// 영상 통화
    Video,
}

impl CallKind {
    /// 표시 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Voice => "Voice",
            CallKind::Video => "Video",
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 통화 라이프사이클 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPhase {
    /// 진행 중인 통화 없음
    Idle,
    /// 연결 시뮬레이션 중
    Connecting,
    /// 통화 중 (경과 시간 증가)
    Active,
    /// 종료됨 (요약 대기 또는 보관)
    Ended,
}

impl CallPhase {
    /// 연결 중 또는 통화 중인지 여부
    pub fn is_live(&self) -> bool {
        matches!(self, CallPhase::Connecting | CallPhase::Active)
    }
}

/// 통화 시도 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    /// 통화 고유 ID (초대 시 할당)
    pub id: String,
    /// 상대방 표시 이름 (의사 또는 응급 센터)
    pub counterpart_name: String,
    /// 통화 사유
    pub reason: String,
    /// 통화 종류
    pub kind: CallKind,
    /// 현재 단계
    pub phase: CallPhase,
    /// 연결 문구 순서 인덱스 (통화 시도 내에서 단조 증가)
    pub connection_step_index: usize,
    /// 통화 중 경과 시간 (초)
    pub elapsed_seconds: u64,
    /// 마이크 음소거 (로컬 표시 상태)
    pub muted: bool,
    /// 영상 끔 (로컬 미리보기만 가림)
    pub video_suppressed: bool,
    /// 미디어 획득 실패 여부
    pub media_acquisition_failed: bool,
    /// 캡처 스트림이 확보되었는지 여부
    pub media_ready: bool,
    /// 로컬 미리보기에 스트림이 연결되었는지 여부
    pub preview_attached: bool,
    /// 종료 후 생성된 상담 요약
    pub summary: Option<String>,
    /// 통화 시작 시각
    pub started_at: DateTime<Utc>,
    /// 통화 종료 시각
    pub ended_at: Option<DateTime<Utc>>,
}

impl CallSession {
    /// 새 통화 시도 생성 (Connecting 단계, 모든 카운터 0)
    pub fn new(counterpart_name: &str, reason: &str, kind: CallKind) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            counterpart_name,
            reason,
            kind,
        )
    }

    /// 지정한 ID로 통화 시도 생성
    pub fn with_id(id: String, counterpart_name: &str, reason: &str, kind: CallKind) -> Self {
        Self {
            id,
            counterpart_name: counterpart_name.to_string(),
            reason: reason.to_string(),
            kind,
            phase: CallPhase::Connecting,
            connection_step_index: 0,
            elapsed_seconds: 0,
            muted: false,
            video_suppressed: false,
            media_acquisition_failed: false,
            media_ready: false,
            preview_attached: false,
            summary: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// 현재 연결 상태 문구 (Connecting 단계에서만)
    pub fn status_message(&self) -> Option<&'static str> {
        if self.phase == CallPhase::Connecting {
            CONNECTION_STEPS.get(self.connection_step_index).copied()
        } else {
            None
        }
    }

    /// 경과 시간 표시 문자열 (MM:SS)
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// 초 단위 시간을 `MM:SS`로 변환 (분은 59를 넘어 계속 증가)
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_reset() {
        let s = CallSession::new("Dr. A", "follow-up", CallKind::Voice);
        assert_eq!(s.phase, CallPhase::Connecting);
        assert_eq!(s.connection_step_index, 0);
        assert_eq!(s.elapsed_seconds, 0);
        assert!(!s.media_acquisition_failed);
        assert!(s.summary.is_none());
        assert_eq!(s.status_message(), Some(CONNECTION_STEPS[0]));
    }

    #[test]
    fn status_message_only_while_connecting() {
        let mut s = CallSession::new("Dr. A", "follow-up", CallKind::Video);
        s.phase = CallPhase::Active;
        assert!(s.status_message().is_none());
    }

    #[test]
    fn format_elapsed_values() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3_725), "62:05");
    }

    #[test]
    fn phase_is_live() {
        assert!(CallPhase::Connecting.is_live());
        assert!(CallPhase::Active.is_live());
        assert!(!CallPhase::Idle.is_live());
        assert!(!CallPhase::Ended.is_live());
    }
}
