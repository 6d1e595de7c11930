//! 통화 상태 전이 함수.
//!
//! `(현재 세션, 이벤트) -> (다음 세션, 효과 목록)` 순수 함수.
//! 타이머/미디어/요약 같은 부수 효과는 [`Effect`]로만 기술하고,
//! 실제 실행은 [`crate::controller::CallController`]가 담당한다.
//!
//! 세션이 `None`이면 Idle 단계다.

use chrono::Utc;
use janani_core::models::call::{CallKind, CallPhase, CallSession, LAST_CONNECTION_STEP};
use janani_core::ports::media::{MediaConstraints, StreamHandle};

/// 제어기 이벤트 큐로 전달되는 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// 통화 시작 (사용자 또는 응급 트리거)
    Start {
        id: String,
        counterpart: String,
        reason: String,
        kind: CallKind,
    },
    /// 연결 단계 타이머 발화
    StepTick { call_id: String },
    /// 경과 시간 타이머 발화 (1초)
    ElapsedTick { call_id: String },
    /// 미디어 스트림 확보
    MediaAcquired {
        call_id: String,
        stream: StreamHandle,
    },
    /// 미디어 획득 실패
    MediaFailed { call_id: String, reason: String },
    /// 음소거 토글
    ToggleMute,
    /// 영상 끔 토글
    ToggleVideo,
    /// 사용자 통화 종료
    End,
    /// 요약 요청 결과
    SummaryResolved {
        call_id: String,
        outcome: Result<String, String>,
    },
}

impl CallEvent {
    /// 비동기 협력자(미디어/요약)의 결과 이벤트인지 여부
    pub fn is_async_result(&self) -> bool {
        matches!(
            self,
            CallEvent::MediaAcquired { .. }
                | CallEvent::MediaFailed { .. }
                | CallEvent::SummaryResolved { .. }
        )
    }
}

/// 사용자에게 전달할 통지 (제어기에서 번역 후 발송)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 통화 종료
    CallEnded {
        counterpart: String,
        elapsed_seconds: u64,
    },
    /// 카메라/마이크 사용 불가
    HardwareBlocked { reason: String },
}

/// 전이 결과로 실행해야 할 부수 효과
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// 미디어 획득 시작 (비동기)
    AcquireMedia {
        call_id: String,
        constraints: MediaConstraints,
    },
    /// 연결 단계 타이머 시작
    StartStepTimer { call_id: String },
    /// 연결 단계 타이머 중지
    StopStepTimer,
    /// 경과 시간 타이머 시작
    StartElapsedTimer { call_id: String },
    /// 경과 시간 타이머 중지
    StopElapsedTimer,
    /// 확보된 스트림 보관
    HoldStream(StreamHandle),
    /// 보관 중인 스트림 해제 (없으면 무시)
    ReleaseMedia,
    /// 더 이상 쓰지 않는 늦게 도착한 스트림 해제
    ReleaseStale(StreamHandle),
    /// 로컬 미리보기에 스트림 연결
    AttachPreview,
    /// 요약 요청 (비동기, 통화당 최대 1건)
    RequestSummary {
        call_id: String,
        kind: CallKind,
        counterpart: String,
        reason: String,
    },
    /// 사용자 통지
    Notify(Notice),
    /// 세션 보관 (Ended → Idle)
    Archive(CallSession),
}

/// 전이 정책
#[derive(Debug, Clone)]
pub struct CallPolicy {
    /// 요약 요청 최소 경과 시간 (초, 이상이면 요청)
    pub summary_threshold_secs: u64,
    /// 요약 실패 시 대체 문구
    pub fallback_summary: String,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            summary_threshold_secs: 5,
            fallback_summary: "Consultation completed successfully.".to_string(),
        }
    }
}

/// 전이 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// 다음 세션 (None이면 Idle)
    pub session: Option<CallSession>,
    /// 실행할 효과 (순서대로)
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(session: Option<CallSession>) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }
}

/// 현재 세션 단계 (세션이 없으면 Idle)
pub fn phase_of(session: Option<&CallSession>) -> CallPhase {
    session.map(|s| s.phase).unwrap_or(CallPhase::Idle)
}

/// 상태 전이
pub fn transition(session: Option<CallSession>, event: CallEvent, policy: &CallPolicy) -> Transition {
    match event {
        CallEvent::Start {
            id,
            counterpart,
            reason,
            kind,
        } => start(session, id, &counterpart, &reason, kind),
        CallEvent::StepTick { call_id } => step_tick(session, &call_id),
        CallEvent::ElapsedTick { call_id } => elapsed_tick(session, &call_id),
        CallEvent::MediaAcquired { call_id, stream } => media_acquired(session, &call_id, stream),
        CallEvent::MediaFailed { call_id, reason } => media_failed(session, &call_id, reason),
        CallEvent::ToggleMute => toggle(session, |s| s.muted = !s.muted),
        CallEvent::ToggleVideo => toggle(session, |s| s.video_suppressed = !s.video_suppressed),
        CallEvent::End => end(session, policy),
        CallEvent::SummaryResolved { call_id, outcome } => {
            summary_resolved(session, &call_id, outcome, policy)
        }
    }
}

fn start(
    session: Option<CallSession>,
    id: String,
    counterpart: &str,
    reason: &str,
    kind: CallKind,
) -> Transition {
    if phase_of(session.as_ref()).is_live() {
        return Transition::unchanged(session);
    }

    let mut effects = Vec::new();
    // 요약 대기 중인 이전 통화는 요약 없이 보관, 늦은 요약은 call_id 불일치로 버려진다
    if let Some(previous) = session {
        effects.push(Effect::Archive(previous));
    }

    let next = CallSession::with_id(id, counterpart, reason, kind);
    effects.push(Effect::AcquireMedia {
        call_id: next.id.clone(),
        constraints: MediaConstraints::for_call(kind),
    });
    effects.push(Effect::StartStepTimer {
        call_id: next.id.clone(),
    });

    Transition {
        session: Some(next),
        effects,
    }
}

fn step_tick(session: Option<CallSession>, call_id: &str) -> Transition {
    let mut s = match session {
        Some(s)
            if s.id == call_id
                && s.phase == CallPhase::Connecting
                && !s.media_acquisition_failed =>
        {
            s
        }
        other => return Transition::unchanged(other),
    };

    let mut effects = Vec::new();
    if s.connection_step_index >= LAST_CONNECTION_STEP {
        s.phase = CallPhase::Active;
        effects.push(Effect::StopStepTimer);
        effects.push(Effect::StartElapsedTimer {
            call_id: s.id.clone(),
        });
        if s.media_ready {
            s.preview_attached = true;
            effects.push(Effect::AttachPreview);
        }
    } else {
        s.connection_step_index += 1;
    }

    Transition {
        session: Some(s),
        effects,
    }
}

fn elapsed_tick(session: Option<CallSession>, call_id: &str) -> Transition {
    match session {
        Some(mut s) if s.id == call_id && s.phase == CallPhase::Active => {
            s.elapsed_seconds += 1;
            Transition::unchanged(Some(s))
        }
        other => Transition::unchanged(other),
    }
}

fn media_acquired(session: Option<CallSession>, call_id: &str, stream: StreamHandle) -> Transition {
    match session {
        Some(mut s) if s.id == call_id && s.phase.is_live() => {
            s.media_ready = true;
            let mut effects = vec![Effect::HoldStream(stream)];
            if s.phase == CallPhase::Active {
                s.preview_attached = true;
                effects.push(Effect::AttachPreview);
            }
            Transition {
                session: Some(s),
                effects,
            }
        }
        other => Transition {
            session: other,
            effects: vec![Effect::ReleaseStale(stream)],
        },
    }
}

fn media_failed(session: Option<CallSession>, call_id: &str, reason: String) -> Transition {
    match session {
        Some(mut s) if s.id == call_id && s.phase.is_live() => {
            s.media_acquisition_failed = true;
            s.phase = CallPhase::Ended;
            s.ended_at = Some(Utc::now());
            Transition {
                session: None,
                effects: vec![
                    Effect::StopStepTimer,
                    Effect::StopElapsedTimer,
                    Effect::ReleaseMedia,
                    Effect::Notify(Notice::HardwareBlocked { reason }),
                    Effect::Archive(s),
                ],
            }
        }
        other => Transition::unchanged(other),
    }
}

fn toggle(session: Option<CallSession>, flip: impl FnOnce(&mut CallSession)) -> Transition {
    match session {
        Some(mut s) => {
            flip(&mut s);
            Transition::unchanged(Some(s))
        }
        None => Transition::unchanged(None),
    }
}

fn end(session: Option<CallSession>, policy: &CallPolicy) -> Transition {
    let mut s = match session {
        Some(s) if s.phase.is_live() => s,
        other => return Transition::unchanged(other),
    };

    s.phase = CallPhase::Ended;
    s.ended_at = Some(Utc::now());

    let mut effects = vec![
        Effect::ReleaseMedia,
        Effect::StopStepTimer,
        Effect::StopElapsedTimer,
        Effect::Notify(Notice::CallEnded {
            counterpart: s.counterpart_name.clone(),
            elapsed_seconds: s.elapsed_seconds,
        }),
    ];

    if s.elapsed_seconds >= policy.summary_threshold_secs {
        effects.push(Effect::RequestSummary {
            call_id: s.id.clone(),
            kind: s.kind,
            counterpart: s.counterpart_name.clone(),
            reason: s.reason.clone(),
        });
        Transition {
            session: Some(s),
            effects,
        }
    } else {
        effects.push(Effect::Archive(s));
        Transition {
            session: None,
            effects,
        }
    }
}

fn summary_resolved(
    session: Option<CallSession>,
    call_id: &str,
    outcome: Result<String, String>,
    policy: &CallPolicy,
) -> Transition {
    let mut s = match session {
        Some(s) if s.id == call_id && s.phase == CallPhase::Ended && s.summary.is_none() => s,
        other => return Transition::unchanged(other),
    };

    let summary = match outcome {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => policy.fallback_summary.clone(),
    };
    s.summary = Some(summary);

    Transition {
        session: None,
        effects: vec![Effect::Archive(s)],
    }
}
