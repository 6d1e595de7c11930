//! 통화 세션 제어기.
//!
//! 단일 이벤트 루프가 [`CallEvent`]를 순서대로 처리한다.
//! 타이머 콜백과 비동기 협력자(미디어, 요약) 결과는 모두 같은 큐로 들어오므로
//! 상태 변경은 서로 끼어들지 않는다.
//!
//! 루프는 현재 세션, 타이머 토큰, 미디어 스트림을 독점 소유한다.
//! 외부에는 [`CallSnapshot`]만 watch 채널로 공개한다.

use std::sync::Arc;
use std::time::Duration;

use janani_core::config::CallConfig;
use janani_core::i18n::{keys, Language};
use janani_core::models::call::{format_elapsed, CallKind, CallSession};
use janani_core::models::notification::Severity;
use janani_core::ports::media::{MediaCapture, MediaConstraints, StreamHandle};
use janani_core::ports::notifier::NotificationSink;
use janani_core::ports::scheduler::{CancelToken, Scheduler};
use janani_core::ports::summarizer::{SummaryRequest, Summarizer};
use janani_core::ports::translator::Translator;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CallError;
use crate::machine::{transition, CallEvent, CallPolicy, Effect, Notice};

/// 통화 제어기 설정
#[derive(Debug, Clone)]
pub struct CallSettings {
    /// 연결 단계 진행 주기
    pub step_interval: Duration,
    /// 경과 시간 증가 주기
    pub elapsed_tick: Duration,
    /// 전이 정책 (요약 임계값, 대체 문구)
    pub policy: CallPolicy,
    /// 알림/요약 언어
    pub language: Language,
}

impl CallSettings {
    /// 설정 파일 값으로 생성
    pub fn from_config(config: &CallConfig) -> Self {
        Self {
            step_interval: config.step_interval(),
            elapsed_tick: config.elapsed_tick(),
            policy: CallPolicy {
                summary_threshold_secs: config.summary_threshold_secs,
                fallback_summary: config.fallback_summary.clone(),
            },
            language: config.language,
        }
    }
}

impl Default for CallSettings {
    fn default() -> Self {
        Self::from_config(&CallConfig::default())
    }
}

/// 제어기가 사용하는 협력자 묶음
#[derive(Clone)]
pub struct CallPorts {
    pub media: Arc<dyn MediaCapture>,
    pub summarizer: Arc<dyn Summarizer>,
    pub scheduler: Arc<dyn Scheduler>,
    pub notifier: Arc<dyn NotificationSink>,
    pub translator: Arc<dyn Translator>,
}

/// 외부 공개용 통화 상태
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSnapshot {
    /// 현재 세션 (Idle이면 None, 요약 대기 중이면 Ended)
    pub session: Option<CallSession>,
    /// 마지막으로 보관된 세션
    pub last_call: Option<CallSession>,
    /// 카메라/마이크 차단 안내 표시 여부
    pub hardware_blocked: bool,
    /// 연결 중 상태 문구
    pub status_message: Option<String>,
    /// 경과 시간 (MM:SS)
    pub elapsed_display: Option<String>,
}

impl CallSnapshot {
    /// 연결 중 또는 통화 중인지 여부
    pub fn is_live(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.phase.is_live())
            .unwrap_or(false)
    }
}

enum Envelope {
    Event {
        event: CallEvent,
        ack: Option<oneshot::Sender<bool>>,
    },
    Shutdown,
}

/// 큐 전송기 + 미처리 작업 카운터
#[derive(Clone)]
struct EventSender {
    tx: mpsc::UnboundedSender<Envelope>,
    pending: Arc<watch::Sender<usize>>,
}

impl EventSender {
    fn send(&self, event: CallEvent, ack: Option<oneshot::Sender<bool>>) -> bool {
        self.pending.send_modify(|n| *n += 1);
        if self.tx.send(Envelope::Event { event, ack }).is_err() {
            self.done();
            return false;
        }
        true
    }

    fn begin(&self) {
        self.pending.send_modify(|n| *n += 1);
    }

    fn done(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// 보관 세션 구독자 목록
///
/// 구독자마다 무제한 큐를 두므로 읽기가 늦어도 보관 세션이 유실되지 않는다.
#[derive(Clone, Default)]
struct ArchiveFeed {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<CallSession>>>>,
}

impl ArchiveFeed {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<CallSession> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// 닫힌 구독자는 제거
    fn publish(&self, session: &CallSession) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(session.clone()).is_ok());
    }

    fn close(&self) {
        self.subscribers.lock().clear();
    }
}

/// 통화 제어기 핸들 (복제 가능)
#[derive(Clone)]
pub struct CallController {
    sender: EventSender,
    snapshot: watch::Receiver<CallSnapshot>,
    archived: ArchiveFeed,
    language: Arc<RwLock<Language>>,
}

impl CallController {
    /// 이벤트 루프를 현재 tokio 런타임에 띄우고 핸들 반환
    pub fn spawn(ports: CallPorts, settings: CallSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0usize);
        let (snapshot_tx, snapshot) = watch::channel(CallSnapshot::default());
        let archived = ArchiveFeed::default();
        let language = Arc::new(RwLock::new(settings.language));

        let sender = EventSender {
            tx,
            pending: Arc::new(pending),
        };

        let event_loop = EventLoop {
            ports,
            settings,
            sender: sender.clone(),
            snapshot: snapshot_tx,
            archived: archived.clone(),
            language: language.clone(),
            session: None,
            last_call: None,
            hardware_blocked: false,
            step_timer: None,
            elapsed_timer: None,
            stream: None,
        };
        tokio::spawn(event_loop.run(rx));

        Self {
            sender,
            snapshot,
            archived,
            language,
        }
    }

    /// 새 통화 시작: 할당된 통화 ID 반환
    pub async fn start_call(
        &self,
        counterpart: &str,
        reason: &str,
        kind: CallKind,
    ) -> Result<String, CallError> {
        let id = Uuid::new_v4().to_string();
        self.start_call_with_id(id, counterpart, reason, kind).await
    }

    /// 지정한 ID로 통화 시작
    pub async fn start_call_with_id(
        &self,
        id: String,
        counterpart: &str,
        reason: &str,
        kind: CallKind,
    ) -> Result<String, CallError> {
        let event = CallEvent::Start {
            id: id.clone(),
            counterpart: counterpart.to_string(),
            reason: reason.to_string(),
            kind,
        };
        if self.request(event).await? {
            Ok(id)
        } else {
            let current = self
                .snapshot()
                .session
                .map(|s| s.id)
                .unwrap_or_default();
            Err(CallError::AlreadyInCall(current))
        }
    }

    /// 사용자 통화 종료
    pub async fn end_call(&self) -> Result<(), CallError> {
        self.request_live(CallEvent::End).await
    }

    /// 음소거 토글
    pub async fn toggle_mute(&self) -> Result<(), CallError> {
        self.request_live(CallEvent::ToggleMute).await
    }

    /// 영상 끔 토글
    pub async fn toggle_video(&self) -> Result<(), CallError> {
        self.request_live(CallEvent::ToggleVideo).await
    }

    /// 알림/요약 언어 변경 (다음 이벤트부터 적용)
    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
    }

    /// 현재 언어
    pub fn language(&self) -> Language {
        *self.language.read()
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> CallSnapshot {
        self.snapshot.borrow().clone()
    }

    /// 상태 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<CallSnapshot> {
        self.snapshot.clone()
    }

    /// 보관된 세션 구독
    ///
    /// 구독 이후 보관되는 모든 세션을 순서대로 받는다.
    pub fn archived(&self) -> mpsc::UnboundedReceiver<CallSession> {
        self.archived.subscribe()
    }

    /// 큐에 쌓인 이벤트와 진행 중인 비동기 작업이 모두 끝날 때까지 대기
    ///
    /// 반복 타이머는 대기 대상이 아니다.
    pub async fn settle(&self) {
        let mut rx = self.sender.pending.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// 이벤트 루프 종료: 타이머 취소, 스트림 해제
    pub fn shutdown(&self) {
        let _ = self.sender.tx.send(Envelope::Shutdown);
    }

    async fn request(&self, event: CallEvent) -> Result<bool, CallError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if !self.sender.send(event, Some(ack_tx)) {
            return Err(CallError::Stopped);
        }
        ack_rx.await.map_err(|_| CallError::Stopped)
    }

    async fn request_live(&self, event: CallEvent) -> Result<(), CallError> {
        if self.request(event).await? {
            Ok(())
        } else {
            Err(CallError::NoActiveCall)
        }
    }
}

/// 이벤트 루프 상태 (루프 태스크가 독점)
struct EventLoop {
    ports: CallPorts,
    settings: CallSettings,
    sender: EventSender,
    snapshot: watch::Sender<CallSnapshot>,
    archived: ArchiveFeed,
    language: Arc<RwLock<Language>>,
    session: Option<CallSession>,
    last_call: Option<CallSession>,
    hardware_blocked: bool,
    step_timer: Option<CancelToken>,
    elapsed_timer: Option<CancelToken>,
    stream: Option<StreamHandle>,
}

impl EventLoop {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        debug!("통화 이벤트 루프 시작");
        while let Some(envelope) = rx.recv().await {
            match envelope {
                Envelope::Event { event, ack } => {
                    let accepted = self.handle(event);
                    self.publish();
                    if let Some(ack) = ack {
                        let _ = ack.send(accepted);
                    }
                    self.sender.done();
                }
                Envelope::Shutdown => break,
            }
        }
        rx.close();
        while let Ok(envelope) = rx.try_recv() {
            if let Envelope::Event { .. } = envelope {
                self.sender.done();
            }
        }
        self.teardown();
        debug!("통화 이벤트 루프 종료");
    }

    /// 이벤트 하나 처리: 상태가 바뀌었거나 효과가 있으면 true
    fn handle(&mut self, event: CallEvent) -> bool {
        let before = self.session.clone();
        let label = event_label(&event);
        let is_async_result = event.is_async_result();
        let result = transition(self.session.take(), event, &self.settings.policy);
        let accepted = !(result.effects.is_empty() && result.session == before);

        if !accepted && is_async_result {
            debug!("이전 통화 결과 폐기: {label}");
        } else if !accepted {
            debug!("통화 이벤트 무시: {label}");
        }

        self.session = result.session;
        for effect in result.effects {
            self.execute(effect);
        }
        accepted
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::AcquireMedia {
                call_id,
                constraints,
            } => {
                // 새 통화 시작 시 이전 장치 차단 안내 해제
                self.hardware_blocked = false;
                self.spawn_acquire(call_id, constraints);
            }
            Effect::StartStepTimer { call_id } => {
                self.cancel_step_timer();
                let sender = self.sender.clone();
                self.step_timer = self.schedule_every(self.settings.step_interval, move || {
                    sender.send(
                        CallEvent::StepTick {
                            call_id: call_id.clone(),
                        },
                        None,
                    );
                });
            }
            Effect::StopStepTimer => self.cancel_step_timer(),
            Effect::StartElapsedTimer { call_id } => {
                self.cancel_elapsed_timer();
                let sender = self.sender.clone();
                self.elapsed_timer = self.schedule_every(self.settings.elapsed_tick, move || {
                    sender.send(
                        CallEvent::ElapsedTick {
                            call_id: call_id.clone(),
                        },
                        None,
                    );
                });
            }
            Effect::StopElapsedTimer => self.cancel_elapsed_timer(),
            Effect::HoldStream(stream) => {
                if let Some(previous) = self.stream.replace(stream) {
                    self.ports.media.release(&previous);
                }
            }
            Effect::ReleaseMedia => self.release_stream(),
            Effect::ReleaseStale(stream) => {
                debug!("늦게 도착한 스트림 해제: id={}", stream.id);
                self.ports.media.release(&stream);
            }
            Effect::AttachPreview => {
                if let Some(stream) = &self.stream {
                    debug!("로컬 미리보기 연결: stream={}", stream.id);
                }
            }
            Effect::RequestSummary {
                call_id,
                kind,
                counterpart,
                reason,
            } => {
                let request = SummaryRequest {
                    kind,
                    counterpart,
                    reason,
                    language: *self.language.read(),
                };
                self.spawn_summary(call_id, request);
            }
            Effect::Notify(notice) => self.notify(notice),
            Effect::Archive(session) => {
                info!(
                    "통화 보관: id={}, elapsed={}s, summary={}",
                    session.id,
                    session.elapsed_seconds,
                    session.summary.is_some()
                );
                self.archived.publish(&session);
                self.last_call = Some(session);
            }
        }
    }

    fn spawn_acquire(&self, call_id: String, constraints: MediaConstraints) {
        let media = self.ports.media.clone();
        let sender = self.sender.clone();
        sender.begin();
        tokio::spawn(async move {
            let inner = tokio::spawn(async move { media.acquire(constraints).await });
            let event = match inner.await {
                Ok(Ok(stream)) => CallEvent::MediaAcquired { call_id, stream },
                Ok(Err(e)) => {
                    warn!("미디어 획득 실패: {e}");
                    CallEvent::MediaFailed {
                        call_id,
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    warn!("미디어 획득 태스크 비정상 종료: {e}");
                    CallEvent::MediaFailed {
                        call_id,
                        reason: e.to_string(),
                    }
                }
            };
            sender.send(event, None);
            sender.done();
        });
    }

    fn spawn_summary(&self, call_id: String, request: SummaryRequest) {
        let summarizer = self.ports.summarizer.clone();
        let sender = self.sender.clone();
        sender.begin();
        info!(
            "상담 요약 요청: id={}, provider={}",
            call_id,
            summarizer.provider_name()
        );
        tokio::spawn(async move {
            let inner = tokio::spawn(async move { summarizer.summarize(&request).await });
            let outcome = match inner.await {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => {
                    warn!("상담 요약 실패: {e}");
                    Err(e.to_string())
                }
                Err(e) => {
                    warn!("상담 요약 태스크 비정상 종료: {e}");
                    Err(e.to_string())
                }
            };
            sender.send(CallEvent::SummaryResolved { call_id, outcome }, None);
            sender.done();
        });
    }

    fn schedule_every(
        &self,
        interval: Duration,
        task: impl FnMut() + Send + 'static,
    ) -> Option<CancelToken> {
        match self.ports.scheduler.every(interval, Box::new(task)) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("통화 타이머 예약 실패: {e}");
                None
            }
        }
    }

    fn cancel_step_timer(&mut self) {
        if let Some(token) = self.step_timer.take() {
            self.ports.scheduler.cancel(token);
        }
    }

    fn cancel_elapsed_timer(&mut self) {
        if let Some(token) = self.elapsed_timer.take() {
            self.ports.scheduler.cancel(token);
        }
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("미디어 스트림 해제: id={}", stream.id);
            self.ports.media.release(&stream);
        }
    }

    fn notify(&mut self, notice: Notice) {
        let language = *self.language.read();
        let t = &self.ports.translator;
        match notice {
            Notice::CallEnded {
                counterpart,
                elapsed_seconds,
            } => {
                let title = t.lookup(keys::CALL_ENDED, language);
                let message = format!("{counterpart} · {}", format_elapsed(elapsed_seconds));
                self.ports.notifier.notify(&title, &message, Severity::Info);
            }
            Notice::HardwareBlocked { reason } => {
                self.hardware_blocked = true;
                debug!("장치 차단 사유: {reason}");
                let title = t.lookup(keys::HARDWARE_BLOCKED, language);
                let message = t.lookup(keys::HARDWARE_BLOCKED_DESC, language);
                self.ports
                    .notifier
                    .notify(&title, &message, Severity::Warning);
            }
        }
    }

    fn publish(&self) {
        let snapshot = CallSnapshot {
            status_message: self
                .session
                .as_ref()
                .and_then(|s| s.status_message())
                .map(str::to_string),
            elapsed_display: self.session.as_ref().map(|s| s.elapsed_display()),
            session: self.session.clone(),
            last_call: self.last_call.clone(),
            hardware_blocked: self.hardware_blocked,
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn teardown(&mut self) {
        self.cancel_step_timer();
        self.cancel_elapsed_timer();
        self.release_stream();
        self.archived.close();
    }
}

fn event_label(event: &CallEvent) -> &'static str {
    match event {
        CallEvent::Start { .. } => "start",
        CallEvent::StepTick { .. } => "step_tick",
        CallEvent::ElapsedTick { .. } => "elapsed_tick",
        CallEvent::MediaAcquired { .. } => "media_acquired",
        CallEvent::MediaFailed { .. } => "media_failed",
        CallEvent::ToggleMute => "toggle_mute",
        CallEvent::ToggleVideo => "toggle_video",
        CallEvent::End => "end",
        CallEvent::SummaryResolved { .. } => "summary_resolved",
    }
}
