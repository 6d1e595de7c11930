//! 클리닉 브리지: 상담 예약부와 통화 제어기 연결.
//!
//! 예약 상담 참여, 즉시 상담, 응급 통화를 통화 제어기 명령으로 변환하고
//! 보관된 통화를 예약 상태(Live → Completed)에 반영한다.

use std::sync::Arc;

use janani_core::error::CoreError;
use janani_core::i18n::keys;
use janani_core::models::call::{CallKind, CallSession};
use janani_core::models::consult::{CallAppointment, ConsultStatus, Doctor};
use janani_core::models::notification::Severity;
use janani_core::ports::notifier::NotificationSink;
use janani_core::ports::translator::Translator;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::consult::{ConsultBook, NewConsult, EMERGENCY_COUNTERPART, EMERGENCY_REASON};
use crate::controller::CallController;

/// 클리닉 브리지 (복제 가능)
#[derive(Clone)]
pub struct ClinicalBridge {
    controller: CallController,
    book: Arc<Mutex<ConsultBook>>,
    archived: Arc<Mutex<mpsc::UnboundedReceiver<CallSession>>>,
    notifier: Arc<dyn NotificationSink>,
    translator: Arc<dyn Translator>,
}

impl ClinicalBridge {
    /// 새 브리지 생성
    pub fn new(
        controller: CallController,
        book: ConsultBook,
        notifier: Arc<dyn NotificationSink>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let archived = controller.archived();
        Self {
            controller,
            book: Arc::new(Mutex::new(book)),
            archived: Arc::new(Mutex::new(archived)),
            notifier,
            translator,
        }
    }

    /// 통화 제어기
    pub fn controller(&self) -> &CallController {
        &self.controller
    }

    /// 의사 목록
    pub fn doctors(&self) -> Vec<Doctor> {
        self.book.lock().doctors().to_vec()
    }

    /// 상담 목록 (보관된 통화 반영 후)
    pub fn consults(&self) -> Vec<CallAppointment> {
        self.sync_archived();
        self.book.lock().consults().to_vec()
    }

    /// 상담 예약: "상담 예약됨" 알림 발송
    pub fn schedule(&self, request: &NewConsult) -> Result<CallAppointment, CoreError> {
        let consult = self.book.lock().schedule(request)?;
        info!(
            "상담 예약: id={}, doctor={}, {} {}",
            consult.id, consult.doctor_name, consult.date, consult.time
        );

        let language = self.controller.language();
        let title = self.translator.lookup(keys::CALL_SCHEDULED, language);
        let message = format!(
            "{} · {} {}",
            consult.doctor_name, consult.date, consult.time
        );
        self.notifier.notify(&title, &message, Severity::Success);
        Ok(consult)
    }

    /// 예약 상담 참여: 시작된 통화 ID 반환
    pub async fn join(&self, consult_id: &str) -> Result<String, CoreError> {
        self.sync_archived();
        let consult = self.book.lock().consult(consult_id)?.clone();
        if matches!(
            consult.status,
            ConsultStatus::Completed | ConsultStatus::Missed
        ) {
            return Err(CoreError::validation(
                "status",
                format!("참여할 수 없는 상담 상태: {:?}", consult.status),
            ));
        }

        let call_id = self
            .controller
            .start_call(&consult.doctor_name, &consult.reason, consult.kind)
            .await?;
        self.book.lock().mark_live(consult_id, &call_id)?;
        info!("상담 참여: consult={}, call={}", consult_id, call_id);
        Ok(call_id)
    }

    /// 예약 없이 바로 상담 통화 시작
    pub async fn call_now(
        &self,
        doctor_id: &str,
        reason: &str,
        kind: CallKind,
    ) -> Result<String, CoreError> {
        let doctor_name = self.book.lock().doctor(doctor_id)?.name.clone();
        let call_id = self.controller.start_call(&doctor_name, reason, kind).await?;
        Ok(call_id)
    }

    /// 응급 통화 시작 (응급 센터, 영상)
    pub async fn emergency(&self) -> Result<String, CoreError> {
        warn!("응급 통화 요청");
        let call_id = self
            .controller
            .start_call(EMERGENCY_COUNTERPART, EMERGENCY_REASON, CallKind::Video)
            .await?;
        Ok(call_id)
    }

    fn sync_archived(&self) {
        let mut rx = self.archived.lock();
        loop {
            match rx.try_recv() {
                Ok(session) => {
                    if let Some(consult) = self.book.lock().record_archived(&session) {
                        info!(
                            "상담 상태 갱신: id={}, status={:?}",
                            consult.id, consult.status
                        );
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("보관 통화 구독 종료됨");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CallPorts, CallSettings};
    use crate::timer::ManualScheduler;
    use async_trait::async_trait;
    use janani_core::i18n::DictionaryTranslator;
    use janani_core::ports::media::{MediaCapture, MediaConstraints, StreamHandle};
    use janani_core::ports::summarizer::{SummaryRequest, Summarizer};

    struct OkMedia;

    #[async_trait]
    impl MediaCapture for OkMedia {
        async fn acquire(&self, constraints: MediaConstraints) -> Result<StreamHandle, CoreError> {
            Ok(StreamHandle { id: 1, constraints })
        }
        fn release(&self, _handle: &StreamHandle) {}
    }

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, request: &SummaryRequest) -> Result<String, CoreError> {
            Ok(format!("Notes for {}", request.counterpart))
        }
        fn provider_name(&self) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct Titles(Mutex<Vec<String>>);

    impl NotificationSink for Titles {
        fn notify(&self, title: &str, _message: &str, _severity: Severity) {
            self.0.lock().push(title.to_string());
        }
    }

    fn bridge() -> (ClinicalBridge, ManualScheduler, Arc<Titles>) {
        let scheduler = ManualScheduler::new();
        let titles = Arc::new(Titles::default());
        let translator = Arc::new(DictionaryTranslator::new());
        let controller = CallController::spawn(
            CallPorts {
                media: Arc::new(OkMedia),
                summarizer: Arc::new(EchoSummarizer),
                scheduler: Arc::new(scheduler.clone()),
                notifier: titles.clone(),
                translator: translator.clone(),
            },
            CallSettings::default(),
        );
        let bridge = ClinicalBridge::new(
            controller,
            ConsultBook::with_demo("Sita"),
            titles.clone(),
            translator,
        );
        (bridge, scheduler, titles)
    }

    #[tokio::test]
    async fn schedule_notifies() {
        let (bridge, _, titles) = bridge();
        bridge
            .schedule(&NewConsult {
                doctor_id: "D1".to_string(),
                reason: "Back pain".to_string(),
                kind: CallKind::Voice,
                date: None,
                time: None,
            })
            .unwrap();
        assert_eq!(titles.0.lock().as_slice(), ["Consult Scheduled"]);
        assert_eq!(bridge.consults().len(), 2);
    }

    #[tokio::test]
    async fn join_marks_live_then_completed() {
        let (bridge, scheduler, _) = bridge();
        let call_id = bridge.join("demo-1").await.unwrap();
        bridge.controller().settle().await;
        assert_eq!(bridge.consults()[0].status, ConsultStatus::Live);

        for _ in 0..6 {
            scheduler.fire_all();
            bridge.controller().settle().await;
        }
        bridge.controller().end_call().await.unwrap();
        bridge.controller().settle().await;

        let snapshot = bridge.controller().snapshot();
        let last = snapshot.last_call.unwrap();
        assert_eq!(last.id, call_id);
        assert_eq!(last.counterpart_name, "Dr. Anita Sharma");
        assert_eq!(bridge.consults()[0].status, ConsultStatus::Completed);
    }

    #[tokio::test]
    async fn joined_consult_completes_after_many_unread_calls() {
        let (bridge, _, _) = bridge();
        bridge.join("demo-1").await.unwrap();
        bridge.controller().settle().await;
        bridge.controller().end_call().await.unwrap();
        bridge.controller().settle().await;

        for i in 0..20 {
            bridge
                .call_now("D2", &format!("follow-up {i}"), CallKind::Voice)
                .await
                .unwrap();
            bridge.controller().settle().await;
            bridge.controller().end_call().await.unwrap();
            bridge.controller().settle().await;
        }

        let demo = bridge
            .consults()
            .into_iter()
            .find(|c| c.id == "demo-1")
            .unwrap();
        assert_eq!(demo.status, ConsultStatus::Completed);
    }

    #[tokio::test]
    async fn completed_consult_cannot_be_joined_again() {
        let (bridge, _, _) = bridge();
        bridge.join("demo-1").await.unwrap();
        bridge.controller().end_call().await.unwrap();
        bridge.controller().settle().await;

        assert!(matches!(
            bridge.join("demo-1").await,
            Err(CoreError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn emergency_uses_fixed_counterpart() {
        let (bridge, _, _) = bridge();
        bridge.emergency().await.unwrap();
        let session = bridge.controller().snapshot().session.unwrap();
        assert_eq!(session.counterpart_name, "Emergency Unit");
        assert_eq!(session.reason, "Emergency");
        assert_eq!(session.kind, CallKind::Video);

        assert!(matches!(
            bridge.emergency().await,
            Err(CoreError::CallInProgress(_))
        ));
    }

    #[tokio::test]
    async fn call_now_unknown_doctor() {
        let (bridge, _, _) = bridge();
        assert!(matches!(
            bridge.call_now("D7", "x", CallKind::Voice).await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
