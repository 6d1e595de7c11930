//! 시뮬레이션 미디어 캡처.
//!
//! 실제 장치 없이 스트림 핸들을 발급한다. 해제는 핸들 단위로 멱등.

use async_trait::async_trait;
use janani_core::error::CoreError;
use janani_core::ports::media::{MediaCapture, MediaConstraints, StreamHandle};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// 시뮬레이션 캡처 장치
pub struct SimulatedMediaCapture {
    next_id: AtomicU64,
    active: Mutex<HashSet<u64>>,
    latency: Duration,
    denied: AtomicBool,
}

impl SimulatedMediaCapture {
    /// 새 장치 생성 (획득 지연 포함)
    pub fn new(latency: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            active: Mutex::new(HashSet::new()),
            latency,
            denied: AtomicBool::new(false),
        }
    }

    /// 권한 거부 상태 설정
    pub fn set_denied(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    /// 해제되지 않은 스트림 수
    pub fn active_streams(&self) -> usize {
        self.active.lock().len()
    }
}

#[async_trait]
impl MediaCapture for SimulatedMediaCapture {
    async fn acquire(&self, constraints: MediaConstraints) -> Result<StreamHandle, CoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.denied.load(Ordering::SeqCst) {
            return Err(CoreError::MediaAcquisition(
                "카메라/마이크 권한 거부".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.active.lock().insert(id);
        debug!(
            stream_id = id,
            audio = constraints.audio,
            video = constraints.video,
            "스트림 획득"
        );
        Ok(StreamHandle { id, constraints })
    }

    fn release(&self, handle: &StreamHandle) {
        if self.active.lock().remove(&handle.id) {
            info!(stream_id = handle.id, "스트림 해제");
        }
    }
}
