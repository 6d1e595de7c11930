//! 알림 포트.
//!
//! 통화 예약/종료/장치 차단 이벤트를 사용자에게 전달한다. 발송 후 결과를 기다리지 않는다.

use crate::models::notification::Severity;

/// 알림 발송 인터페이스
pub trait NotificationSink: Send + Sync {
    /// 알림 발송 (fire-and-forget)
    fn notify(&self, title: &str, message: &str, severity: Severity);
}
