//! 로그 기반 알림 싱크.
//!
//! 데스크톱 알림 대신 tracing 로그로 발송하고 최근 알림을 보관한다.

use janani_core::models::notification::Severity;
use janani_core::ports::notifier::NotificationSink;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::{error, info, warn};

/// 보관할 최근 알림 수
const RECENT_CAPACITY: usize = 32;

/// 발송된 알림 한 건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// 로그 알림 싱크
#[derive(Default)]
pub struct LogNotifier {
    recent: Mutex<VecDeque<SentNotification>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 최근 알림 (오래된 순)
    pub fn recent(&self) -> Vec<SentNotification> {
        self.recent.lock().iter().cloned().collect()
    }
}

impl NotificationSink for LogNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(?severity, "[알림] {title}: {message}"),
            Severity::Warning => warn!("[알림] {title}: {message}"),
            Severity::Critical => error!("[알림] {title}: {message}"),
        }

        let mut recent = self.recent.lock();
        if recent.len() == RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(SentNotification {
            title: title.to_string(),
            message: message.to_string(),
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_recent_in_order() {
        let notifier = LogNotifier::new();
        notifier.notify("Consult Scheduled", "Dr. Anita Sharma", Severity::Success);
        notifier.notify("Call Ended", "Dr. Anita Sharma · 00:12", Severity::Info);

        let recent = notifier.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Consult Scheduled");
        assert_eq!(recent[1].severity, Severity::Info);
    }

    #[test]
    fn recent_is_bounded() {
        let notifier = LogNotifier::new();
        for i in 0..(RECENT_CAPACITY + 5) {
            notifier.notify(&format!("n{i}"), "", Severity::Info);
        }
        let recent = notifier.recent();
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent[0].title, "n5");
    }
}
