//! 타이머 스케줄러 포트.
//!
//! 지연 실행/주기 실행을 예약하고 취소 토큰으로 해제한다.
//! 콜백은 panic 없이 반환해야 하며, 예약 실패는 `CoreError::Scheduling`으로 보고된다.

use std::time::Duration;

use crate::error::CoreError;

/// 예약 취소 토큰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelToken(pub u64);

/// 1회 실행 콜백
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// 주기 실행 콜백
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// 타이머 스케줄러 인터페이스
pub trait Scheduler: Send + Sync {
    /// `delay` 후 1회 실행
    fn after(&self, delay: Duration, task: OnceTask) -> Result<CancelToken, CoreError>;

    /// `interval`마다 반복 실행 (첫 실행은 `interval` 후)
    fn every(&self, interval: Duration, task: RepeatingTask) -> Result<CancelToken, CoreError>;

    /// 예약 취소: 이미 실행/취소된 토큰이면 무시
    fn cancel(&self, token: CancelToken);
}
