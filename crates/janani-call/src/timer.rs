//! 타이머 스케줄러 구현.
//!
//! - [`TokioScheduler`]: tokio 런타임 위에서 동작하는 실제 타이머
//! - [`ManualScheduler`]: 테스트/시뮬레이션용 수동 발화 타이머

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use janani_core::error::CoreError;
use janani_core::ports::scheduler::{CancelToken, OnceTask, RepeatingTask, Scheduler};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

/// tokio 기반 스케줄러
///
/// 각 예약은 별도 태스크로 실행되며 취소 시 abort된다.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    /// 현재 tokio 런타임에서 스케줄러 생성
    pub fn new() -> Result<Self, CoreError> {
        let runtime = Handle::try_current()
            .map_err(|e| CoreError::Scheduling(format!("tokio 런타임 없음: {e}")))?;
        Ok(Self::with_handle(runtime))
    }

    /// 지정한 런타임 핸들로 스케줄러 생성
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 활성 예약 수
    pub fn active_count(&self) -> usize {
        self.tasks.lock().len()
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: OnceTask) -> Result<CancelToken, CoreError> {
        let id = self.allocate();
        let tasks = self.tasks.clone();
        // 등록 전에 태스크가 끝나는 경우를 막기 위해 잠금을 잡은 채로 spawn
        let mut guard = self.tasks.lock();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.lock().remove(&id);
            task();
        });
        guard.insert(id, join.abort_handle());
        Ok(CancelToken(id))
    }

    fn every(&self, interval: Duration, mut task: RepeatingTask) -> Result<CancelToken, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::Scheduling("주기는 0보다 커야 함".to_string()));
        }
        let id = self.allocate();
        let join = self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        self.tasks.lock().insert(id, join.abort_handle());
        Ok(CancelToken(id))
    }

    fn cancel(&self, token: CancelToken) {
        if let Some(handle) = self.tasks.lock().remove(&token.0) {
            handle.abort();
            debug!("타이머 취소: id={}", token.0);
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.lock().drain() {
            handle.abort();
        }
    }
}

enum ManualTask {
    Once(OnceTask),
    Repeating(RepeatingTask),
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    tasks: BTreeMap<u64, ManualTask>,
    running: Option<u64>,
    cancelled_while_running: bool,
    failing: bool,
    scheduled_total: usize,
}

/// 수동 발화 스케줄러
///
/// 시간 경과 없이 `fire_all()` 호출로 등록된 모든 예약을 한 번씩 실행한다.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    /// 새 수동 스케줄러 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 예약 요청을 실패시킬지 설정
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// 현재 등록된 예약 수
    pub fn active_count(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// 지금까지 성공한 예약 요청 수
    pub fn scheduled_total(&self) -> usize {
        self.state.lock().scheduled_total
    }

    /// 등록된 모든 예약을 한 번씩 실행: 실행한 개수 반환
    ///
    /// 1회 예약은 실행 후 제거되고, 반복 예약은 실행 중 취소되지 않았다면 유지된다.
    pub fn fire_all(&self) -> usize {
        let ids: Vec<u64> = self.state.lock().tasks.keys().copied().collect();
        let mut fired = 0;

        for id in ids {
            let task = {
                let mut state = self.state.lock();
                match state.tasks.remove(&id) {
                    Some(task) => {
                        state.running = Some(id);
                        state.cancelled_while_running = false;
                        task
                    }
                    None => continue,
                }
            };

            let keep = match task {
                ManualTask::Once(task) => {
                    task();
                    None
                }
                ManualTask::Repeating(mut task) => {
                    task();
                    Some(ManualTask::Repeating(task))
                }
            };
            fired += 1;

            let mut state = self.state.lock();
            state.running = None;
            if let Some(task) = keep {
                if !state.cancelled_while_running {
                    state.tasks.insert(id, task);
                }
            }
        }

        fired
    }

    fn register(&self, task: ManualTask) -> Result<CancelToken, CoreError> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(CoreError::Scheduling("수동 스케줄러 실패 모드".to_string()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.tasks.insert(id, task);
        state.scheduled_total += 1;
        Ok(CancelToken(id))
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, _delay: Duration, task: OnceTask) -> Result<CancelToken, CoreError> {
        self.register(ManualTask::Once(task))
    }

    fn every(&self, _interval: Duration, task: RepeatingTask) -> Result<CancelToken, CoreError> {
        self.register(ManualTask::Repeating(task))
    }

    fn cancel(&self, token: CancelToken) {
        let mut state = self.state.lock();
        if state.tasks.remove(&token.0).is_none() && state.running == Some(token.0) {
            state.cancelled_while_running = true;
        }
    }
}
