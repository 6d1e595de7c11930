//! 통화 데모.
//!
//! 의사 한 명과 통화를 시작하고 연결 문구를 출력한 뒤,
//! 지정한 시간 동안 통화하고 종료하여 요약까지 기다린다.

use janani_call::ClinicalBridge;
use janani_core::error::CoreError;
use janani_core::models::call::{CallKind, CallPhase, CallSession};
use std::time::Duration;
use tracing::info;

/// 데모 통화 옵션
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub doctor_id: String,
    pub reason: String,
    pub kind: CallKind,
    /// 연결 후 통화 유지 시간
    pub talk_for: Duration,
    /// 전체 제한 시간
    pub timeout: Duration,
}

/// 데모 통화 실행 · 보관된 세션 반환
pub async fn run_demo_call(
    bridge: &ClinicalBridge,
    options: &DemoOptions,
) -> Result<CallSession, CoreError> {
    tokio::time::timeout(options.timeout, drive(bridge, options))
        .await
        .map_err(|_| CoreError::Internal("데모 통화 제한 시간 초과".to_string()))?
}

async fn drive(bridge: &ClinicalBridge, options: &DemoOptions) -> Result<CallSession, CoreError> {
    let controller = bridge.controller();
    let mut archived = controller.archived();
    let mut snapshots = controller.subscribe();

    let call_id = bridge
        .call_now(&options.doctor_id, &options.reason, options.kind)
        .await?;
    info!(call_id = %call_id, "데모 통화 시작");

    let mut last_message: Option<String> = None;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.hardware_blocked {
            return Err(CoreError::MediaAcquisition(
                "카메라/마이크를 사용할 수 없음".to_string(),
            ));
        }
        if let Some(message) = snapshot.status_message {
            if last_message.as_deref() != Some(message.as_str()) {
                println!("  … {message}");
                last_message = Some(message);
            }
        }
        let active = snapshot
            .session
            .as_ref()
            .is_some_and(|s| s.id == call_id && s.phase == CallPhase::Active);
        if active {
            break;
        }
        snapshots
            .changed()
            .await
            .map_err(|_| CoreError::Internal("통화 제어기 종료됨".to_string()))?;
    }

    println!("  ● 연결됨 · {}초 통화", options.talk_for.as_secs());
    tokio::time::sleep(options.talk_for).await;
    controller.end_call().await?;

    while let Some(session) = archived.recv().await {
        if session.id == call_id {
            return Ok(session);
        }
    }
    Err(CoreError::Internal("통화 제어기 종료됨".to_string()))
}
