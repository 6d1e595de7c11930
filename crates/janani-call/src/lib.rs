//! # janani-call
//!
//! 원격 상담 통화 세션 제어기.
//!
//! ## 구조
//!
//! - [`machine`]: 순수 상태 전이 함수 `(세션, 이벤트) -> (세션, 효과)`
//! - [`controller`]: 이벤트 큐를 소비하며 효과를 실행하는 제어기
//! - [`timer`]: tokio 기반/수동 발화 스케줄러
//! - [`consult`]: 의사 목록과 상담 예약부
//! - [`bridge`]: 예약부와 제어기를 연결하는 클리닉 브리지
//! - [`error`]: 통화 명령 에러

pub mod bridge;
pub mod consult;
pub mod controller;
pub mod error;
pub mod machine;
pub mod timer;

pub use bridge::ClinicalBridge;
pub use controller::{CallController, CallPorts, CallSettings, CallSnapshot};
pub use error::CallError;
