//! Janani 도메인 모델.
//!
//! 통화 세션, 상담 예약, 건강 기록 문서, AI 건강 분석, 알림 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod advisor;
pub mod call;
pub mod consult;
pub mod health_record;
pub mod notification;
