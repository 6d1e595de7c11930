//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 각 어댑터 crate가 이 trait들을 구현하며,
//! `janani-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 비동기 포트는 `async_trait` 매크로로 object safety를 보장한다.

pub mod advisor;
pub mod media;
pub mod notifier;
pub mod scheduler;
pub mod storage;
pub mod summarizer;
pub mod translator;
