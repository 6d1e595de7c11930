//! # janani-storage
//!
//! 로컬 저장소 어댑터.
//! SQLite 기반 사용자별 건강 기록(병력, 복약, 진료 예약) 저장과
//! 스키마 마이그레이션을 관리한다.
//!
//! ## 모듈
//! - `sqlite`: 건강 기록 저장소 (HealthRecordStore 구현)
//! - `migration`: 스키마 마이그레이션

pub mod migration;
pub mod sqlite;

pub use sqlite::SqliteStorage;
