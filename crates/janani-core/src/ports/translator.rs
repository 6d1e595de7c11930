//! 번역 포트.
//!
//! 키 + 언어로 표시 문구를 조회한다. 구현체는 반드시 대체 언어를 보장해야 한다.

use crate::i18n::Language;

/// 번역 조회 인터페이스
pub trait Translator: Send + Sync {
    /// 문구 조회: 없으면 영어, 영어에도 없으면 키 자체를 반환
    fn lookup(&self, key: &str, language: Language) -> String;
}
