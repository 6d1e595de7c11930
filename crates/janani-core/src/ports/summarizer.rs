//! 상담 요약 포트.
//!
//! 통화 메타데이터를 짧은 자연어 요약으로 변환하는 외부 생성형 AI 호출.
//! 구현: `janani-network` crate (reqwest)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::i18n::Language;
use crate::models::call::CallKind;

/// 요약 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// 통화 종류
    pub kind: CallKind,
    /// 상대방 이름
    pub counterpart: String,
    /// 통화 사유
    pub reason: String,
    /// 응답 언어
    pub language: Language,
}

impl SummaryRequest {
    /// 사용자 프롬프트 생성
    pub fn prompt(&self) -> String {
        format!(
            "Clinical summary for a {} consult with {} regarding {}. Write as 'Janaki'.",
            self.kind, self.counterpart, self.reason
        )
    }
}

/// 상담 요약기: 재시도 정책은 호출자가 강제하지 않는다
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// 요약 생성 (실패 시 `CoreError::Summarization` 또는 `CoreError::Network`)
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, CoreError>;

    /// 제공자 이름 (예: "gemini-3-flash-preview", "offline")
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_call_metadata() {
        let req = SummaryRequest {
            kind: CallKind::Video,
            counterpart: "Dr. Anita Sharma".to_string(),
            reason: "Routine follow-up on vitals".to_string(),
            language: Language::Hindi,
        };
        let prompt = req.prompt();
        assert!(prompt.contains("Video consult"));
        assert!(prompt.contains("Dr. Anita Sharma"));
        assert!(prompt.contains("Routine follow-up on vitals"));
        assert!(prompt.contains("Janaki"));
    }
}
