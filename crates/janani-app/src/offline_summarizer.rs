//! 오프라인 요약기.
//!
//! API 키가 없거나 `--offline`일 때 사용. 항상 실패를 반환하므로
//! 통화 제어기는 대체 문구로 요약을 채운다.

use async_trait::async_trait;
use janani_core::error::CoreError;
use janani_core::ports::summarizer::{SummaryRequest, Summarizer};
use tracing::debug;

/// 오프라인 요약기
pub struct OfflineSummarizer;

#[async_trait]
impl Summarizer for OfflineSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, CoreError> {
        debug!(counterpart = %request.counterpart, "오프라인 모드, 요약 생략");
        Err(CoreError::Summarization("오프라인 모드".to_string()))
    }

    fn provider_name(&self) -> &str {
        "offline"
    }
}
