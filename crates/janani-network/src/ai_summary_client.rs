//! 외부 AI 상담 요약 클라이언트.
//!
//! 통화 메타데이터(종류, 상대방, 사유)만으로 짧은 상담 요약을 생성한다.
//! 음성/영상 데이터는 전송하지 않는다.

use async_trait::async_trait;
use tracing::debug;

use janani_core::config::AiConfig;
use janani_core::error::CoreError;
use janani_core::models::advisor::ChatTurn;
use janani_core::ports::summarizer::{SummaryRequest, Summarizer};

use crate::ai_http::{AiHttpClient, ReplyFormat};

/// 요약 응답 최대 토큰 (OpenAI 호환)
const SUMMARY_MAX_TOKENS: u32 = 512;

// ============================================================
// RemoteSummarizer: 외부 AI 요약 클라이언트
// ============================================================

/// 외부 AI 요약 클라이언트
///
/// 지원 API:
/// - Gemini: `POST .../models/{model}:generateContent` (`x-goog-api-key` 헤더)
/// - OpenAI 호환: `POST /v1/chat/completions` (Bearer 토큰)
#[derive(Debug)]
pub struct RemoteSummarizer {
    client: AiHttpClient,
}

impl RemoteSummarizer {
    /// 새 RemoteSummarizer 생성
    pub fn new(config: &AiConfig) -> Result<Self, CoreError> {
        Ok(Self {
            client: AiHttpClient::new(config)?,
        })
    }

    fn request_parts(request: &SummaryRequest) -> (String, [ChatTurn; 1]) {
        (
            AiHttpClient::system_instruction(request.language),
            [ChatTurn::user(request.prompt())],
        )
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, CoreError> {
        debug!(
            model = %self.client.model(),
            counterpart = %request.counterpart,
            "상담 요약 API 호출"
        );

        let (system, turns) = Self::request_parts(request);
        let summary = self
            .client
            .generate(
                &system,
                &turns,
                &ReplyFormat::Text {
                    max_tokens: SUMMARY_MAX_TOKENS,
                },
                CoreError::Summarization,
            )
            .await?;

        debug!(chars = summary.chars().count(), "상담 요약 수신");
        Ok(summary)
    }

    fn provider_name(&self) -> &str {
        self.client.model()
    }
}

// ============================================================
// 테스트
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_http::{parse_gemini_text, parse_openai_text};
    use janani_core::config::AiProviderType;
    use janani_core::i18n::Language;
    use janani_core::models::call::CallKind;

    fn request() -> SummaryRequest {
        SummaryRequest {
            kind: CallKind::Video,
            counterpart: "Dr. Anita Sharma".to_string(),
            reason: "Routine follow-up on vitals".to_string(),
            language: Language::Hindi,
        }
    }

    fn config(endpoint: String, provider_type: AiProviderType) -> AiConfig {
        AiConfig {
            endpoint,
            api_key: "test-key".to_string(),
            model: None,
            timeout_secs: 5,
            provider_type,
        }
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let result = RemoteSummarizer::new(&AiConfig::default());
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn system_instruction_names_language() {
        let text = AiHttpClient::system_instruction(Language::Tamil);
        assert!(text.contains("Janaki"));
        assert!(text.contains("respond in Tamil"));
    }

    #[test]
    fn default_model_follows_provider() {
        let gemini =
            RemoteSummarizer::new(&config("http://x".into(), AiProviderType::Gemini)).unwrap();
        assert_eq!(gemini.provider_name(), "gemini-3-flash-preview");
        let openai =
            RemoteSummarizer::new(&config("http://x".into(), AiProviderType::OpenAi)).unwrap();
        assert_eq!(openai.provider_name(), "gpt-4o-mini");
    }

    #[test]
    fn gemini_body_carries_prompt_and_instruction() {
        let client =
            RemoteSummarizer::new(&config("http://x".into(), AiProviderType::Gemini)).unwrap();
        let (system, turns) = RemoteSummarizer::request_parts(&request());
        let body = client.client.request_body(
            &system,
            &turns,
            &ReplyFormat::Text {
                max_tokens: SUMMARY_MAX_TOKENS,
            },
        );
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.starts_with("Clinical summary for a Video consult with Dr. Anita Sharma"));
        let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(system.contains("Hindi"));
    }

    #[test]
    fn parse_gemini_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "Vitals stable. " }, { "text": "Rest well." }] }
            }]
        }"#;
        let text = parse_gemini_text(body, CoreError::Summarization).unwrap();
        assert_eq!(text, "Vitals stable. Rest well.");
    }

    #[test]
    fn parse_gemini_empty_text_is_error() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#;
        assert!(matches!(
            parse_gemini_text(body, CoreError::Summarization),
            Err(CoreError::Summarization(_))
        ));
    }

    #[test]
    fn parse_gemini_no_candidates() {
        let body = r#"{"candidates": []}"#;
        assert!(parse_gemini_text(body, CoreError::Summarization).is_err());
    }

    #[test]
    fn parse_openai_valid() {
        let body = r#"{"choices": [{"message": {"content": "Follow up next week."}}]}"#;
        assert_eq!(
            parse_openai_text(body, CoreError::Summarization).unwrap(),
            "Follow up next week."
        );
    }

    #[test]
    fn parse_invalid_json() {
        assert!(parse_openai_text("not json", CoreError::Summarization).is_err());
    }

    #[tokio::test]
    async fn summarize_against_gemini_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"All vitals stable"}]}}]}"#)
            .create_async()
            .await;

        let endpoint = format!(
            "{}/v1beta/models/gemini-3-flash-preview:generateContent",
            server.url()
        );
        let client = RemoteSummarizer::new(&config(endpoint, AiProviderType::Gemini)).unwrap();
        let summary = client.summarize(&request()).await.unwrap();

        assert_eq!(summary, "All vitals stable");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn summarize_against_openai_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"Drink water"}}]}"#)
            .create_async()
            .await;

        let endpoint = format!("{}/v1/chat/completions", server.url());
        let client = RemoteSummarizer::new(&config(endpoint, AiProviderType::OpenAi)).unwrap();
        assert_eq!(client.summarize(&request()).await.unwrap(), "Drink water");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let endpoint = format!("{}/v1/chat/completions", server.url());
        let client = RemoteSummarizer::new(&config(endpoint, AiProviderType::OpenAi)).unwrap();
        let result = client.summarize(&request()).await;
        assert!(matches!(result, Err(CoreError::Network(msg)) if msg.contains("503")));
    }
}
