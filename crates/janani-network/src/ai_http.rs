//! 생성형 AI HTTP 공통 처리.
//!
//! Gemini `generateContent`와 OpenAI 호환 `chat/completions` 요청 본문 구성,
//! 인증 헤더, 상태 코드 확인, 응답 텍스트 추출을 담당한다.

use serde_json::{json, Value};
use tracing::{debug, warn};

use janani_core::config::{AiConfig, AiProviderType};
use janani_core::error::CoreError;
use janani_core::i18n::Language;
use janani_core::models::advisor::{ChatRole, ChatTurn};

/// 기본 Gemini 모델
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
/// 기본 OpenAI 호환 모델
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// 오류 응답 본문 로그 길이
const ERROR_BODY_PREVIEW: usize = 200;

/// 응답 형식
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReplyFormat {
    /// 자유 텍스트
    Text { max_tokens: u32 },
    /// 스키마를 따르는 JSON
    Json { schema: Value },
}

/// 응답 해석 실패를 표현할 에러 생성자 (예: `CoreError::Summarization`)
pub(crate) type Malformed = fn(String) -> CoreError;

/// 생성형 AI HTTP 클라이언트
#[derive(Debug)]
pub(crate) struct AiHttpClient {
    http_client: reqwest::Client,
    endpoint: String,
    /// API 키 (메모리에만 유지)
    api_key: String,
    model: String,
    provider_type: AiProviderType,
}

impl AiHttpClient {
    /// 설정에서 클라이언트 생성 (API 키 없으면 `CoreError::Config`)
    pub(crate) fn new(config: &AiConfig) -> Result<Self, CoreError> {
        if !config.is_configured() {
            return Err(CoreError::Config(
                "AI API 키 미설정. 설정 파일 또는 JANANI_AI__API_KEY로 입력하세요.".into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        let model = config.model.clone().unwrap_or_else(|| {
            match config.provider_type {
                AiProviderType::Gemini => DEFAULT_GEMINI_MODEL,
                AiProviderType::OpenAi => DEFAULT_OPENAI_MODEL,
            }
            .to_string()
        });

        debug!(
            endpoint = %config.endpoint,
            model = %model,
            timeout = config.timeout_secs,
            "AI HTTP 클라이언트 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model,
            provider_type: config.provider_type,
        })
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    /// 시스템 지시문 (Janaki 역할, 응답 언어 지정)
    pub(crate) fn system_instruction(language: Language) -> String {
        format!(
            "You are 'Janaki', a warm, helpful, and empathetic maternal health assistant. \
             You must respond in {}. Keep your advice simple, practical, and easy to understand \
             for women in rural India. Always maintain a kind and supportive tone.",
            language.name()
        )
    }

    /// 요청 본문 구성
    pub(crate) fn request_body(
        &self,
        system: &str,
        turns: &[ChatTurn],
        format: &ReplyFormat,
    ) -> Value {
        match self.provider_type {
            AiProviderType::Gemini => {
                let contents: Vec<Value> = turns
                    .iter()
                    .map(|turn| {
                        let role = match turn.role {
                            ChatRole::User => "user",
                            ChatRole::Model => "model",
                        };
                        json!({ "role": role, "parts": [{ "text": turn.text }] })
                    })
                    .collect();
                let mut body = json!({
                    "systemInstruction": { "parts": [{ "text": system }] },
                    "contents": contents
                });
                if let ReplyFormat::Json { schema } = format {
                    body["generationConfig"] = json!({
                        "responseMimeType": "application/json",
                        "responseSchema": schema
                    });
                }
                body
            }
            AiProviderType::OpenAi => {
                let system = match format {
                    ReplyFormat::Text { .. } => system.to_string(),
                    ReplyFormat::Json { schema } => format!(
                        "{system}\nRespond only with a JSON object matching this schema: {schema}"
                    ),
                };
                let mut messages = vec![json!({ "role": "system", "content": system })];
                messages.extend(turns.iter().map(|turn| {
                    let role = match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "assistant",
                    };
                    json!({ "role": role, "content": turn.text })
                }));
                let mut body = json!({ "model": self.model, "messages": messages });
                match format {
                    ReplyFormat::Text { max_tokens } => body["max_tokens"] = json!(max_tokens),
                    ReplyFormat::Json { .. } => {
                        body["response_format"] = json!({ "type": "json_object" })
                    }
                }
                body
            }
        }
    }

    /// 요청 전송 후 응답 텍스트 반환
    ///
    /// 전송/상태 코드 실패는 `CoreError::Network`, 본문 해석 실패는 `malformed`.
    pub(crate) async fn generate(
        &self,
        system: &str,
        turns: &[ChatTurn],
        format: &ReplyFormat,
        malformed: Malformed,
    ) -> Result<String, CoreError> {
        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&self.request_body(system, turns, format));

        builder = match self.provider_type {
            AiProviderType::Gemini => builder.header("x-goog-api-key", &self.api_key),
            AiProviderType::OpenAi => {
                builder.header("Authorization", format!("Bearer {}", self.api_key))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("AI API 호출 실패: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("AI API 응답 읽기 실패: {}", e)))?;

        if !status.is_success() {
            warn!(status = %status, "AI API 오류 응답");
            return Err(CoreError::Network(format!(
                "AI API 오류 ({}): {}",
                status,
                body.chars().take(ERROR_BODY_PREVIEW).collect::<String>()
            )));
        }

        match self.provider_type {
            AiProviderType::Gemini => parse_gemini_text(&body, malformed),
            AiProviderType::OpenAi => parse_openai_text(&body, malformed),
        }
    }
}

/// Gemini 응답 파싱: candidates[0].content.parts[*].text 연결
pub(crate) fn parse_gemini_text(body: &str, malformed: Malformed) -> Result<String, CoreError> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| malformed(format!("응답 JSON 파싱 실패: {}", e)))?;

    let parts = response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| malformed("Gemini 응답에서 텍스트를 찾을 수 없음".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    non_empty(text, malformed)
}

/// OpenAI 응답 파싱: choices[0].message.content
pub(crate) fn parse_openai_text(body: &str, malformed: Malformed) -> Result<String, CoreError> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| malformed(format!("응답 JSON 파싱 실패: {}", e)))?;

    let text = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| malformed("OpenAI 응답에서 텍스트를 찾을 수 없음".to_string()))?;

    non_empty(text.to_string(), malformed)
}

/// 빈 응답은 실패로 취급
fn non_empty(text: String, malformed: Malformed) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(malformed("빈 응답".to_string()));
    }
    Ok(trimmed.to_string())
}
