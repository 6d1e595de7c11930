//! 애플리케이션 설정 구조체.
//!
//! 통화 타이밍, AI 요약 API, 로컬 저장소 경로, 웹 서버 포트 등
//! 런타임 설정을 정의한다. `config` crate를 통해 파일/환경변수에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::i18n::Language;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 통화 세션 설정
    #[serde(default)]
    pub call: CallConfig,
    /// 외부 생성형 AI 설정
    #[serde(default)]
    pub ai: AiConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// REST 서버 설정
    #[serde(default)]
    pub web: WebConfig,
}

// ============================================================
// 통화 설정
// ============================================================

/// 통화 세션 타이밍 및 요약 정책
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// 연결 시뮬레이션 단계 간격 (밀리초)
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// 경과 시간 타이머 간격 (밀리초)
    #[serde(default = "default_elapsed_tick_ms")]
    pub elapsed_tick_ms: u64,
    /// 요약 요청 최소 통화 시간 (초, 이상이면 요청)
    #[serde(default = "default_summary_threshold_secs")]
    pub summary_threshold_secs: u64,
    /// 요약 실패 시 대체 문구
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,
    /// 요약/알림 언어
    #[serde(default)]
    pub language: Language,
}

fn default_step_interval_ms() -> u64 {
    800
}

fn default_elapsed_tick_ms() -> u64 {
    1_000
}

fn default_summary_threshold_secs() -> u64 {
    5
}

fn default_fallback_summary() -> String {
    "Consultation completed successfully.".to_string()
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
            elapsed_tick_ms: default_elapsed_tick_ms(),
            summary_threshold_secs: default_summary_threshold_secs(),
            fallback_summary: default_fallback_summary(),
            language: Language::default(),
        }
    }
}

impl CallConfig {
    /// 연결 단계 간격을 Duration으로 반환
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// 경과 시간 타이머 간격을 Duration으로 반환
    pub fn elapsed_tick(&self) -> Duration {
        Duration::from_millis(self.elapsed_tick_ms)
    }
}

// ============================================================
// AI 설정
// ============================================================

/// AI 제공자 타입: 요청/응답 형식 및 인증 헤더 결정에 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AiProviderType {
    /// Google Gemini: `x-goog-api-key` 헤더 + `generateContent` 형식
    #[default]
    Gemini,
    /// OpenAI 호환 API: `Authorization: Bearer` 헤더 + `/v1/chat/completions` 형식
    OpenAi,
}

/// 외부 생성형 AI API 설정
///
/// API 키가 비어 있으면 요약기는 오프라인으로 동작한다 (항상 대체 문구).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API URL (예: "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent")
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    /// API 키 (로컬 config.json 또는 JANANI_AI__API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// 모델 이름
    #[serde(default)]
    pub model: Option<String>,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
    /// AI 제공자 타입
    #[serde(default)]
    pub provider_type: AiProviderType,
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        .to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            api_key: String::new(),
            model: None,
            timeout_secs: default_api_timeout_secs(),
            provider_type: AiProviderType::default(),
        }
    }
}

impl AiConfig {
    /// API 키가 설정되어 원격 호출이 가능한지 여부
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ============================================================
// 저장소 / 웹 설정
// ============================================================

/// 로컬 저장소 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite 파일 경로 (None이면 플랫폼 데이터 디렉토리)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// REST 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 바인드 포트
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 (false면 127.0.0.1에만 바인드)
    #[serde(default)]
    pub allow_external: bool,
}

fn default_web_port() -> u16 {
    5000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
        }
    }
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            call: CallConfig::default(),
            ai: AiConfig::default(),
            storage: StorageConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_conversions() {
        let config = CallConfig::default();
        assert_eq!(config.step_interval(), Duration::from_millis(800));
        assert_eq!(config.elapsed_tick(), Duration::from_secs(1));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{"web": {"port": 8080}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.call.summary_threshold_secs, 5);
        assert_eq!(config.ai.provider_type, AiProviderType::Gemini);
        assert!(!config.ai.is_configured());
    }

    #[test]
    fn fallback_summary_default() {
        let config = CallConfig::default();
        assert_eq!(config.fallback_summary, "Consultation completed successfully.");
    }
}
