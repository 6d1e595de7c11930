//! # janani-network
//!
//! 외부 생성형 AI API 어댑터 (Gemini `generateContent`, OpenAI 호환).
//! - `Summarizer` 포트: 통화 종료 후 상담 요약
//! - `HealthAdvisor` 포트: 위험도 평가, 증상 분석, 식단, 챗봇

pub mod advisor_client;
mod ai_http;
pub mod ai_summary_client;

pub use advisor_client::RemoteAdvisor;
pub use ai_summary_client::RemoteSummarizer;
