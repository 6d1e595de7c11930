//! 외부 AI 건강 분석 클라이언트.
//!
//! 위험도 평가, 증상 분류, 식단은 스키마를 지정한 JSON 응답으로 받아 파싱하고
//! 챗봇은 이전 대화를 그대로 이어 보낸 뒤 텍스트 응답을 받는다.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use janani_core::config::AiConfig;
use janani_core::error::CoreError;
use janani_core::i18n::Language;
use janani_core::models::advisor::{ChatTurn, DietDay, RiskAssessment, SymptomAnalysis};
use janani_core::ports::advisor::{
    ChatRequest, DietRequest, HealthAdvisor, RiskRequest, SymptomRequest,
};

use crate::ai_http::{AiHttpClient, ReplyFormat};

/// 챗봇 응답 최대 토큰 (OpenAI 호환)
const CHAT_MAX_TOKENS: u32 = 1024;

/// 식단 일수
const DIET_DAYS: usize = 7;

fn risk_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "riskLevel": {
                "type": "STRING",
                "enum": ["Low Risk", "Moderate Risk", "High Risk", "Critical"]
            },
            "riskScore": { "type": "NUMBER" },
            "potentialConditions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "reasoning": { "type": "STRING" },
            "recommendations": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["riskLevel", "riskScore", "potentialConditions", "reasoning", "recommendations"]
    })
}

fn symptom_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "severity": {
                "type": "STRING",
                "enum": ["Self-Care", "Consult Doctor", "Immediate Emergency"]
            },
            "possibleCauses": { "type": "ARRAY", "items": { "type": "STRING" } },
            "actionRequired": { "type": "STRING" }
        },
        "required": ["severity", "possibleCauses", "actionRequired"]
    })
}

fn diet_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": { "type": "STRING" },
                "breakfast": { "type": "STRING" },
                "lunch": { "type": "STRING" },
                "snack": { "type": "STRING" },
                "dinner": { "type": "STRING" },
                "calories": { "type": "STRING" }
            },
            "required": ["day", "breakfast", "lunch", "snack", "dinner", "calories"]
        }
    })
}

/// 식단 응답: 배열 그대로 또는 `{"days": [...]}` (OpenAI JSON 모드는 객체만 허용)
#[derive(Deserialize)]
#[serde(untagged)]
enum DietReply {
    Days(Vec<DietDay>),
    Wrapped { days: Vec<DietDay> },
}

/// 코드 펜스(```json ... ```)를 벗겨낸 JSON 본문
fn json_payload(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn parse_reply<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, CoreError> {
    serde_json::from_str(json_payload(text))
        .map_err(|e| CoreError::Advisor(format!("{what} 응답 해석 실패: {e}")))
}

fn parse_risk(text: &str) -> Result<RiskAssessment, CoreError> {
    let mut assessment: RiskAssessment = parse_reply(text, "위험도")?;
    assessment.risk_score = assessment.risk_score.clamp(0.0, 100.0);
    Ok(assessment)
}

fn parse_diet(text: &str) -> Result<Vec<DietDay>, CoreError> {
    let days = match parse_reply::<DietReply>(text, "식단")? {
        DietReply::Days(days) | DietReply::Wrapped { days } => days,
    };
    if days.len() != DIET_DAYS {
        debug!(days = days.len(), "식단 일수가 7일이 아님");
    }
    Ok(days)
}

// ============================================================
// RemoteAdvisor
// ============================================================

/// 외부 AI 건강 분석 클라이언트 (Gemini / OpenAI 호환)
#[derive(Debug)]
pub struct RemoteAdvisor {
    client: AiHttpClient,
}

impl RemoteAdvisor {
    /// 새 RemoteAdvisor 생성
    pub fn new(config: &AiConfig) -> Result<Self, CoreError> {
        Ok(Self {
            client: AiHttpClient::new(config)?,
        })
    }

    async fn structured(
        &self,
        language: Language,
        prompt: String,
        schema: Value,
    ) -> Result<String, CoreError> {
        let system = AiHttpClient::system_instruction(language);
        self.client
            .generate(
                &system,
                &[ChatTurn::user(prompt)],
                &ReplyFormat::Json { schema },
                CoreError::Advisor,
            )
            .await
    }
}

#[async_trait]
impl HealthAdvisor for RemoteAdvisor {
    async fn assess_risk(&self, request: &RiskRequest) -> Result<RiskAssessment, CoreError> {
        debug!(model = %self.client.model(), "위험도 평가 요청");
        let text = self
            .structured(request.language, request.prompt(), risk_schema())
            .await?;
        parse_risk(&text)
    }

    async fn check_symptoms(
        &self,
        request: &SymptomRequest,
    ) -> Result<SymptomAnalysis, CoreError> {
        debug!(model = %self.client.model(), "증상 분석 요청");
        let text = self
            .structured(request.language, request.prompt(), symptom_schema())
            .await?;
        parse_reply(&text, "증상")
    }

    async fn diet_plan(&self, request: &DietRequest) -> Result<Vec<DietDay>, CoreError> {
        debug!(model = %self.client.model(), "식단 생성 요청");
        let text = self
            .structured(request.language, request.prompt(), diet_schema())
            .await?;
        parse_diet(&text)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, CoreError> {
        debug!(
            model = %self.client.model(),
            turns = request.history.len(),
            "챗봇 요청"
        );
        let system = AiHttpClient::system_instruction(request.language);
        let mut turns = request.history.clone();
        turns.push(ChatTurn::user(request.message.clone()));
        self.client
            .generate(
                &system,
                &turns,
                &ReplyFormat::Text {
                    max_tokens: CHAT_MAX_TOKENS,
                },
                CoreError::Advisor,
            )
            .await
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
    use janani_core::config::AiProviderType;
    use janani_core::models::advisor::{
        HealthMetrics, HivStatus, RhFactor, RiskLevel, SymptomSeverity,
    };

    fn config(endpoint: String, provider_type: AiProviderType) -> AiConfig {
        AiConfig {
            endpoint,
            api_key: "test-key".to_string(),
            model: None,
            timeout_secs: 5,
            provider_type,
        }
    }

    fn metrics() -> HealthMetrics {
        HealthMetrics {
            systolic_bp: 150.0,
            diastolic_bp: 95.0,
            blood_sugar: 90.0,
            hemoglobin: 10.2,
            weight: 60.0,
            age: 29,
            week_of_pregnancy: 32,
            hiv_status: HivStatus::Negative,
            rh_factor: RhFactor::Positive,
        }
    }

    fn gemini_reply(text: &str) -> String {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
    }

    fn day(name: &str) -> Value {
        json!({
            "day": name, "breakfast": "Poha", "lunch": "Dal rice",
            "snack": "Roasted chana", "dinner": "Palak roti", "calories": "2200 kcal"
        })
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        assert_eq!(json_payload("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(json_payload("  [1] "), "[1]");
    }

    #[test]
    fn risk_score_is_clamped() {
        let text = r#"{"riskLevel":"Critical","riskScore":140,"potentialConditions":["Preeclampsia"],
                       "reasoning":"BP very high.","recommendations":["Go to hospital"]}"#;
        let assessment = parse_risk(text).unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
        assert_eq!(assessment.risk_score, 100.0);
    }

    #[test]
    fn unknown_risk_level_is_advisor_error() {
        let text = r#"{"riskLevel":"Unsure","riskScore":10,"potentialConditions":[],
                       "reasoning":"","recommendations":[]}"#;
        assert!(matches!(parse_risk(text), Err(CoreError::Advisor(_))));
    }

    #[test]
    fn diet_accepts_array_or_wrapped() {
        let array = json!([day("Monday"), day("Tuesday")]).to_string();
        assert_eq!(parse_diet(&array).unwrap().len(), 2);

        let wrapped = json!({ "days": [day("Monday")] }).to_string();
        assert_eq!(parse_diet(&wrapped).unwrap()[0].breakfast, "Poha");
    }

    #[tokio::test]
    async fn assess_risk_against_gemini_server() {
        let mut server = mockito::Server::new_async().await;
        let reply = json!({
            "riskLevel": "High Risk",
            "riskScore": 72,
            "potentialConditions": ["Gestational hypertension"],
            "reasoning": "रक्तचाप अधिक है।",
            "recommendations": ["Check BP daily"]
        })
        .to_string();
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_body(gemini_reply(&reply))
            .create_async()
            .await;

        let endpoint = format!(
            "{}/v1beta/models/gemini-3-flash-preview:generateContent",
            server.url()
        );
        let advisor = RemoteAdvisor::new(&config(endpoint, AiProviderType::Gemini)).unwrap();
        let assessment = advisor
            .assess_risk(&RiskRequest {
                metrics: metrics(),
                history: None,
                language: Language::Hindi,
            })
            .await
            .unwrap();

        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.potential_conditions, vec!["Gestational hypertension"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_symptoms_against_openai_server() {
        let mut server = mockito::Server::new_async().await;
        let reply = json!({
            "severity": "Immediate Emergency",
            "possibleCauses": ["Preeclampsia"],
            "actionRequired": "Go to the nearest hospital now."
        })
        .to_string();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "response_format": { "type": "json_object" }
            })))
            .with_status(200)
            .with_body(json!({ "choices": [{ "message": { "content": reply } }] }).to_string())
            .create_async()
            .await;

        let endpoint = format!("{}/v1/chat/completions", server.url());
        let advisor = RemoteAdvisor::new(&config(endpoint, AiProviderType::OpenAi)).unwrap();
        let analysis = advisor
            .check_symptoms(&SymptomRequest {
                symptoms: "severe headache, blurred vision".to_string(),
                language: Language::English,
            })
            .await
            .unwrap();

        assert_eq!(analysis.severity, SymptomSeverity::Emergency);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn chat_sends_history_then_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .match_body(mockito::Matcher::PartialJson(json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "I feel dizzy" }] },
                    { "role": "model", "parts": [{ "text": "Please sit down." }] },
                    { "role": "user", "parts": [{ "text": "Still dizzy" }] }
                ]
            })))
            .with_status(200)
            .with_body(gemini_reply("Drink water and rest."))
            .create_async()
            .await;

        let endpoint = format!(
            "{}/v1beta/models/gemini-3-flash-preview:generateContent",
            server.url()
        );
        let advisor = RemoteAdvisor::new(&config(endpoint, AiProviderType::Gemini)).unwrap();
        let reply = advisor
            .chat(&ChatRequest {
                history: vec![
                    ChatTurn::user("I feel dizzy"),
                    ChatTurn::model("Please sit down."),
                ],
                message: "Still dizzy".to_string(),
                language: Language::English,
            })
            .await
            .unwrap();

        assert_eq!(reply, "Drink water and rest.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_diet_is_advisor_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .with_status(200)
            .with_body(gemini_reply("Eat well!"))
            .create_async()
            .await;

        let endpoint = format!(
            "{}/v1beta/models/gemini-3-flash-preview:generateContent",
            server.url()
        );
        let advisor = RemoteAdvisor::new(&config(endpoint, AiProviderType::Gemini)).unwrap();
        let result = advisor
            .diet_plan(&DietRequest {
                metrics: metrics(),
                preference: "Vegetarian".to_string(),
                language: Language::English,
            })
            .await;
        assert!(matches!(result, Err(CoreError::Advisor(_))));
    }
}
