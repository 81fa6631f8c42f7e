//! Client for the generative-language commentary endpoint.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::persona::PersonaScope;
use crate::types::{CommentaryError, CommentarySet, WeatherBrief};

const GENERATIVE_API_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct CommentaryClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CommentaryClient {
    pub fn new(api_key: Option<String>, model: &str) -> Result<Self, CommentaryError> {
        Self::new_with_base_url(api_key, model, GENERATIVE_API_URL)
    }

    /// Client pointed at a custom base URL (used by tests against a mock server).
    pub fn new_with_base_url(
        api_key: Option<String>,
        model: &str,
        base_url: &str,
    ) -> Result<Self, CommentaryError> {
        let api_key = api_key.ok_or(CommentaryError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    /// Generate persona commentary for a weather brief.
    ///
    /// The model is instructed to answer with a bare JSON object mapping
    /// persona keys to commentary. Code fences around the object are
    /// tolerated; anything else is `CommentaryError::InvalidResponse`.
    pub async fn generate(
        &self,
        brief: &WeatherBrief,
        language: &str,
        scope: PersonaScope,
    ) -> Result<CommentarySet, CommentaryError> {
        let prompt = Self::build_prompt(brief, language, scope);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CommentaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let text = Self::extract_text(&body).ok_or(CommentaryError::EmptyResponse)?;

        Self::parse_commentary(&text)
    }

    fn extract_text(body: &serde_json::Value) -> Option<String> {
        let parts = body
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Strip markdown code-fence markers the model sometimes wraps the
    /// object in, then require strict JSON.
    fn parse_commentary(text: &str) -> Result<CommentarySet, CommentaryError> {
        let stripped = text.replace("```json", "").replace("```", "");
        let stripped = stripped.trim();

        serde_json::from_str(stripped).map_err(|e| {
            tracing::error!("Commentary JSON parse failed: {}; raw text: {}", e, text);
            CommentaryError::InvalidResponse {
                raw: text.to_string(),
            }
        })
    }

    fn build_prompt(brief: &WeatherBrief, language: &str, scope: PersonaScope) -> String {
        let personas = scope.personas();

        let mut prompt = String::new();
        prompt.push_str(
            "Take on the personalities below and write a funny, in-character \
             comment on the current weather and the outlook for the next days.\n\n",
        );
        prompt.push_str(&format!("LANGUAGE: \"{language}\"\n"));
        prompt.push_str("CONTEXT:\n");

        if !brief.timeline.is_empty() {
            let curve = brief
                .timeline
                .iter()
                .map(|(label, temp)| format!("{label}: {temp}°C"))
                .collect::<Vec<_>>()
                .join(", ");
            prompt.push_str(&format!("Today's curve: {curve}.\n"));
        }
        prompt.push_str(&format!(
            "Now: {}, {}°C (feels like {}°C), humidity {}%, wind {} km/h, {}.\n",
            brief.description,
            brief.temperature,
            brief.apparent_temperature,
            brief.humidity,
            brief.wind_speed,
            if brief.is_day { "daytime" } else { "nighttime" }
        ));
        if let Some(tomorrow) = &brief.tomorrow {
            prompt.push_str(&format!(
                "Tomorrow: {}, up to {}°C.\n",
                tomorrow.description, tomorrow.max_temp
            ));
        }
        if let Some(after) = &brief.after_tomorrow {
            prompt.push_str(&format!("Day after: {}.\n", after.description));
        }

        prompt.push_str("\nPERSONALITIES:\n");
        for (i, persona) in personas.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}: {}\n",
                i + 1,
                persona.key(),
                persona.instruction()
            ));
        }

        let keys = personas
            .iter()
            .map(|p| format!("\"{}\": \"...\"", p.key()))
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(
            "\nSTRICT RULES:\n\
             - Return ONLY bare JSON, no markdown fences.\n\
             - Format: {{{keys}}}\n\
             - Each text is about 5-7 sentences, at most 500 characters.\n\
             - Be creative and use the full length to paint the character.\n"
        ));

        prompt
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::persona::Persona;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn brief() -> WeatherBrief {
        WeatherBrief {
            description: "Cloudy".to_string(),
            temperature: 21.4,
            apparent_temperature: 20.1,
            humidity: 58,
            wind_speed: 12.3,
            is_day: true,
            timeline: vec![
                ("morning".to_string(), 15.5),
                ("noon".to_string(), 21.0),
                ("evening".to_string(), 18.2),
            ],
            tomorrow: None,
            after_tomorrow: None,
        }
    }

    fn generate_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    fn client(uri: &str) -> CommentaryClient {
        CommentaryClient::new_with_base_url(
            Some("test-key".to_string()),
            "gemma-3-27b-it",
            uri,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_api_key_is_rejected_up_front() {
        let result = CommentaryClient::new(None, "gemma-3-27b-it");
        assert!(matches!(result, Err(CommentaryError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_generate_parses_bare_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
                r#"{"cynic": "Clouds. Of course.", "theory": "They seeded those.", "coach": "RUN THROUGH IT!", "optimist": "Soft light all day!"}"#,
            )))
            .mount(&mock_server)
            .await;

        let set = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::All)
            .await
            .unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set["cynic"].text(), "Clouds. Of course.");
    }

    #[tokio::test]
    async fn test_generate_strips_code_fences() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
                "```json\n{\"cynic\":\"Fenced, naturally.\"}\n```",
            )))
            .mount(&mock_server)
            .await;

        let set = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::Single(Persona::Cynic))
            .await
            .unwrap();

        assert_eq!(set["cynic"].text(), "Fenced, naturally.");
    }

    #[tokio::test]
    async fn test_generate_truncated_json_is_typed_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
                "{\"cynic\": \"cut off mid-",
            )))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::All)
            .await;

        match result {
            Err(CommentaryError::InvalidResponse { raw }) => {
                assert!(raw.contains("cut off mid-"));
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_styled_entries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
                r#"{"optimist": {"text": "What a glow!", "outfit": "sunhat"}}"#,
            )))
            .mount(&mock_server)
            .await;

        let set = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::Single(Persona::Optimist))
            .await
            .unwrap();

        assert_eq!(set["optimist"].outfit(), Some("sunhat"));
    }

    #[tokio::test]
    async fn test_generate_api_error_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::All)
            .await;

        assert!(matches!(
            result,
            Err(CommentaryError::Api { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-3-27b-it:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri())
            .generate(&brief(), "en", PersonaScope::All)
            .await;

        assert!(matches!(result, Err(CommentaryError::EmptyResponse)));
    }

    #[test]
    fn test_prompt_mentions_scope_keys_only() {
        let prompt = CommentaryClient::build_prompt(
            &brief(),
            "sk",
            PersonaScope::Single(Persona::Coach),
        );
        assert!(prompt.contains("coach"));
        assert!(!prompt.contains("optimist"));
        assert!(prompt.contains("LANGUAGE: \"sk\""));
        assert!(prompt.contains("morning: 15.5°C"));
    }
}
