use crate::core::error::GchatError;
use crate::providers::gemini::types::*;
use crate::providers::{Message, Role, SendMessage};
use crate::session::{GenerationParams, HarmCategory, SafetySettings};
use async_trait::async_trait;

const BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    params: GenerationParams,
    safety: SafetySettings,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        params: GenerationParams,
        safety: SafetySettings,
    ) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key,
            model,
            params,
            safety,
            http: reqwest::Client::new(),
        }
    }

    fn build_payload(&self, history: &[Message], text: &str) -> GeminiRequest {
        let mut contents = Vec::with_capacity(history.len() + 1);
        for message in history {
            let role = match message.role {
                Role::User => "user",
                Role::Model => "model",
                // The API only accepts user/model turns.
                Role::Other => continue,
            };
            contents.push(GeminiContentPart {
                role: role.to_string(),
                parts: vec![GeminiPart {
                    text: message.text.clone(),
                }],
            });
        }
        contents.push(GeminiContentPart {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: text.to_string(),
            }],
        });

        GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                candidate_count: self.params.candidate_count,
                stop_sequences: self.params.stop_sequences.clone(),
                max_output_tokens: self.params.max_output_tokens,
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                // topK of 0 is rejected by the API.
                top_k: self.params.top_k.max(1),
            },
            safety_settings: HarmCategory::ALL
                .iter()
                .map(|category| SafetySettingPart {
                    category: category.api_name(),
                    threshold: self.safety.get(*category).api_name(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl SendMessage for GeminiClient {
    async fn send(&self, history: &[Message], text: &str) -> Result<String, GchatError> {
        let payload = self.build_payload(history, text);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            GchatError::Serialization(format!("Failed to parse Gemini response: {}", e))
        })?;

        if let Some(candidate) = parsed.candidates.first() {
            if let Some(part) = candidate.content.parts.first() {
                return Ok(part.text.clone());
            }
        }

        Err(GchatError::Api("No valid response from Gemini".to_string()))
    }
}
