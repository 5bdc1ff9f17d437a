//! Natural-language filter extraction.
//!
//! Turns a free-text question ("ros robots that can carry 50kg") into the
//! structured [`RobotSearchQuery`] the catalog search understands, by asking
//! an OpenAI-compatible chat completion endpoint for a constrained JSON
//! object. The extractor sits behind a trait so tests and alternative
//! backends can swap in their own implementation.

use crate::api::models::robots::RobotSearchQuery;
use crate::config::LlmConfig;
use crate::errors::{Error, Result};
use async_openai::types::chat::CreateChatCompletionResponse;
use reqwest::Client;
use serde_json::json;
use tracing::{instrument, warn};

/// Instruction handed to the model alongside every user query.
const SYSTEM_PROMPT: &str = "You are a robot query assistant. Parse the user's natural language query into structured search filters.

Available filters:
- type: \"mobile_manipulator\" | \"mobile_base\" | \"manipulator_arm\"
- min_payload: number (in kg)
- max_payload: number (in kg)
- min_reach: number (in mm)
- max_reach: number (in mm)
- ros_compatible: boolean
- drive_system: string
- min_arm_dof: number (degrees of freedom)
- force_sensor: boolean

Return ONLY a JSON object with the applicable filters. If no specific filters can be extracted, return an empty object {}.
Do not include explanations or markdown formatting.";

/// Extracts structured search filters from a natural-language query.
#[async_trait::async_trait]
pub trait FilterExtractor: Send + Sync {
    async fn extract_filters(&self, query: &str) -> Result<RobotSearchQuery>;
}

/// Filter extractor backed by an OpenAI-compatible chat completions API.
pub struct OpenAiFilterExtractor {
    client: Client,
    config: LlmConfig,
}

impl OpenAiFilterExtractor {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build the chat completion payload with a strict JSON schema so the
    /// model can only answer with the filter object.
    fn build_request_body(&self, query: &str) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": query
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "robot_filters",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "type": { "type": "string" },
                            "min_payload": { "type": "number" },
                            "max_payload": { "type": "number" },
                            "min_reach": { "type": "number" },
                            "max_reach": { "type": "number" },
                            "ros_compatible": { "type": "boolean" },
                            "drive_system": { "type": "string" },
                            "min_arm_dof": { "type": "number" },
                            "force_sensor": { "type": "boolean" }
                        },
                        "additionalProperties": false
                    }
                }
            }
        })
    }
}

/// Parse the model's answer into filters.
///
/// The model is constrained to the filter schema, but a misbehaving or
/// non-conforming backend can still hand back junk. Junk degrades to an
/// unfiltered search rather than an error.
fn parse_filters(content: &str) -> RobotSearchQuery {
    match serde_json::from_str(content) {
        Ok(filters) => filters,
        Err(e) => {
            warn!("Extractor returned unparseable filters, falling back to unfiltered search: {e}");
            RobotSearchQuery::default()
        }
    }
}

#[async_trait::async_trait]
impl FilterExtractor for OpenAiFilterExtractor {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn extract_filters(&self, query: &str) -> Result<RobotSearchQuery> {
        let url = format!("{}/chat/completions", self.config.api_base.as_str().trim_end_matches('/'));

        let mut request = self.client.post(&url).json(&self.build_request_body(query));

        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(|e| Error::ExternalService {
            message: format!("chat completion request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").map(|e| e.to_string()))
                .unwrap_or(body);
            return Err(Error::ExternalService {
                message: format!("chat completion request returned HTTP {status}: {detail}"),
            });
        }

        let completion: CreateChatCompletionResponse = response.json().await.map_err(|e| Error::ExternalService {
            message: format!("failed to decode chat completion response: {e}"),
        })?;

        // Missing content behaves like an empty filter object
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| "{}".to_string());

        Ok(parse_filters(&content))
    }
}
