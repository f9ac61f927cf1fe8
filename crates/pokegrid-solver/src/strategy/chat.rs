//! Chat-completions scoring oracle.
//!
//! Sends the persona as the system message and the candidate list as a JSON
//! array in the user message, asking for a response matching a strict JSON
//! schema: `{"rankings": [{"name": <string>, "score": <number>}, ...]}`.

use std::{env, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{OracleError, RankedCandidate, ScoringOracle};

pub const DEFAULT_ORACLE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ORACLE_URL_ENV: &str = "POKEGRID_ORACLE_URL";
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct ChatOracleConfig {
    pub url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ChatOracleConfig {
    /// Reads the API key and optional endpoint override from the environment.
    pub fn from_env(model: Option<String>) -> Result<Self, OracleError> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(OracleError::MissingCredentials { name: API_KEY_ENV })?;
        let url = env::var(ORACLE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_ORACLE_URL.to_owned());
        Ok(Self {
            url,
            model: model.unwrap_or_else(|| DEFAULT_ORACLE_MODEL.to_owned()),
            api_key,
            timeout: DEFAULT_ORACLE_TIMEOUT,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChatCompletionsOracle {
    client: Client,
    config: ChatOracleConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rankings {
    rankings: Vec<RankedCandidate>,
}

fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "pokemon_rankings",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "rankings": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "score": { "type": "number" }
                            },
                            "required": ["name", "score"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["rankings"],
                "additionalProperties": false
            }
        }
    })
}

/// Extracts the rankings from a chat-completions response body.
fn parse_rankings(body: &[u8]) -> Result<Vec<RankedCandidate>, OracleError> {
    let response: ChatResponse =
        serde_json::from_slice(body).map_err(|source| OracleError::Decode { source })?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(OracleError::EmptyResponse)?;
    let rankings: Rankings =
        serde_json::from_str(&content).map_err(|source| OracleError::Decode { source })?;
    Ok(rankings.rankings)
}

impl ChatCompletionsOracle {
    pub fn new(config: ChatOracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| OracleError::Transport {
                url: config.url.clone(),
                source,
            })?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ScoringOracle for ChatCompletionsOracle {
    fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("model".to_owned(), self.config.model.clone().into());
        params
    }

    async fn score(
        &self,
        instruction: &str,
        candidates: &[String],
    ) -> Result<Vec<RankedCandidate>, OracleError> {
        let url = &self.config.url;
        let user =
            serde_json::to_string(candidates).map_err(|source| OracleError::Decode { source })?;
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            response_format: response_format(),
        };

        debug!(url = %url, model = %self.config.model, count = candidates.len(), "POST");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|source| OracleError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                url: url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| OracleError::Transport {
                url: url.clone(),
                source,
            })?;
        parse_rankings(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rankings() {
        let content = json!({
            "rankings": [{"name": "mew", "score": 0.9}, {"name": "onix", "score": 0.2}]
        });
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": content.to_string()
                }
            }]
        });
        let ranked = parse_rankings(body.to_string().as_bytes()).unwrap();
        assert_eq!(
            ranked,
            vec![RankedCandidate::new("mew", 0.9), RankedCandidate::new("onix", 0.2)]
        );
    }

    #[test]
    fn test_parse_rankings_failures() {
        let empty = json!({ "choices": [] });
        assert!(
            parse_rankings(empty.to_string().as_bytes())
                .unwrap_err()
                .is_empty_response()
        );

        let refusal = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(
            parse_rankings(refusal.to_string().as_bytes())
                .unwrap_err()
                .is_empty_response()
        );

        let garbage = json!({ "choices": [{ "message": { "content": "not json" } }] });
        assert!(
            parse_rankings(garbage.to_string().as_bytes())
                .unwrap_err()
                .is_decode()
        );
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "persona",
                },
                ChatMessage {
                    role: "user",
                    content: "[\"mew\"]",
                },
            ],
            response_format: response_format(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "[\"mew\"]");
        assert_eq!(value["response_format"]["type"], "json_schema");
    }
}
