//! Fallback completion client, used when no rule matches and the cache misses.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scope restriction sent with every request. The assistant must stay on
/// technical/business topics and never invent pricing or timelines.
const SYSTEM_PROMPT: &str = "You are a strict assistant for a freelance web developer. \
Only answer concrete questions about web development, software engineering, or freelancing in tech. \
Never speculate about pricing, timelines, or estimates that are not present in the user's own message. \
If a question is outside that scope, respond with an empty string (i.e. do not output any text) or just keep quiet.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum CompletionError {
    Http(String),
    Api(String),
    Parse(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api(e) => write!(f, "API error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for CompletionError {}

/// The fallback seam. An empty reply means "say nothing".
pub trait CompletionProvider: Send + Sync {
    fn complete(&self, body: &str) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the Hugging Face router's OpenAI-style chat completion API.
pub struct HfClient {
    api_key: String,
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl HfClient {
    pub fn new(api_key: String, endpoint: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { api_key, endpoint, model, http }
    }
}

impl CompletionProvider for HfClient {
    async fn complete(&self, body: &str) -> Result<String, CompletionError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: 512,
            messages: vec![
                ApiMessage { role: "system", content: SYSTEM_PROMPT },
                ApiMessage { role: "user", content: body },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        // The provider may answer in several partial pieces; treat the
        // concatenation as the unit.
        let raw: String = api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect();

        Ok(normalize_reply(&raw))
    }
}

/// Trim the provider's answer and map a literal "I don't know" (any case,
/// straight or curly apostrophe) to the empty string, meaning no answer.
fn normalize_reply(raw: &str) -> String {
    let trimmed = raw.trim();
    let plain = trimmed.replace('\u{2019}', "'");
    if plain.eq_ignore_ascii_case("i don't know") {
        return String::new();
    }
    trimmed.to_string()
}
