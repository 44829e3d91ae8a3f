use std::{fmt, time::Duration};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("server unreachable")]
    CommunicationError,
    #[error("access token rejected by the inference provider")]
    Unauthorized,
    #[error("rate limit reached, try again later")]
    RateLimited,
    #[error(
        "the model might be loading, try again in {} seconds",
        retry_after_secs(.estimated_time)
    )]
    ModelLoading { estimated_time: Option<f64> },
    #[error("invalid request: {0}")]
    RequestError(String),
    #[error("internal server error")]
    InternalServerError,
    #[error("incorrect server response")]
    ResponseError,
}

fn retry_after_secs(estimated_time: &Option<f64>) -> u64 {
    estimated_time
        .filter(|t| t.is_finite() && *t > 0.0)
        .map(|t| t.ceil() as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

type Result<T> = std::result::Result<T, Error>;

/// Redacted in `Debug`, no `Display`.
#[derive(Clone, PartialEq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_owned();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub return_full_text: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 800,
            temperature: 0.7,
            return_full_text: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            parameters: GenerationParameters::default(),
        }
    }
}

#[derive(Serialize)]
struct TextGenerationBody<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    estimated_time: Option<f64>,
}

fn parse_generated_text(body: &str) -> Result<String> {
    let response: TextGenerationResponse =
        serde_json::from_str(body).map_err(|_| Error::ResponseError)?;
    let text = match response {
        TextGenerationResponse::Batch(batch) => batch.into_iter().next(),
        TextGenerationResponse::Single(single) => Some(single),
    }
    .map(|generated| generated.generated_text)
    .ok_or(Error::ResponseError)?;

    let text = text.trim();
    if text.is_empty() {
        Err(Error::ResponseError)
    } else {
        Ok(text.to_owned())
    }
}

fn error_from_response(status: StatusCode, body: &str) -> Error {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let estimated_time = parsed.as_ref().and_then(|b| b.estimated_time);
    let message = parsed
        .and_then(|b| b.error)
        .map(|error| match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
        StatusCode::SERVICE_UNAVAILABLE => Error::ModelLoading { estimated_time },
        s if s.is_client_error() => Error::RequestError(message),
        _ => Error::InternalServerError,
    }
}

#[mockall::automock]
#[async_trait]
pub trait Client: Send + Sync {
    async fn generate(&self, token: &Token, request: &GenerationRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct ClientImpl {
    base_url: String,
    client: reqwest::Client,
}

impl ClientImpl {
    fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|_| Error::CommunicationError)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }
}

pub fn create(config: Config) -> Result<impl Client> {
    ClientImpl::new(config)
}

#[async_trait]
impl Client for ClientImpl {
    async fn generate(&self, token: &Token, request: &GenerationRequest) -> Result<String> {
        let url = self.endpoint(&request.model);
        debug!("Requesting text generation from {}", url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token.expose())
            .json(&TextGenerationBody {
                inputs: &request.prompt,
                parameters: &request.parameters,
            })
            .send()
            .await
            .map_err(|_| Error::CommunicationError)?;

        let status = resp.status();
        let body = resp.text().await.map_err(|_| Error::ResponseError)?;
        if !status.is_success() {
            let error = error_from_response(status, &body);
            warn!("Text generation with {} failed: {}", request.model, error);
            return Err(error);
        }

        parse_generated_text(&body)
    }
}
