use base64::{engine::general_purpose, Engine};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use crate::models::Strategy;

/// Longest upstream body excerpt kept for diagnostics.
const MAX_EXCERPT_CHARS: usize = 1000;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const KEY_QUERY_PARAM: &str = "user_key";

/// Why a single provider attempt was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptFailure {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("HTTP {status} with a non-JSON body: {body}")]
    NotJson { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(String),
}

/// Result of one provider attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Accepted(Value),
    Rejected(AttemptFailure),
}

/// Both request formats were rejected.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider rejected both request formats (binary: {binary}; json: {json})")]
pub struct TransportError {
    pub binary: AttemptFailure,
    pub json: AttemptFailure,
}

impl TransportError {
    /// Upstream diagnostics for operators, one line per attempt.
    pub fn details(&self) -> String {
        format!("binary attempt: {}\njson attempt: {}", self.binary, self.json)
    }
}

/// Calls the vision provider with a raw image body first and falls back to a
/// base64 JSON body. Never more than two requests per call.
pub struct TransportNegotiator {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TransportNegotiator {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            url,
            api_key,
            client,
        })
    }

    pub async fn negotiate(&self, image: &[u8]) -> Result<(Strategy, Value), TransportError> {
        let binary = match self.try_binary(image).await {
            AttemptOutcome::Accepted(body) => {
                log::info!("✅ Provider accepted binary upload");
                return Ok((Strategy::Binary, body));
            }
            AttemptOutcome::Rejected(failure) => failure,
        };

        log::warn!("⚠️ Binary upload rejected ({}), retrying as base64 JSON", binary);

        match self.try_json(image).await {
            AttemptOutcome::Accepted(body) => {
                log::info!("✅ Provider accepted base64 JSON upload");
                Ok((Strategy::Json, body))
            }
            AttemptOutcome::Rejected(json) => {
                log::error!("❌ Provider rejected both upload formats: {}", json);
                Err(TransportError { binary, json })
            }
        }
    }

    async fn try_binary(&self, image: &[u8]) -> AttemptOutcome {
        let url = match self.binary_url() {
            Ok(url) => url,
            Err(e) => {
                return AttemptOutcome::Rejected(AttemptFailure::Transport(format!(
                    "invalid provider URL: {}",
                    e
                )))
            }
        };

        log::debug!("📤 Binary attempt: {} bytes", image.len());

        let result = self
            .client
            .post(url)
            .header("Content-Type", "image/jpeg")
            .body(image.to_vec())
            .send()
            .await;

        read_outcome(result).await
    }

    async fn try_json(&self, image: &[u8]) -> AttemptOutcome {
        let encoded = general_purpose::STANDARD.encode(image);
        log::debug!("📤 JSON attempt: {} base64 chars", encoded.len());

        let mut request = self
            .client
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "image_base64": encoded }));

        // Providers disagree on the header name, so send both.
        if let Some(key) = &self.api_key {
            request = request
                .header("Authorization", format!("Bearer {}", key))
                .header("x-api-key", key.as_str());
        }

        read_outcome(request.send().await).await
    }

    /// Endpoint for the binary attempt, with the key as a query parameter
    /// unless the configured URL already has one.
    fn binary_url(&self) -> Result<Url, String> {
        let mut url = Url::parse(&self.url).map_err(|e| e.to_string())?;
        if let Some(key) = &self.api_key {
            let has_key = url.query_pairs().any(|(k, _)| k == KEY_QUERY_PARAM);
            if !has_key {
                url.query_pairs_mut().append_pair(KEY_QUERY_PARAM, key);
            }
        }
        Ok(url)
    }
}

async fn read_outcome(result: reqwest::Result<reqwest::Response>) -> AttemptOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return AttemptOutcome::Rejected(transport_failure(e)),
    };

    let status = response.status();
    log::debug!("📥 Provider response status: {}", status);

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return AttemptOutcome::Rejected(transport_failure(e)),
    };

    if !status.is_success() {
        return AttemptOutcome::Rejected(AttemptFailure::Status {
            status: status.as_u16(),
            body: excerpt(&text),
        });
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(body) => AttemptOutcome::Accepted(body),
        Err(_) => AttemptOutcome::Rejected(AttemptFailure::NotJson {
            status: status.as_u16(),
            body: excerpt(&text),
        }),
    }
}

/// The binary attempt's URL carries the API key, so it never goes into
/// the error text.
fn transport_failure(e: reqwest::Error) -> AttemptFailure {
    AttemptFailure::Transport(e.without_url().to_string())
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut short: String = text.chars().take(MAX_EXCERPT_CHARS).collect();
    short.push('…');
    short
}
