//! Marketplace API client implementation using reqwest.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, HeaderValue, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::domain::configuration::API_TOKEN_ENV;
use crate::domain::{
    ApiConfig, AppError, CollaborationId, CollaborationRecord, CollaborationStatus, Contract,
    SignatureArtifact,
};
use crate::ports::{MarketplaceClient, SignResponse, TransitionResponse};

const DEFAULT_STATUS_MESSAGE: &str = "Marketplace API request failed";
/// Keys under which the backend may wrap a payload.
const ENVELOPE_KEYS: [&str; 4] = ["data", "request", "requests", "collaborations"];

/// HTTP transport for the marketplace API.
///
/// Performs a single request per call. Retries for read-only calls live in
/// `RetryingMarketplaceClient`.
#[derive(Clone)]
pub struct HttpMarketplaceClient {
    api_token: String,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpMarketplaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMarketplaceClient")
            .field("api_url", &self.api_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl HttpMarketplaceClient {
    /// Create a new HTTP client with the given token and configuration.
    pub fn new(api_token: String, config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::api(format!("Failed to create HTTP client: {}", e), None))?;

        Ok(Self { api_token, api_url: with_trailing_slash(&config.api_url), client })
    }

    /// Create from the token environment variable with custom configuration.
    pub fn from_env_with_config(config: &ApiConfig) -> Result<Self, AppError> {
        let api_token = std::env::var(API_TOKEN_ENV)
            .map_err(|_| AppError::EnvironmentVariableMissing(API_TOKEN_ENV.into()))?;

        Self::new(api_token, config)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.api_url.join(path).map_err(|e| {
            AppError::config_error(format!("Invalid endpoint '{}' for {}: {}", path, self.api_url, e))
        })
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> Result<Value, AppError> {
        log::debug!("marketplace {} request", operation);
        let response = request
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| AppError::api(format!("HTTP request failed: {}", e), None))?;

        let status = response.status();
        let retry_after_ms = response.headers().get(RETRY_AFTER).and_then(parse_retry_after_ms);
        let body_text = response.text().unwrap_or_default();
        log::debug!("marketplace {} responded with {}", operation, status);

        if status.is_success() {
            if body_text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body_text).map_err(|e| {
                AppError::api(format!("Failed to parse response: {}", e), Some(status.as_u16()))
            });
        }

        let mut message = extract_error_message(&body_text).unwrap_or_else(|| {
            if !body_text.trim().is_empty() {
                body_text.clone()
            } else if status.as_u16() == 429 {
                "Rate limited".to_string()
            } else if status.is_server_error() {
                "Server error".to_string()
            } else {
                DEFAULT_STATUS_MESSAGE.to_string()
            }
        });

        if let Some(value) = retry_after_ms {
            message.push_str(&format!(" (retry_after_ms={})", value));
        }

        Err(AppError::Api { message, status: Some(status.as_u16()) })
    }

    fn transition(
        &self,
        operation: &str,
        url: Url,
        body: &impl Serialize,
        fallback_status: CollaborationStatus,
    ) -> Result<TransitionResponse, AppError> {
        let value = self.send(operation, self.client.post(url).json(body))?;
        let dto: TransitionDto = decode_optional(operation, value)?;
        Ok(TransitionResponse {
            status: dto.status.unwrap_or(fallback_status),
            counter_commission: dto.counter_commission,
        })
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Serialize)]
struct RejectBody<'a> {
    reason: &'a str,
}

#[derive(Debug, Serialize)]
struct CounterOfferBody<'a> {
    counter_commission: f64,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct SignBody<'a> {
    signature: String,
    signer_name: &'a str,
    signer_role: &'a str,
    contract_version: &'a str,
    signed_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct TransitionDto {
    #[serde(default)]
    status: Option<CollaborationStatus>,
    #[serde(default)]
    counter_commission: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SignDto {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<CollaborationStatus>,
}

/// Strip a single `{"data": ...}`-style wrapper if present.
fn unwrap_envelope(value: Value) -> Value {
    if let Value::Object(map) = &value {
        for key in ENVELOPE_KEYS {
            if let Some(inner) = map.get(key) {
                if inner.is_object() || inner.is_array() {
                    return inner.clone();
                }
            }
        }
    }
    value
}

fn decode<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T, AppError> {
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| AppError::ParseError {
        what: format!("{} response", operation),
        details: e.to_string(),
    })
}

fn decode_optional<T: DeserializeOwned + Default>(
    operation: &str,
    value: Value,
) -> Result<T, AppError> {
    if value.is_null() {
        return Ok(T::default());
    }
    decode(operation, value)
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    ["message", "detail", "error"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(|message| message.as_str()))
        .map(ToOwned::to_owned)
}

fn parse_retry_after_ms(value: &HeaderValue) -> Option<u64> {
    let raw = value.to_str().ok()?.trim();
    let seconds = raw.parse::<u64>().ok()?;
    Some(seconds.saturating_mul(1000))
}

impl MarketplaceClient for HttpMarketplaceClient {
    fn fetch_request(&self, id: &CollaborationId) -> Result<CollaborationRecord, AppError> {
        let url = self.endpoint(&format!("collaborations/{}", id))?;
        let value = self.send("fetch_request", self.client.get(url))?;
        decode("fetch_request", value)
    }

    fn list_requests(
        &self,
        status: Option<&CollaborationStatus>,
    ) -> Result<Vec<CollaborationRecord>, AppError> {
        let mut url = self.endpoint("collaborations")?;
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        let value = self.send("list_requests", self.client.get(url))?;
        decode("list_requests", value)
    }

    fn reject(&self, id: &CollaborationId, reason: &str) -> Result<TransitionResponse, AppError> {
        let url = self.endpoint(&format!("collaborations/{}/reject", id))?;
        self.transition("reject", url, &RejectBody { reason }, CollaborationStatus::Rejected)
    }

    fn counter_offer(
        &self,
        id: &CollaborationId,
        counter_commission: f64,
        message: &str,
    ) -> Result<TransitionResponse, AppError> {
        let url = self.endpoint(&format!("collaborations/{}/counter-offer", id))?;
        let body = CounterOfferBody { counter_commission, message };
        let mut response =
            self.transition("counter_offer", url, &body, CollaborationStatus::CounterOffer)?;
        if response.counter_commission.is_none() {
            response.counter_commission = Some(counter_commission);
        }
        Ok(response)
    }

    fn fetch_contract_terms(&self) -> Result<Contract, AppError> {
        let url = self.endpoint("contracts/terms")?;
        let value = self.send("fetch_contract_terms", self.client.get(url))?;
        decode("fetch_contract_terms", value)
    }

    fn sign_contract(
        &self,
        id: &CollaborationId,
        signature: &SignatureArtifact,
    ) -> Result<SignResponse, AppError> {
        let url = self.endpoint(&format!("collaborations/{}/sign", id))?;
        let body = SignBody {
            signature: signature.encoded(),
            signer_name: signature.signer_name(),
            signer_role: signature.role().as_str(),
            contract_version: signature.contract_version(),
            signed_at: signature.signed_at().to_rfc3339(),
        };
        let value = self.send("sign_contract", self.client.post(url).json(&body))?;
        let dto: SignDto = decode("sign_contract", value)?;
        if !dto.success {
            return Err(AppError::api(
                dto.message.unwrap_or_else(|| "Contract signature was not accepted".to_string()),
                Some(200),
            ));
        }
        Ok(SignResponse { status: dto.status.unwrap_or(CollaborationStatus::Active) })
    }
}
