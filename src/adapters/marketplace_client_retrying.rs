//! Retry wrapper for request lookups.
//!
//! Transitions and signatures mutate a shared negotiation resource and pass
//! straight through. Contract terms are fetched once per signing flow; a failed
//! fetch ends that flow and the user reopens it.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::{
    ApiConfig, AppError, CollaborationId, CollaborationRecord, CollaborationStatus, Contract,
    SignatureArtifact,
};
use crate::ports::{MarketplaceClient, SignResponse, TransitionResponse};

const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
const RETRY_AFTER_TOKEN: &str = "retry_after_ms=";
const MAX_LOG_ERROR_CHARS: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay_ms: config.retry_delay_ms.max(1),
            max_delay_ms: DEFAULT_MAX_DELAY_MS.max(config.retry_delay_ms),
        }
    }

    fn delay_for_retry(&self, failed_attempt: u32, error: &AppError) -> Duration {
        if let Some(retry_after_ms) = extract_retry_after_ms(error) {
            return Duration::from_millis(retry_after_ms.min(self.max_delay_ms));
        }

        // attempt=1 -> base, attempt=2 -> base*2, attempt=3 -> base*4, capped.
        let exponent = failed_attempt.saturating_sub(1).min(6);
        let multiplier = 1_u64 << exponent;
        let backoff_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        let jitter_ms = compute_jitter_ms(backoff_ms);
        Duration::from_millis(backoff_ms.saturating_add(jitter_ms).min(self.max_delay_ms))
    }
}

pub struct RetryingMarketplaceClient<C: MarketplaceClient> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: MarketplaceClient> RetryingMarketplaceClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn with_retries<T>(
        &self,
        operation: &str,
        call: impl Fn(&C) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut attempt = 1;
        loop {
            match call(&self.inner) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !is_retryable_error(&error) || attempt >= self.policy.max_attempts {
                        return Err(error);
                    }

                    let delay = self.policy.delay_for_retry(attempt, &error);
                    log::warn!(
                        "marketplace {} failed (attempt {}/{}): {}. Retrying in {} ms.",
                        operation,
                        attempt,
                        self.policy.max_attempts,
                        format_error_for_log(&error),
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl<C: MarketplaceClient> MarketplaceClient for RetryingMarketplaceClient<C> {
    fn fetch_request(&self, id: &CollaborationId) -> Result<CollaborationRecord, AppError> {
        self.with_retries("fetch_request", |inner| inner.fetch_request(id))
    }

    fn list_requests(
        &self,
        status: Option<&CollaborationStatus>,
    ) -> Result<Vec<CollaborationRecord>, AppError> {
        self.with_retries("list_requests", |inner| inner.list_requests(status))
    }

    fn reject(&self, id: &CollaborationId, reason: &str) -> Result<TransitionResponse, AppError> {
        self.inner.reject(id, reason)
    }

    fn counter_offer(
        &self,
        id: &CollaborationId,
        counter_commission: f64,
        message: &str,
    ) -> Result<TransitionResponse, AppError> {
        self.inner.counter_offer(id, counter_commission, message)
    }

    fn fetch_contract_terms(&self) -> Result<Contract, AppError> {
        self.inner.fetch_contract_terms()
    }

    fn sign_contract(
        &self,
        id: &CollaborationId,
        signature: &SignatureArtifact,
    ) -> Result<SignResponse, AppError> {
        self.inner.sign_contract(id, signature)
    }
}

fn is_retryable_error(error: &AppError) -> bool {
    match error {
        AppError::Api { message, status } => {
            if status.is_some_and(|code| code == 429 || code == 408 || code >= 500) {
                return true;
            }
            if status.is_some() {
                return false;
            }

            let lower = message.to_ascii_lowercase();
            lower.contains("timeout")
                || lower.contains("timed out")
                || lower.contains("connect")
                || lower.contains("connection")
                || lower.contains("temporary")
        }
        _ => false,
    }
}

fn extract_retry_after_ms(error: &AppError) -> Option<u64> {
    let message = match error {
        AppError::Api { message, .. } => message,
        _ => return None,
    };

    let start = message.find(RETRY_AFTER_TOKEN)? + RETRY_AFTER_TOKEN.len();
    let tail = &message[start..];
    let digits: String = tail.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

fn compute_jitter_ms(backoff_ms: u64) -> u64 {
    let jitter_cap = backoff_ms / 4;
    if jitter_cap == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.subsec_nanos() as u64)
        .unwrap_or(0);

    nanos % jitter_cap
}

fn format_error_for_log(error: &AppError) -> String {
    let text = match error {
        AppError::Api { message, status: Some(code) } => format!("status={}: {}", code, message),
        other => other.to_string(),
    };

    let mut output: String = text
        .chars()
        .take(MAX_LOG_ERROR_CHARS)
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    output = output.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() > MAX_LOG_ERROR_CHARS {
        output.push_str(" [truncated]");
    }
    output
}
