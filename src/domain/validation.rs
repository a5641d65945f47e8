//! Client-side input guards.
//!
//! These checks are UX guards only; the backend enforces its own rules.

use std::fmt;

use thiserror::Error;

/// Lowest commission percentage a counter-offer may propose.
pub const MIN_COMMISSION: f64 = 5.0;
/// Highest commission percentage a counter-offer may propose.
pub const MAX_COMMISSION: f64 = 50.0;

/// Free-text inputs that must not be blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Justification attached to a counter-offer.
    Justification,
    /// Reason attached to a rejection.
    Reason,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Justification => write!(f, "justification"),
            MessageKind::Reason => write!(f, "reason"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Commission must be between {min}% and {max}% (got {value})")]
    CommissionOutOfRange { value: f64, min: f64, max: f64 },

    #[error("A {0} is required")]
    EmptyMessage(MessageKind),

    #[error("Type your full name to sign the contract")]
    EmptySignature,

    #[error("You must accept every contract term before signing")]
    NotAcknowledged,
}

/// Accepts `value` iff it is finite and within `[MIN_COMMISSION, MAX_COMMISSION]`.
pub fn validate_commission(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (MIN_COMMISSION..=MAX_COMMISSION).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::CommissionOutOfRange {
            value,
            min: MIN_COMMISSION,
            max: MAX_COMMISSION,
        })
    }
}

/// Rejects empty or whitespace-only text. Returns the trimmed text.
pub fn validate_message(kind: MessageKind, text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage(kind));
    }
    Ok(trimmed.to_string())
}

/// Rejects empty or whitespace-only signer names. Returns the trimmed name.
pub fn validate_signature_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptySignature);
    }
    Ok(trimmed.to_string())
}
