//! Collaboration request data model.
//!
//! `CollaborationRecord` mirrors what the backend sends and tolerates missing
//! fields. `CollaborationRequest` is the validated form the workflow runs on;
//! it can only be built through `TryFrom<CollaborationRecord>`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// Server-assigned identifier of a collaboration request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollaborationId(String);

impl CollaborationId {
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if !is_path_safe_identifier(&value) {
            return Err(AppError::InvalidIdentifier(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CollaborationId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CollaborationId> for String {
    fn from(id: CollaborationId) -> Self {
        id.0
    }
}

impl fmt::Display for CollaborationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers end up in URL paths, so only a conservative alphabet is allowed.
fn is_path_safe_identifier(id: &str) -> bool {
    if id.is_empty() || id == "." || id == ".." {
        return false;
    }
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Lifecycle state of a collaboration request as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CollaborationStatus {
    #[default]
    Pending,
    CounterOffer,
    Rejected,
    Accepted,
    Active,
    /// A state this client does not know about. Kept verbatim.
    Unknown(String),
}

impl CollaborationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CollaborationStatus::Pending => "pending",
            CollaborationStatus::CounterOffer => "counter_offer",
            CollaborationStatus::Rejected => "rejected",
            CollaborationStatus::Accepted => "accepted",
            CollaborationStatus::Active => "active",
            CollaborationStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CollaborationStatus::Pending)
    }
}

impl From<String> for CollaborationStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => CollaborationStatus::Pending,
            "counter_offer" | "counter-offer" | "countered" => CollaborationStatus::CounterOffer,
            "rejected" => CollaborationStatus::Rejected,
            "accepted" => CollaborationStatus::Accepted,
            "active" => CollaborationStatus::Active,
            _ => CollaborationStatus::Unknown(raw),
        }
    }
}

impl From<CollaborationStatus> for String {
    fn from(status: CollaborationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merchant or influencer as embedded in a request payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A party reference. Name and email are presentation copies only.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Party {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().or(self.email.as_deref()).unwrap_or(&self.id)
    }
}

/// Product as embedded in a request payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Product as it looked when the request was created.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

/// Collaboration request exactly as the backend returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub merchant: Option<PartyRecord>,
    #[serde(default)]
    pub influencer: Option<PartyRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub proposed_commission: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<CollaborationStatus>,
    #[serde(default)]
    pub counter_commission: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// A collaboration request with every field the workflow depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct CollaborationRequest {
    pub id: CollaborationId,
    pub merchant: Party,
    pub influencer: Party,
    pub products: Vec<ProductSnapshot>,
    pub proposed_commission: f64,
    pub message: Option<String>,
    pub status: CollaborationStatus,
    pub counter_commission: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<CollaborationRecord> for CollaborationRequest {
    type Error = AppError;

    fn try_from(record: CollaborationRecord) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();

        let id = match record.id.as_deref().map(str::trim).map(CollaborationId::new) {
            Some(Ok(id)) => Some(id),
            _ => {
                missing.push("id".to_string());
                None
            }
        };
        let merchant = party_from(record.merchant, "merchant", &mut missing);
        let influencer = party_from(record.influencer, "influencer", &mut missing);
        if record.products.is_empty() {
            missing.push("products".to_string());
        }
        let products: Vec<ProductSnapshot> = record
            .products
            .into_iter()
            .enumerate()
            .filter_map(|(index, product)| product_from(product, index, &mut missing))
            .collect();
        let proposed_commission = record.proposed_commission.filter(|value| value.is_finite());
        if proposed_commission.is_none() {
            missing.push("proposed_commission".to_string());
        }

        match (id, merchant, influencer, proposed_commission) {
            (Some(id), Some(merchant), Some(influencer), Some(proposed_commission))
                if missing.is_empty() =>
            {
                Ok(Self {
                    id,
                    merchant,
                    influencer,
                    products,
                    proposed_commission,
                    message: record.message.filter(|text| !text.trim().is_empty()),
                    status: record.status.unwrap_or_default(),
                    counter_commission: record.counter_commission,
                    created_at: record.created_at,
                    reviewed_at: record.reviewed_at,
                })
            }
            _ => Err(AppError::DataIntegrity { missing }),
        }
    }
}

fn party_from(record: Option<PartyRecord>, field: &str, missing: &mut Vec<String>) -> Option<Party> {
    let record = record.unwrap_or_default();
    match non_blank(record.id) {
        Some(id) => Some(Party { id, display_name: record.name, email: record.email }),
        None => {
            missing.push(format!("{}.id", field));
            None
        }
    }
}

fn product_from(
    record: ProductRecord,
    index: usize,
    missing: &mut Vec<String>,
) -> Option<ProductSnapshot> {
    let id = non_blank(record.id);
    let name = non_blank(record.name);
    if id.is_none() {
        missing.push(format!("products[{}].id", index));
    }
    if name.is_none() {
        missing.push(format!("products[{}].name", index));
    }
    Some(ProductSnapshot { id: id?, name: name?, image_url: record.image_url, price: record.price })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
