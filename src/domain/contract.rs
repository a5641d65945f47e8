//! Contract terms, acknowledgement and the signature artifact.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::validation::{ValidationError, validate_signature_text};

/// One titled clause of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractClause {
    pub title: String,
    pub body: String,
}

/// Versioned contract terms. Fetched fresh for every signing and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub version: String,
    pub terms: Vec<ContractClause>,
}

impl Contract {
    /// Acknowledge the whole term set at once.
    pub fn acknowledge(&self) -> Acknowledgement {
        Acknowledgement { contract_version: self.version.clone(), clause_count: self.terms.len() }
    }
}

/// Proof that every clause of a specific contract version was accepted.
///
/// Only `Contract::acknowledge` produces one, so a partial acknowledgement
/// cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    contract_version: String,
    clause_count: usize,
}

impl Acknowledgement {
    pub fn contract_version(&self) -> &str {
        &self.contract_version
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

/// Which side of the collaboration is signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Merchant,
    Influencer,
}

impl SignerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerRole::Merchant => "merchant",
            SignerRole::Influencer => "influencer",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "merchant" => Some(SignerRole::Merchant),
            "influencer" => Some(SignerRole::Influencer),
            _ => None,
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of who typed their name under which contract version, and when.
///
/// The digest only detects accidental changes to the recorded fields. It is not
/// a digital signature and provides no non-repudiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureArtifact {
    signer_name: String,
    role: SignerRole,
    contract_version: String,
    signed_at: DateTime<Utc>,
    digest: String,
}

impl SignatureArtifact {
    pub fn new(
        acknowledgement: &Acknowledgement,
        signer_name: &str,
        role: SignerRole,
        signed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let signer_name = validate_signature_text(signer_name)?;
        let contract_version = acknowledgement.contract_version().to_string();
        let digest = digest_fields(&signer_name, role, &contract_version, signed_at);
        Ok(Self { signer_name, role, contract_version, signed_at, digest })
    }

    pub fn signer_name(&self) -> &str {
        &self.signer_name
    }

    pub fn role(&self) -> SignerRole {
        self.role
    }

    pub fn contract_version(&self) -> &str {
        &self.contract_version
    }

    pub fn signed_at(&self) -> DateTime<Utc> {
        self.signed_at
    }

    /// Opaque string sent to the backend as the signature.
    pub fn encoded(&self) -> String {
        format!("{}:{}", self.contract_version, self.digest)
    }
}

fn canonical_fields(
    signer_name: &str,
    role: SignerRole,
    contract_version: &str,
    signed_at: DateTime<Utc>,
) -> String {
    format!(
        "{}|{}|{}|{}",
        role.as_str(),
        signer_name,
        contract_version,
        signed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn digest_fields(
    signer_name: &str,
    role: SignerRole,
    contract_version: &str,
    signed_at: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_fields(signer_name, role, contract_version, signed_at).as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn contract() -> Contract {
        Contract {
            version: "v1".into(),
            terms: vec![
                ContractClause { title: "Disclosure".into(), body: "Label sponsored posts.".into() },
                ContractClause { title: "Conduct".into(), body: "No misleading claims.".into() },
            ],
        }
    }

    #[test]
    fn acknowledgement_covers_every_clause() {
        let ack = contract().acknowledge();
        assert_eq!(ack.contract_version(), "v1");
        assert_eq!(ack.clause_count(), 2);
    }

    #[test]
    fn artifact_requires_a_name() {
        let ack = contract().acknowledge();
        let err = SignatureArtifact::new(&ack, "  ", SignerRole::Merchant, Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::EmptySignature);
    }

    #[test]
    fn artifact_is_stable_for_identical_inputs() {
        let ack = contract().acknowledge();
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let a = SignatureArtifact::new(&ack, "Jane Doe", SignerRole::Merchant, at).unwrap();
        let b = SignatureArtifact::new(&ack, " Jane Doe ", SignerRole::Merchant, at).unwrap();
        assert_eq!(a.encoded(), b.encoded());
        assert!(a.encoded().starts_with("v1:"));
        assert_eq!(a.encoded().len(), "v1:".len() + 64);
    }

    #[test]
    fn artifact_changes_with_role() {
        let ack = contract().acknowledge();
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let merchant = SignatureArtifact::new(&ack, "Jane Doe", SignerRole::Merchant, at).unwrap();
        let influencer =
            SignatureArtifact::new(&ack, "Jane Doe", SignerRole::Influencer, at).unwrap();
        assert_ne!(merchant.encoded(), influencer.encoded());
    }
}
