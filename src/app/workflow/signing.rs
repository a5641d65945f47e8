//! Contract signing state machine gating the accept transition.
//!
//! `LoadingTerms -> TermsReady -> Acknowledged -> Signing -> Signed`, with
//! `Error` terminal for a flow whose terms could not be loaded.

use chrono::{DateTime, Utc};

use crate::domain::{
    Acknowledgement, AppError, Contract, SignatureArtifact, SignerRole, ValidationError,
};
use crate::ports::SignResponse;

#[derive(Debug, Clone, PartialEq)]
pub enum SigningState {
    LoadingTerms,
    TermsReady { contract: Contract },
    Acknowledged { contract: Contract, acknowledgement: Acknowledgement },
    Signing { contract: Contract, acknowledgement: Acknowledgement, artifact: SignatureArtifact },
    Signed,
    Error { message: String },
}

impl SigningState {
    pub fn name(&self) -> &'static str {
        match self {
            SigningState::LoadingTerms => "loading_terms",
            SigningState::TermsReady { .. } => "terms_ready",
            SigningState::Acknowledged { .. } => "acknowledged",
            SigningState::Signing { .. } => "signing",
            SigningState::Signed => "signed",
            SigningState::Error { .. } => "error",
        }
    }
}

#[derive(Debug)]
pub struct ContractSigningFlow {
    state: SigningState,
    signature_text: String,
    inline_error: Option<String>,
}

impl Default for ContractSigningFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractSigningFlow {
    pub fn new() -> Self {
        Self { state: SigningState::LoadingTerms, signature_text: String::new(), inline_error: None }
    }

    pub fn state(&self) -> &SigningState {
        &self.state
    }

    pub fn contract(&self) -> Option<&Contract> {
        match &self.state {
            SigningState::TermsReady { contract }
            | SigningState::Acknowledged { contract, .. }
            | SigningState::Signing { contract, .. } => Some(contract),
            _ => None,
        }
    }

    pub fn signature_text(&self) -> &str {
        &self.signature_text
    }

    pub fn inline_error(&self) -> Option<&str> {
        match &self.state {
            SigningState::Error { message } => Some(message),
            _ => self.inline_error.as_deref(),
        }
    }

    /// Inputs are disabled while a network call is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, SigningState::LoadingTerms | SigningState::Signing { .. })
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.state, SigningState::Signed)
    }

    /// Deliver the result of fetching terms. Ignored outside `LoadingTerms`.
    /// A contract without clauses cannot be acknowledged and ends the flow.
    pub fn terms_loaded(&mut self, result: Result<Contract, &AppError>) {
        if !matches!(self.state, SigningState::LoadingTerms) {
            log::debug!("ignoring terms delivered in state {}", self.state.name());
            return;
        }
        self.state = match result {
            Ok(contract) if contract.terms.is_empty() => SigningState::Error {
                message: format!(
                    "Contract {} has no terms. Close and reopen to try again.",
                    contract.version
                ),
            },
            Ok(contract) => SigningState::TermsReady { contract },
            Err(err) => SigningState::Error {
                message: format!(
                    "Could not load contract terms: {}. Close and reopen to try again.",
                    err.inline_message()
                ),
            },
        };
    }

    /// Tick or untick the single checkbox covering every clause.
    pub fn set_acknowledged(&mut self, acknowledged: bool) -> Result<(), AppError> {
        let state = std::mem::replace(&mut self.state, SigningState::LoadingTerms);
        let next = match (state, acknowledged) {
            (SigningState::TermsReady { contract }, true) => {
                let acknowledgement = contract.acknowledge();
                Ok(SigningState::Acknowledged { contract, acknowledgement })
            }
            (SigningState::Acknowledged { contract, .. }, false) => {
                Ok(SigningState::TermsReady { contract })
            }
            (state @ SigningState::TermsReady { .. }, false)
            | (state @ SigningState::Acknowledged { .. }, true) => Ok(state),
            (state, _) => Err(state),
        };

        match next {
            Ok(state) => {
                self.state = state;
                self.inline_error = None;
                Ok(())
            }
            Err(state) => {
                let name = state.name();
                self.state = state;
                Err(illegal("acknowledge terms", name))
            }
        }
    }

    /// Update the typed signer name. Only available once terms are acknowledged.
    pub fn set_signature_text(&mut self, text: &str) -> Result<(), AppError> {
        if !matches!(self.state, SigningState::Acknowledged { .. }) {
            return Err(illegal("type a signature", self.state.name()));
        }
        self.signature_text = text.to_string();
        self.inline_error = None;
        Ok(())
    }

    pub fn can_sign(&self) -> bool {
        matches!(self.state, SigningState::Acknowledged { .. })
            && !self.signature_text.trim().is_empty()
    }

    /// Build the artifact and enter `Signing`.
    ///
    /// Returns `Ok(None)` if a signature is already in flight.
    pub fn begin_signing(
        &mut self,
        role: SignerRole,
        now: DateTime<Utc>,
    ) -> Result<Option<SignatureArtifact>, AppError> {
        let (contract, acknowledgement) = match &self.state {
            SigningState::Acknowledged { contract, acknowledgement } => {
                (contract.clone(), acknowledgement.clone())
            }
            SigningState::Signing { .. } => return Ok(None),
            SigningState::TermsReady { .. } => {
                return Err(self.reject_input(ValidationError::NotAcknowledged));
            }
            other => return Err(illegal("sign", other.name())),
        };

        let artifact = match SignatureArtifact::new(
            &acknowledgement,
            &self.signature_text,
            role,
            now,
        ) {
            Ok(artifact) => artifact,
            Err(err) => return Err(self.reject_input(err)),
        };

        self.inline_error = None;
        self.state =
            SigningState::Signing { contract, acknowledgement, artifact: artifact.clone() };
        Ok(Some(artifact))
    }

    /// Deliver the sign call's result.
    ///
    /// Returns `Ok(true)` once signed and `Ok(false)` when the result arrives
    /// outside `Signing`. On failure the flow returns to `Acknowledged` with the
    /// typed name kept, and the error is handed back.
    pub fn finish_signing(
        &mut self,
        result: Result<SignResponse, AppError>,
    ) -> Result<bool, AppError> {
        let state = std::mem::replace(&mut self.state, SigningState::LoadingTerms);
        match (state, result) {
            (SigningState::Signing { .. }, Ok(_)) => {
                self.state = SigningState::Signed;
                Ok(true)
            }
            (SigningState::Signing { contract, acknowledgement, .. }, Err(err)) => {
                self.inline_error = Some(err.inline_message());
                self.state = SigningState::Acknowledged { contract, acknowledgement };
                Err(err)
            }
            (state, _) => {
                log::debug!("ignoring signature result in state {}", state.name());
                self.state = state;
                Ok(false)
            }
        }
    }

    fn reject_input(&mut self, err: ValidationError) -> AppError {
        self.inline_error = Some(err.to_string());
        AppError::Validation(err)
    }
}

fn illegal(action: &str, state: &str) -> AppError {
    AppError::IllegalAction {
        action: action.to_string(),
        state: format!("contract signing is {}", state),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::{CollaborationStatus, ContractClause};

    fn contract() -> Contract {
        Contract {
            version: "v1".into(),
            terms: vec![ContractClause { title: "Ethics".into(), body: "Be honest.".into() }],
        }
    }

    fn ready_flow() -> ContractSigningFlow {
        let mut flow = ContractSigningFlow::new();
        flow.terms_loaded(Ok(contract()));
        flow
    }

    fn signed_ok() -> Result<SignResponse, AppError> {
        Ok(SignResponse { status: CollaborationStatus::Active })
    }

    #[test]
    fn terms_failure_is_terminal() {
        let mut flow = ContractSigningFlow::new();
        flow.terms_loaded(Err(&AppError::api("Server error", Some(500))));
        assert_eq!(flow.state().name(), "error");
        assert!(flow.inline_error().unwrap().contains("Close and reopen"));
        assert!(flow.set_acknowledged(true).is_err());
        flow.terms_loaded(Ok(contract()));
        assert_eq!(flow.state().name(), "error");
    }

    #[test]
    fn contract_without_terms_cannot_be_signed() {
        let mut flow = ContractSigningFlow::new();
        flow.terms_loaded(Ok(Contract { version: "v1".into(), terms: Vec::new() }));
        assert_eq!(flow.state().name(), "error");
        assert!(flow.inline_error().unwrap().contains("has no terms"));
        assert!(flow.set_acknowledged(true).is_err());
        assert!(flow.set_signature_text("Jane Doe").is_err());
        assert!(flow.begin_signing(SignerRole::Merchant, Utc::now()).is_err());
    }

    #[test]
    fn terms_payload_without_clauses_is_not_a_contract() {
        assert!(serde_json::from_str::<Contract>(r#"{"version":"v1"}"#).is_err());
    }

    #[test]
    fn signing_without_acknowledgement_is_refused() {
        let mut flow = ready_flow();
        assert!(flow.set_signature_text("Jane Doe").is_err());
        assert!(!flow.can_sign());
        let err = flow.begin_signing(SignerRole::Merchant, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NotAcknowledged)));
    }

    #[test]
    fn acknowledgement_then_name_enables_signing() {
        let mut flow = ready_flow();
        flow.set_acknowledged(true).unwrap();
        assert!(!flow.can_sign());
        flow.set_signature_text("Jane Doe").unwrap();
        assert!(flow.can_sign());

        let artifact = flow.begin_signing(SignerRole::Merchant, Utc::now()).unwrap().unwrap();
        assert_eq!(artifact.signer_name(), "Jane Doe");
        assert!(flow.is_busy());
        assert!(flow.begin_signing(SignerRole::Merchant, Utc::now()).unwrap().is_none());
        assert!(flow.set_acknowledged(false).is_err());

        assert!(flow.finish_signing(signed_ok()).unwrap());
        assert!(flow.is_signed());
    }

    #[test]
    fn signed_is_not_reenterable() {
        let mut flow = ready_flow();
        flow.set_acknowledged(true).unwrap();
        flow.set_signature_text("Jane Doe").unwrap();
        flow.begin_signing(SignerRole::Influencer, Utc::now()).unwrap();
        flow.finish_signing(signed_ok()).unwrap();

        assert!(flow.begin_signing(SignerRole::Influencer, Utc::now()).is_err());
        assert!(!flow.finish_signing(signed_ok()).unwrap());
        assert!(flow.is_signed());
    }

    #[test]
    fn failed_signature_keeps_typed_name() {
        let mut flow = ready_flow();
        flow.set_acknowledged(true).unwrap();
        flow.set_signature_text("Jane Doe").unwrap();
        flow.begin_signing(SignerRole::Merchant, Utc::now()).unwrap();

        assert!(flow.finish_signing(Err(AppError::api("", Some(500)))).is_err());
        assert_eq!(flow.state().name(), "acknowledged");
        assert_eq!(flow.signature_text(), "Jane Doe");
        assert!(flow.inline_error().is_some());
        assert!(flow.can_sign());
    }

    #[test]
    fn unticking_acknowledgement_disables_signing() {
        let mut flow = ready_flow();
        flow.set_acknowledged(true).unwrap();
        flow.set_signature_text("Jane Doe").unwrap();
        flow.set_acknowledged(false).unwrap();
        assert!(!flow.can_sign());
        assert!(flow.begin_signing(SignerRole::Merchant, Utc::now()).is_err());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Acknowledge(bool),
        Type(String),
        Sign,
        Resolve(bool),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            any::<bool>().prop_map(Step::Acknowledge),
            prop_oneof![Just(String::new()), Just("  ".to_string()), "[A-Za-z ]{1,12}"]
                .prop_map(Step::Type),
            Just(Step::Sign),
            any::<bool>().prop_map(Step::Resolve),
        ]
    }

    proptest! {
        #[test]
        fn signing_requires_acknowledgement_and_name(steps in prop::collection::vec(step_strategy(), 0..24)) {
            let mut flow = ready_flow();
            for step in steps {
                match step {
                    Step::Acknowledge(value) => { let _ = flow.set_acknowledged(value); }
                    Step::Type(text) => { let _ = flow.set_signature_text(&text); }
                    Step::Sign => {
                        let acknowledged = matches!(flow.state(), SigningState::Acknowledged { .. });
                        let named = !flow.signature_text().trim().is_empty();
                        if let Ok(Some(_)) = flow.begin_signing(SignerRole::Merchant, Utc::now()) {
                            prop_assert!(acknowledged && named);
                        }
                    }
                    Step::Resolve(ok) => {
                        let result = if ok { signed_ok() } else { Err(AppError::api("boom", Some(500))) };
                        let _ = flow.finish_signing(result);
                    }
                }
                if let SigningState::Signing { artifact, .. } = flow.state() {
                    prop_assert!(!artifact.signer_name().is_empty());
                }
            }
        }
    }
}
