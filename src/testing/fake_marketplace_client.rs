use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::domain::{
    AppError, CollaborationId, CollaborationRecord, CollaborationStatus, Contract, ContractClause,
    SignatureArtifact,
};
use crate::ports::{MarketplaceClient, SignResponse, TransitionResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchRequest,
    ListRequests,
    Reject,
    CounterOffer,
    FetchContractTerms,
    SignContract,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    FetchRequest(String),
    ListRequests(Option<String>),
    Reject { id: String, reason: String },
    CounterOffer { id: String, counter_commission: f64, message: String },
    FetchContractTerms,
    SignContract { id: String, signer_name: String, encoded: String },
}

impl RecordedCall {
    fn operation(&self) -> Operation {
        match self {
            RecordedCall::FetchRequest(_) => Operation::FetchRequest,
            RecordedCall::ListRequests(_) => Operation::ListRequests,
            RecordedCall::Reject { .. } => Operation::Reject,
            RecordedCall::CounterOffer { .. } => Operation::CounterOffer,
            RecordedCall::FetchContractTerms => Operation::FetchContractTerms,
            RecordedCall::SignContract { .. } => Operation::SignContract,
        }
    }
}

#[derive(Default)]
struct FakeState {
    records: Vec<CollaborationRecord>,
    contract: Option<Contract>,
    failures: HashMap<Operation, VecDeque<AppError>>,
    calls: Vec<RecordedCall>,
}

/// In-memory marketplace backend that records every call.
#[derive(Clone, Default)]
pub struct FakeMarketplaceClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeMarketplaceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_contract() -> Self {
        let fake = Self::new();
        fake.set_contract(Contract {
            version: "v1".to_string(),
            terms: vec![
                ContractClause {
                    title: "Disclosure".to_string(),
                    body: "Sponsored content is labelled as such.".to_string(),
                },
                ContractClause {
                    title: "Code of conduct".to_string(),
                    body: "No misleading product claims.".to_string(),
                },
            ],
        });
        fake
    }

    pub fn set_contract(&self, contract: Contract) {
        self.state.lock().unwrap().contract = Some(contract);
    }

    pub fn contract(&self) -> Option<Contract> {
        self.state.lock().unwrap().contract.clone()
    }

    pub fn add_record(&self, record: CollaborationRecord) {
        self.state.lock().unwrap().records.push(record);
    }

    /// Make the next call of `operation` fail with `error`. Calls queue up.
    pub fn fail_next(&self, operation: Operation, error: AppError) {
        self.state.lock().unwrap().failures.entry(operation).or_default().push_back(error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|call| call.operation() == operation).count()
    }

    fn record(&self, call: RecordedCall) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let operation = call.operation();
        state.calls.push(call);
        match state.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl MarketplaceClient for FakeMarketplaceClient {
    fn fetch_request(&self, id: &CollaborationId) -> Result<CollaborationRecord, AppError> {
        self.record(RecordedCall::FetchRequest(id.to_string()))?;
        let state = self.state.lock().unwrap();
        state
            .records
            .iter()
            .find(|record| record.id.as_deref() == Some(id.as_str()))
            .cloned()
            .ok_or_else(|| AppError::api("Collaboration request not found", Some(404)))
    }

    fn list_requests(
        &self,
        status: Option<&CollaborationStatus>,
    ) -> Result<Vec<CollaborationRecord>, AppError> {
        self.record(RecordedCall::ListRequests(status.map(|s| s.to_string())))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .filter(|record| status.is_none() || record.status.as_ref() == status)
            .cloned()
            .collect())
    }

    fn reject(&self, id: &CollaborationId, reason: &str) -> Result<TransitionResponse, AppError> {
        self.record(RecordedCall::Reject { id: id.to_string(), reason: reason.to_string() })?;
        Ok(TransitionResponse { status: CollaborationStatus::Rejected, counter_commission: None })
    }

    fn counter_offer(
        &self,
        id: &CollaborationId,
        counter_commission: f64,
        message: &str,
    ) -> Result<TransitionResponse, AppError> {
        self.record(RecordedCall::CounterOffer {
            id: id.to_string(),
            counter_commission,
            message: message.to_string(),
        })?;
        Ok(TransitionResponse {
            status: CollaborationStatus::CounterOffer,
            counter_commission: Some(counter_commission),
        })
    }

    fn fetch_contract_terms(&self) -> Result<Contract, AppError> {
        self.record(RecordedCall::FetchContractTerms)?;
        self.contract().ok_or_else(|| AppError::api("Contract terms unavailable", Some(503)))
    }

    fn sign_contract(
        &self,
        id: &CollaborationId,
        signature: &SignatureArtifact,
    ) -> Result<SignResponse, AppError> {
        self.record(RecordedCall::SignContract {
            id: id.to_string(),
            signer_name: signature.signer_name().to_string(),
            encoded: signature.encoded(),
        })?;
        Ok(SignResponse { status: CollaborationStatus::Active })
    }
}
