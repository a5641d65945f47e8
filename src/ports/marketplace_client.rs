//! Marketplace API port definition.

use crate::domain::{
    AppError, CollaborationId, CollaborationRecord, CollaborationStatus, Contract,
    SignatureArtifact,
};

/// Response to a reject or counter-offer transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResponse {
    /// Status the server moved the request to.
    pub status: CollaborationStatus,
    /// Counter commission echoed back by the server, if any.
    pub counter_commission: Option<f64>,
}

/// Response to a contract signature.
#[derive(Debug, Clone, PartialEq)]
pub struct SignResponse {
    pub status: CollaborationStatus,
}

/// Port for the marketplace REST backend.
///
/// `reject`, `counter_offer` and `sign_contract` mutate a shared resource and
/// must be issued at most once per user action.
pub trait MarketplaceClient {
    /// Fetch a single collaboration request.
    fn fetch_request(&self, id: &CollaborationId) -> Result<CollaborationRecord, AppError>;

    /// List collaboration requests visible to the caller, optionally filtered by status.
    fn list_requests(
        &self,
        status: Option<&CollaborationStatus>,
    ) -> Result<Vec<CollaborationRecord>, AppError>;

    /// Reject a request with a reason.
    fn reject(&self, id: &CollaborationId, reason: &str) -> Result<TransitionResponse, AppError>;

    /// Propose a different commission with a justification.
    fn counter_offer(
        &self,
        id: &CollaborationId,
        counter_commission: f64,
        message: &str,
    ) -> Result<TransitionResponse, AppError>;

    /// Fetch the current contract terms.
    fn fetch_contract_terms(&self) -> Result<Contract, AppError>;

    /// Sign the contract for an accepted request.
    fn sign_contract(
        &self,
        id: &CollaborationId,
        signature: &SignatureArtifact,
    ) -> Result<SignResponse, AppError>;
}

impl<T: MarketplaceClient + ?Sized> MarketplaceClient for &T {
    fn fetch_request(&self, id: &CollaborationId) -> Result<CollaborationRecord, AppError> {
        (**self).fetch_request(id)
    }

    fn list_requests(
        &self,
        status: Option<&CollaborationStatus>,
    ) -> Result<Vec<CollaborationRecord>, AppError> {
        (**self).list_requests(status)
    }

    fn reject(&self, id: &CollaborationId, reason: &str) -> Result<TransitionResponse, AppError> {
        (**self).reject(id, reason)
    }

    fn counter_offer(
        &self,
        id: &CollaborationId,
        counter_commission: f64,
        message: &str,
    ) -> Result<TransitionResponse, AppError> {
        (**self).counter_offer(id, counter_commission, message)
    }

    fn fetch_contract_terms(&self) -> Result<Contract, AppError> {
        (**self).fetch_contract_terms()
    }

    fn sign_contract(
        &self,
        id: &CollaborationId,
        signature: &SignatureArtifact,
    ) -> Result<SignResponse, AppError> {
        (**self).sign_contract(id, signature)
    }
}
