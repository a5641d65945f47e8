//! Negotiation workflow for a single collaboration request.
//!
//! A workflow instance presents one request, lets the user pick exactly one
//! response, and reports exactly one terminal `WorkflowOutcome` to its host.
//!
//! Every network-bound step is split into `begin_*` (validate, mark busy, hand
//! back a pending ticket) and `resolve_*` (deliver the server's answer). Hosts
//! with an event loop drive the halves separately; the blocking helpers
//! (`submit`, `start_signing`, `sign`) run both back to back. Tickets carry the
//! workflow's instance id, and answers for a closed or different instance are
//! dropped.

pub mod dispatcher;
pub mod presenter;
pub mod propagation;
pub mod signing;

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::app::context::SessionContext;
use crate::domain::{
    AppError, CollaborationRecord, CollaborationRequest, Contract, SignatureArtifact, WorkflowOutcome,
};
use crate::ports::{MarketplaceClient, SignResponse, TransitionResponse};

pub use dispatcher::{ActionDispatcher, TransitionKind};
pub use presenter::{
    CounterDraft, LegalAction, NegotiationAction, NegotiationPresenter, RejectDraft, Selection,
};
pub use propagation::{OutcomeEmitter, outcome_channel};
pub use signing::{ContractSigningFlow, SigningState};

/// Identity of one workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkflowInstanceId(Uuid);

impl WorkflowInstanceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WorkflowInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated reject or counter-offer waiting for the server.
#[derive(Debug)]
pub struct PendingTransition {
    instance: WorkflowInstanceId,
    kind: TransitionKind,
}

impl PendingTransition {
    pub fn instance(&self) -> WorkflowInstanceId {
        self.instance
    }

    pub fn kind(&self) -> &TransitionKind {
        &self.kind
    }
}

/// A contract terms fetch waiting for the server.
#[derive(Debug)]
pub struct PendingTerms {
    instance: WorkflowInstanceId,
}

impl PendingTerms {
    pub fn instance(&self) -> WorkflowInstanceId {
        self.instance
    }
}

/// A signature waiting for the server.
#[derive(Debug)]
pub struct PendingSignature {
    instance: WorkflowInstanceId,
    artifact: SignatureArtifact,
}

impl PendingSignature {
    pub fn instance(&self) -> WorkflowInstanceId {
        self.instance
    }

    pub fn artifact(&self) -> &SignatureArtifact {
        &self.artifact
    }
}

pub struct NegotiationWorkflow<C: MarketplaceClient> {
    instance: WorkflowInstanceId,
    session: SessionContext,
    client: C,
    presenter: NegotiationPresenter,
    dispatcher: ActionDispatcher,
    signing: Option<ContractSigningFlow>,
    emitter: OutcomeEmitter,
    finished: bool,
}

impl<C: MarketplaceClient> NegotiationWorkflow<C> {
    /// Open a workflow for `record`. Incomplete records are refused with
    /// `AppError::DataIntegrity` and no workflow is created.
    pub fn open(
        session: SessionContext,
        client: C,
        record: CollaborationRecord,
        emitter: OutcomeEmitter,
    ) -> Result<Self, AppError> {
        let presenter = NegotiationPresenter::new(record)?;
        let instance = WorkflowInstanceId::new();
        log::info!(
            "workflow {} opened for {} as {} ({})",
            instance,
            presenter.request().id,
            session.role(),
            session.actor_id().unwrap_or("anonymous")
        );
        Ok(Self {
            instance,
            session,
            client,
            presenter,
            dispatcher: ActionDispatcher::new(),
            signing: None,
            emitter,
            finished: false,
        })
    }

    pub fn instance_id(&self) -> WorkflowInstanceId {
        self.instance
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn request(&self) -> &CollaborationRequest {
        self.presenter.request()
    }

    pub fn presenter(&self) -> &NegotiationPresenter {
        &self.presenter
    }

    pub fn selection(&self) -> &Selection {
        self.presenter.selection()
    }

    pub fn signing(&self) -> Option<&ContractSigningFlow> {
        self.signing.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn outcome(&self) -> Option<&WorkflowOutcome> {
        self.emitter.emitted()
    }

    /// True while a network call started by this workflow is outstanding.
    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_in_flight() || self.signing.as_ref().is_some_and(|f| f.is_busy())
    }

    /// Error to show next to the control that triggered it.
    pub fn inline_error(&self) -> Option<&str> {
        match (self.presenter.selection(), &self.signing) {
            (Selection::Accepting, Some(flow)) => flow.inline_error(),
            _ => self.dispatcher.inline_error(),
        }
    }

    pub fn legal_actions(&self) -> Vec<LegalAction> {
        if self.finished || self.is_busy() {
            return Vec::new();
        }
        self.presenter.legal_actions()
    }

    pub fn select(&mut self, action: NegotiationAction) -> Result<(), AppError> {
        self.ensure_idle("select an action")?;
        self.presenter.select(action)?;
        self.dispatcher.clear();
        Ok(())
    }

    /// Close the open form, discarding its draft and any contract flow.
    pub fn back_to_selection(&mut self) -> Result<(), AppError> {
        self.ensure_idle("go back")?;
        self.presenter.back_to_selection()?;
        self.signing = None;
        self.dispatcher.clear();
        Ok(())
    }

    pub fn set_counter_commission(&mut self, value: f64) -> Result<(), AppError> {
        self.ensure_idle("edit the counter-offer")?;
        let state = self.presenter.state_description();
        match self.presenter.selection_mut() {
            Selection::CounteringWith(draft) => {
                draft.counter_commission = Some(value);
                Ok(())
            }
            _ => Err(illegal("edit the counter-offer", state)),
        }
    }

    pub fn set_counter_message(&mut self, text: &str) -> Result<(), AppError> {
        self.ensure_idle("edit the justification")?;
        let state = self.presenter.state_description();
        match self.presenter.selection_mut() {
            Selection::CounteringWith(draft) => {
                draft.message = text.to_string();
                Ok(())
            }
            _ => Err(illegal("edit the justification", state)),
        }
    }

    pub fn set_reject_reason(&mut self, text: &str) -> Result<(), AppError> {
        self.ensure_idle("edit the reason")?;
        let state = self.presenter.state_description();
        match self.presenter.selection_mut() {
            Selection::RejectingWith(draft) => {
                draft.reason = text.to_string();
                Ok(())
            }
            _ => Err(illegal("edit the reason", state)),
        }
    }

    // -------------------------------------------------------------------------
    // Reject / counter-offer
    // -------------------------------------------------------------------------

    /// Validate the open form and mark it in flight.
    ///
    /// Returns `Ok(None)` if a submission is already in flight.
    pub fn begin_transition(&mut self) -> Result<Option<PendingTransition>, AppError> {
        self.ensure_open()?;
        let kind = self.dispatcher.begin(self.presenter.selection())?;
        Ok(kind.map(|kind| PendingTransition { instance: self.instance, kind }))
    }

    /// Deliver the server's answer to a transition.
    ///
    /// On success the outcome is emitted and returned. On failure the error is
    /// kept inline, the draft is left untouched, and the error is returned.
    pub fn resolve_transition(
        &mut self,
        pending: PendingTransition,
        result: Result<TransitionResponse, AppError>,
    ) -> Result<Option<WorkflowOutcome>, AppError> {
        if !self.accepts(pending.instance) {
            return Ok(None);
        }
        let outcome = self.dispatcher.finish(result)?;
        self.finish_with(outcome.clone());
        Ok(Some(outcome))
    }

    /// Validate, send and resolve the open reject or counter-offer form.
    pub fn submit(&mut self) -> Result<Option<WorkflowOutcome>, AppError> {
        let Some(pending) = self.begin_transition()? else {
            return Ok(None);
        };
        let result = pending.kind.send(&self.client, &self.presenter.request().id);
        self.resolve_transition(pending, result)
    }

    /// Open the counter-offer form if needed, fill it and submit.
    pub fn submit_counter_offer(
        &mut self,
        counter_commission: f64,
        message: &str,
    ) -> Result<Option<WorkflowOutcome>, AppError> {
        if self.selection().action() != Some(NegotiationAction::CounterOffer) {
            self.select(NegotiationAction::CounterOffer)?;
        }
        self.set_counter_commission(counter_commission)?;
        self.set_counter_message(message)?;
        self.submit()
    }

    /// Open the rejection form if needed, fill it and submit.
    pub fn submit_reject(&mut self, reason: &str) -> Result<Option<WorkflowOutcome>, AppError> {
        if self.selection().action() != Some(NegotiationAction::Reject) {
            self.select(NegotiationAction::Reject)?;
        }
        self.set_reject_reason(reason)?;
        self.submit()
    }

    // -------------------------------------------------------------------------
    // Accept + contract signing
    // -------------------------------------------------------------------------

    /// Explicit confirmation step for accepting; opens the contract flow.
    ///
    /// A flow that ended in `Error` is replaced by a fresh one.
    pub fn confirm_accept(&mut self) -> Result<PendingTerms, AppError> {
        self.ensure_idle("confirm accept")?;
        if self.presenter.selection() != &Selection::Accepting {
            return Err(illegal("confirm accept", self.presenter.state_description()));
        }
        if let Some(flow) = &self.signing {
            if !matches!(flow.state(), SigningState::Error { .. }) {
                return Err(illegal(
                    "confirm accept",
                    format!("contract signing is {}", flow.state().name()),
                ));
            }
        }
        self.signing = Some(ContractSigningFlow::new());
        log::info!("workflow {} loading contract terms", self.instance);
        Ok(PendingTerms { instance: self.instance })
    }

    pub fn resolve_terms(
        &mut self,
        pending: PendingTerms,
        result: Result<Contract, AppError>,
    ) -> Result<(), AppError> {
        if !self.accepts(pending.instance) {
            return Ok(());
        }
        let Some(flow) = self.signing.as_mut() else {
            return Ok(());
        };
        match result {
            Ok(contract) if contract.terms.is_empty() => {
                let err = AppError::ParseError {
                    what: "contract terms".to_string(),
                    details: format!("contract {} has no clauses", contract.version),
                };
                flow.terms_loaded(Ok(contract));
                Err(err)
            }
            Ok(contract) => {
                flow.terms_loaded(Ok(contract));
                Ok(())
            }
            Err(err) => {
                flow.terms_loaded(Err(&err));
                Err(err)
            }
        }
    }

    /// Confirm accepting and fetch the contract terms.
    pub fn start_signing(&mut self) -> Result<&ContractSigningFlow, AppError> {
        let pending = self.confirm_accept()?;
        let result = self.client.fetch_contract_terms();
        self.resolve_terms(pending, result)?;
        self.signing_flow()
    }

    pub fn acknowledge_terms(&mut self, acknowledged: bool) -> Result<(), AppError> {
        self.ensure_open()?;
        self.signing_flow_mut()?.set_acknowledged(acknowledged)
    }

    pub fn set_signature_text(&mut self, text: &str) -> Result<(), AppError> {
        self.ensure_open()?;
        self.signing_flow_mut()?.set_signature_text(text)
    }

    pub fn can_sign(&self) -> bool {
        !self.finished && self.signing.as_ref().is_some_and(ContractSigningFlow::can_sign)
    }

    /// Build the signature artifact and enter `Signing`.
    ///
    /// Returns `Ok(None)` if a signature is already in flight.
    pub fn begin_signing(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingSignature>, AppError> {
        self.ensure_open()?;
        let role = self.session.role();
        let instance = self.instance;
        let artifact = self.signing_flow_mut()?.begin_signing(role, now)?;
        Ok(artifact.map(|artifact| PendingSignature { instance, artifact }))
    }

    pub fn resolve_signature(
        &mut self,
        pending: PendingSignature,
        result: Result<SignResponse, AppError>,
    ) -> Result<Option<WorkflowOutcome>, AppError> {
        if !self.accepts(pending.instance) {
            return Ok(None);
        }
        if !self.signing_flow_mut()?.finish_signing(result)? {
            return Ok(None);
        }
        self.finish_with(WorkflowOutcome::AcceptedAndSigned);
        Ok(Some(WorkflowOutcome::AcceptedAndSigned))
    }

    /// Sign the acknowledged contract with the typed name.
    pub fn sign(&mut self, now: DateTime<Utc>) -> Result<Option<WorkflowOutcome>, AppError> {
        let Some(pending) = self.begin_signing(now)? else {
            return Ok(None);
        };
        let result = self.client.sign_contract(&self.presenter.request().id, &pending.artifact);
        self.resolve_signature(pending, result)
    }

    // -------------------------------------------------------------------------
    // Closing
    // -------------------------------------------------------------------------

    /// Close without completing a transition. Returns whether `Cancelled` was emitted.
    ///
    /// Anything still in flight is not aborted; its answer is dropped when it arrives.
    pub fn cancel(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finish_with(WorkflowOutcome::Cancelled);
        true
    }

    fn finish_with(&mut self, outcome: WorkflowOutcome) {
        log::info!("workflow {} finished: {}", self.instance, outcome);
        self.emitter.emit(&self.presenter.request().id, outcome);
        self.finished = true;
    }

    fn accepts(&self, instance: WorkflowInstanceId) -> bool {
        if self.finished || instance != self.instance {
            log::debug!(
                "workflow {} dropping stale response for instance {}",
                self.instance,
                instance
            );
            return false;
        }
        true
    }

    fn ensure_open(&self) -> Result<(), AppError> {
        if self.finished {
            return Err(AppError::WorkflowFinished);
        }
        Ok(())
    }

    fn ensure_idle(&self, action: &str) -> Result<(), AppError> {
        self.ensure_open()?;
        if self.is_busy() {
            return Err(illegal(action, "a request is in flight".to_string()));
        }
        Ok(())
    }

    fn signing_flow(&self) -> Result<&ContractSigningFlow, AppError> {
        self.signing
            .as_ref()
            .ok_or_else(|| illegal("sign", "contract signing has not started".to_string()))
    }

    fn signing_flow_mut(&mut self) -> Result<&mut ContractSigningFlow, AppError> {
        self.signing
            .as_mut()
            .ok_or_else(|| illegal("sign", "contract signing has not started".to_string()))
    }
}

impl<C: MarketplaceClient> Drop for NegotiationWorkflow<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn illegal(action: &str, state: String) -> AppError {
    AppError::IllegalAction { action: action.to_string(), state }
}
