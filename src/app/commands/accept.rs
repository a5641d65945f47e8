use chrono::Utc;

use crate::app::AppContext;
use crate::app::commands::{close_workflow, open_workflow};
use crate::app::workflow::NegotiationAction;
use crate::domain::{AppError, CollaborationId, CollaborationRequest, Contract, WorkflowEvent};
use crate::ports::MarketplaceClient;

/// User interaction needed while accepting. Returning `false`/`None` cancels.
pub trait AcceptPrompter {
    /// Explicit confirmation before the contract is shown.
    fn confirm_accept(&mut self, request: &CollaborationRequest) -> Result<bool, AppError>;

    /// Acknowledge every clause of `contract`.
    fn acknowledge(&mut self, contract: &Contract) -> Result<bool, AppError>;

    /// The name to sign with.
    fn signature(&mut self) -> Result<Option<String>, AppError>;
}

/// Accept a request by signing the current contract.
///
/// Emits `Cancelled` when the user backs out at any prompt.
pub fn execute<C: MarketplaceClient, P: AcceptPrompter>(
    ctx: &AppContext<C>,
    id: &CollaborationId,
    prompter: &mut P,
) -> Result<WorkflowEvent, AppError> {
    let (mut workflow, receiver) = open_workflow(ctx, id)?;

    workflow.select(NegotiationAction::Accept)?;
    if !prompter.confirm_accept(workflow.request())? {
        workflow.cancel();
        return close_workflow(workflow, receiver);
    }

    let contract = workflow.start_signing()?.contract().cloned().ok_or_else(|| {
        AppError::IllegalAction {
            action: "show terms".to_string(),
            state: "no contract was loaded".to_string(),
        }
    })?;
    if !prompter.acknowledge(&contract)? {
        workflow.cancel();
        return close_workflow(workflow, receiver);
    }
    workflow.acknowledge_terms(true)?;

    let Some(name) = prompter.signature()? else {
        workflow.cancel();
        return close_workflow(workflow, receiver);
    };
    workflow.set_signature_text(&name)?;
    workflow.sign(Utc::now())?;

    close_workflow(workflow, receiver)
}
