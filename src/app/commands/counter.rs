use crate::app::AppContext;
use crate::app::commands::{close_workflow, open_workflow};
use crate::domain::{AppError, CollaborationId, WorkflowEvent};
use crate::ports::MarketplaceClient;

/// Propose `counter_commission` with a justification.
pub fn execute<C: MarketplaceClient>(
    ctx: &AppContext<C>,
    id: &CollaborationId,
    counter_commission: f64,
    message: &str,
) -> Result<WorkflowEvent, AppError> {
    let (mut workflow, receiver) = open_workflow(ctx, id)?;
    workflow.submit_counter_offer(counter_commission, message)?;
    close_workflow(workflow, receiver)
}
