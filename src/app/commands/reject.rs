use crate::app::AppContext;
use crate::app::commands::{close_workflow, open_workflow};
use crate::domain::{AppError, CollaborationId, WorkflowEvent};
use crate::ports::MarketplaceClient;

pub fn execute<C: MarketplaceClient>(
    ctx: &AppContext<C>,
    id: &CollaborationId,
    reason: &str,
) -> Result<WorkflowEvent, AppError> {
    let (mut workflow, receiver) = open_workflow(ctx, id)?;
    workflow.submit_reject(reason)?;
    close_workflow(workflow, receiver)
}
