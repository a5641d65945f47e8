pub mod accept;
pub mod counter;
pub mod list;
pub mod reject;
pub mod show;
pub mod terms;

use std::sync::mpsc::Receiver;

use crate::app::AppContext;
use crate::app::workflow::{NegotiationWorkflow, outcome_channel};
use crate::domain::{AppError, CollaborationId, WorkflowEvent};
use crate::ports::MarketplaceClient;

/// Fetch `id` and open a workflow on it, acting as the workflow's host.
pub(crate) fn open_workflow<'a, C: MarketplaceClient>(
    ctx: &'a AppContext<C>,
    id: &CollaborationId,
) -> Result<(NegotiationWorkflow<&'a C>, Receiver<WorkflowEvent>), AppError> {
    let record = ctx.client().fetch_request(id)?;
    let (emitter, receiver) = outcome_channel();
    let workflow = NegotiationWorkflow::open(ctx.session().clone(), ctx.client(), record, emitter)?;
    Ok((workflow, receiver))
}

/// Close the workflow and collect the one event it reported.
pub(crate) fn close_workflow<C: MarketplaceClient>(
    workflow: NegotiationWorkflow<C>,
    receiver: Receiver<WorkflowEvent>,
) -> Result<WorkflowEvent, AppError> {
    drop(workflow);
    receiver.try_recv().map_err(|_| AppError::IllegalAction {
        action: "report an outcome".to_string(),
        state: "the workflow closed without one".to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::app::AppContext;
    use crate::app::context::SessionContext;
    use crate::domain::SignerRole;
    use crate::testing::{CollaborationRecordBuilder, FakeMarketplaceClient};

    pub fn context(role: SignerRole) -> (AppContext<FakeMarketplaceClient>, FakeMarketplaceClient) {
        let fake = FakeMarketplaceClient::with_default_contract();
        fake.add_record(CollaborationRecordBuilder::pending("req-1").build());
        let ctx = AppContext::new(fake.clone(), SessionContext::new(role, None));
        (ctx, fake)
    }
}
