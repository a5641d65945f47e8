use crate::app::AppContext;
use crate::app::workflow::{LegalAction, NegotiationAction, NegotiationPresenter};
use crate::domain::{AppError, CollaborationId, CollaborationRequest};
use crate::ports::MarketplaceClient;

#[derive(Debug)]
pub struct ShowOutcome {
    pub request: CollaborationRequest,
    pub rendered: String,
    pub actions: Vec<NegotiationAction>,
}

/// Fetch a request and describe what can be done with it.
pub fn execute<C: MarketplaceClient>(
    ctx: &AppContext<C>,
    id: &CollaborationId,
) -> Result<ShowOutcome, AppError> {
    let record = ctx.client().fetch_request(id)?;
    let presenter = NegotiationPresenter::new(record)?;
    let actions = presenter
        .legal_actions()
        .into_iter()
        .filter_map(|action| match action {
            LegalAction::Choose(action) => Some(action),
            _ => None,
        })
        .collect();

    Ok(ShowOutcome { rendered: presenter.render(), request: presenter.request().clone(), actions })
}
