use crate::app::AppContext;
use crate::domain::{AppError, CollaborationRequest, CollaborationStatus};
use crate::ports::MarketplaceClient;

#[derive(Debug, Default)]
pub struct ListOutcome {
    pub requests: Vec<CollaborationRequest>,
    /// Records left out because they were missing required fields.
    pub incomplete: Vec<String>,
}

pub fn execute<C: MarketplaceClient>(
    ctx: &AppContext<C>,
    status: Option<&CollaborationStatus>,
) -> Result<ListOutcome, AppError> {
    let mut outcome = ListOutcome::default();
    for record in ctx.client().list_requests(status)? {
        let label = record.id.clone().unwrap_or_else(|| "<unknown>".to_string());
        match CollaborationRequest::try_from(record) {
            Ok(request) => outcome.requests.push(request),
            Err(err) => {
                log::warn!("skipping collaboration {}: {}", label, err);
                outcome.incomplete.push(label);
            }
        }
    }
    Ok(outcome)
}
