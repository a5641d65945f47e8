//! API Facade for the application.
//!
//! Builds the HTTP-backed context from configuration and the environment, then
//! runs one command against it.

use std::path::Path;

use crate::adapters::config_file::load_config;
use crate::adapters::{HttpMarketplaceClient, RetryPolicy, RetryingMarketplaceClient};
use crate::app::AppContext;
use crate::app::commands::{accept, counter, list, reject, show, terms};
use crate::app::context::SessionContext;
use crate::domain::{CollaborationId, CollaborationStatus, Contract, WorkflowEvent};

pub use crate::app::commands::accept::AcceptPrompter;
pub use crate::app::commands::list::ListOutcome;
pub use crate::app::commands::show::ShowOutcome;
pub use crate::domain::AppError;

type HttpContext = AppContext<RetryingMarketplaceClient<HttpMarketplaceClient>>;

/// Create an `AppContext` using `config_path`, or the default lookup when `None`.
fn create_context(config_path: Option<&Path>) -> Result<HttpContext, AppError> {
    let work_dir = std::env::current_dir()?;
    let config = load_config(config_path, &work_dir)?;

    let http = HttpMarketplaceClient::from_env_with_config(&config.api)?;
    let client = RetryingMarketplaceClient::new(http, RetryPolicy::from_config(&config.api));
    let session = SessionContext::from_config(&config.session)?;
    Ok(AppContext::new(client, session))
}

/// Fetch one collaboration request with its available actions.
pub fn show(config_path: Option<&Path>, id: &str) -> Result<ShowOutcome, AppError> {
    let ctx = create_context(config_path)?;
    show::execute(&ctx, &CollaborationId::new(id)?)
}

/// List collaboration requests, optionally filtered by status.
pub fn list(config_path: Option<&Path>, status: Option<&str>) -> Result<ListOutcome, AppError> {
    let ctx = create_context(config_path)?;
    let status = status.map(|value| CollaborationStatus::from(value.to_string()));
    list::execute(&ctx, status.as_ref())
}

/// Fetch the current contract terms.
pub fn terms(config_path: Option<&Path>) -> Result<Contract, AppError> {
    let ctx = create_context(config_path)?;
    terms::execute(&ctx)
}

/// Submit a counter-offer.
pub fn counter_offer(
    config_path: Option<&Path>,
    id: &str,
    counter_commission: f64,
    message: &str,
) -> Result<WorkflowEvent, AppError> {
    let ctx = create_context(config_path)?;
    counter::execute(&ctx, &CollaborationId::new(id)?, counter_commission, message)
}

/// Reject a request with a reason.
pub fn reject(
    config_path: Option<&Path>,
    id: &str,
    reason: &str,
) -> Result<WorkflowEvent, AppError> {
    let ctx = create_context(config_path)?;
    reject::execute(&ctx, &CollaborationId::new(id)?, reason)
}

/// Accept a request by acknowledging and signing the contract.
pub fn accept<P: AcceptPrompter>(
    config_path: Option<&Path>,
    id: &str,
    prompter: &mut P,
) -> Result<WorkflowEvent, AppError> {
    let ctx = create_context(config_path)?;
    accept::execute(&ctx, &CollaborationId::new(id)?, prompter)
}
