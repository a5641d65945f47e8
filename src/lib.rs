//! collabflow: negotiate merchant/influencer collaboration requests.
//!
//! A request is answered exactly once: accepted by signing the collaboration
//! contract, countered with a different commission, or rejected with a reason.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{AcceptPrompter, ListOutcome, ShowOutcome};
pub use app::workflow::{NegotiationAction, NegotiationWorkflow, WorkflowInstanceId};
pub use app::{AppContext, SessionContext};
pub use domain::{AppError, WorkflowEvent, WorkflowOutcome};
