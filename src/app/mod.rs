pub mod api;
pub mod cli;
pub mod commands;
pub mod context;
pub mod workflow;

pub use context::{AppContext, SessionContext};
