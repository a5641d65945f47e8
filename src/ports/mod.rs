mod marketplace_client;

pub use marketplace_client::{MarketplaceClient, SignResponse, TransitionResponse};
