pub mod config_file;
pub mod marketplace_client_http;
pub mod marketplace_client_retrying;

pub use marketplace_client_http::HttpMarketplaceClient;
pub use marketplace_client_retrying::{RetryPolicy, RetryingMarketplaceClient};
