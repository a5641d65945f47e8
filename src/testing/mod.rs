mod collaboration_builder;
mod fake_marketplace_client;

pub use collaboration_builder::CollaborationRecordBuilder;
pub use fake_marketplace_client::{FakeMarketplaceClient, Operation, RecordedCall};
