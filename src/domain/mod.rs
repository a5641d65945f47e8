pub mod collaboration;
pub mod configuration;
pub mod contract;
pub mod error;
pub mod outcome;
pub mod validation;

pub use collaboration::{
    CollaborationId, CollaborationRecord, CollaborationRequest, CollaborationStatus, Party,
    PartyRecord, ProductRecord, ProductSnapshot,
};
pub use configuration::{ApiConfig, ClientConfig, SessionConfig};
pub use contract::{Acknowledgement, Contract, ContractClause, SignatureArtifact, SignerRole};
pub use error::AppError;
pub use outcome::{StatusUpdate, WorkflowEvent, WorkflowOutcome};
pub use validation::{MAX_COMMISSION, MIN_COMMISSION, MessageKind, ValidationError};
