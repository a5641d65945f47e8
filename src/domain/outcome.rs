//! Terminal outcomes reported by a negotiation workflow.

use std::fmt;

use serde::Serialize;

use crate::domain::collaboration::{CollaborationId, CollaborationStatus};

/// The single final result a workflow instance reports to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Accepted, contract signed, collaboration now active.
    AcceptedAndSigned,
    /// A counter-offer with a new commission was submitted.
    CounterOffered { counter_commission: f64 },
    /// The request was rejected.
    Rejected,
    /// Closed without completing any transition; the request stays pending.
    Cancelled,
}

impl WorkflowOutcome {
    /// Status update the host should apply to its cached copy, if any.
    pub fn status_update(&self) -> Option<StatusUpdate> {
        match self {
            WorkflowOutcome::AcceptedAndSigned => Some(StatusUpdate {
                status: CollaborationStatus::Active,
                counter_commission: None,
                signed: Some(true),
            }),
            WorkflowOutcome::CounterOffered { counter_commission } => Some(StatusUpdate {
                status: CollaborationStatus::CounterOffer,
                counter_commission: Some(*counter_commission),
                signed: None,
            }),
            WorkflowOutcome::Rejected => Some(StatusUpdate {
                status: CollaborationStatus::Rejected,
                counter_commission: None,
                signed: None,
            }),
            WorkflowOutcome::Cancelled => None,
        }
    }
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowOutcome::AcceptedAndSigned => write!(f, "accepted and signed"),
            WorkflowOutcome::CounterOffered { counter_commission } => {
                write!(f, "counter-offered at {}%", counter_commission)
            }
            WorkflowOutcome::Rejected => write!(f, "rejected"),
            WorkflowOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// New state of a request after a completed transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: CollaborationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_commission: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
}

/// Event delivered to the host view.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowEvent {
    pub request_id: CollaborationId,
    pub outcome: WorkflowOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_offer_update_serializes_with_value() {
        let update =
            WorkflowOutcome::CounterOffered { counter_commission: 20.0 }.status_update().unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"status": "counter_offer", "counter_commission": 20.0})
        );
    }

    #[test]
    fn accepted_update_marks_signed_active() {
        let update = WorkflowOutcome::AcceptedAndSigned.status_update().unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"status": "active", "signed": true})
        );
    }

    #[test]
    fn cancelled_has_no_update() {
        assert!(WorkflowOutcome::Cancelled.status_update().is_none());
    }
}
