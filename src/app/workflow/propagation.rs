//! Delivers the single terminal outcome of a workflow to its host view.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::domain::{CollaborationId, WorkflowEvent, WorkflowOutcome};

/// Create a connected emitter/receiver pair for one workflow instance.
pub fn outcome_channel() -> (OutcomeEmitter, Receiver<WorkflowEvent>) {
    let (sender, receiver) = mpsc::channel();
    (OutcomeEmitter::new(sender), receiver)
}

#[derive(Debug)]
pub struct OutcomeEmitter {
    sender: Sender<WorkflowEvent>,
    emitted: Option<WorkflowOutcome>,
}

impl OutcomeEmitter {
    pub fn new(sender: Sender<WorkflowEvent>) -> Self {
        Self { sender, emitted: None }
    }

    /// Send `outcome` unless one was already sent. Returns whether it was sent.
    pub fn emit(&mut self, request_id: &CollaborationId, outcome: WorkflowOutcome) -> bool {
        if let Some(previous) = &self.emitted {
            log::debug!(
                "dropping {} for {}: workflow already reported {}",
                outcome,
                request_id,
                previous
            );
            return false;
        }

        let event = WorkflowEvent { request_id: request_id.clone(), outcome: outcome.clone() };
        if self.sender.send(event).is_err() {
            log::debug!("host stopped listening before {} was reported", request_id);
        }
        self.emitted = Some(outcome);
        true
    }

    pub fn emitted(&self) -> Option<&WorkflowOutcome> {
        self.emitted.as_ref()
    }
}
