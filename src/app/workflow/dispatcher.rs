//! Validates the open response form and issues the matching transition.

use crate::app::workflow::presenter::Selection;
use crate::domain::validation::{MessageKind, validate_commission, validate_message};
use crate::domain::{AppError, CollaborationId, WorkflowOutcome};
use crate::ports::{MarketplaceClient, TransitionResponse};

/// A validated transition ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionKind {
    CounterOffer { counter_commission: f64, message: String },
    Reject { reason: String },
}

impl TransitionKind {
    /// Issue the transition. Called exactly once per submission.
    pub fn send<C: MarketplaceClient + ?Sized>(
        &self,
        client: &C,
        id: &CollaborationId,
    ) -> Result<TransitionResponse, AppError> {
        match self {
            TransitionKind::CounterOffer { counter_commission, message } => {
                client.counter_offer(id, *counter_commission, message)
            }
            TransitionKind::Reject { reason } => client.reject(id, reason),
        }
    }

    fn outcome(&self, response: &TransitionResponse) -> WorkflowOutcome {
        match self {
            TransitionKind::CounterOffer { counter_commission, .. } => {
                WorkflowOutcome::CounterOffered {
                    counter_commission: response.counter_commission.unwrap_or(*counter_commission),
                }
            }
            TransitionKind::Reject { .. } => WorkflowOutcome::Rejected,
        }
    }
}

/// Tracks the in-flight submission and the inline error for the open form.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    in_flight: Option<TransitionKind>,
    inline_error: Option<String>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn clear(&mut self) {
        self.inline_error = None;
    }

    /// Validate the open form and mark it in flight.
    ///
    /// Returns `Ok(None)` when a submission is already in flight. Validation
    /// failures are stored inline and returned; nothing is sent.
    pub fn begin(&mut self, selection: &Selection) -> Result<Option<TransitionKind>, AppError> {
        if self.in_flight.is_some() {
            log::debug!("ignoring resubmission while a transition is in flight");
            return Ok(None);
        }

        let kind = match validate_selection(selection) {
            Ok(kind) => kind,
            Err(err) => {
                self.inline_error = Some(err.inline_message());
                return Err(err);
            }
        };

        self.inline_error = None;
        self.in_flight = Some(kind.clone());
        Ok(Some(kind))
    }

    /// Record the server's answer. Returns the outcome on success.
    pub fn finish(
        &mut self,
        result: Result<TransitionResponse, AppError>,
    ) -> Result<WorkflowOutcome, AppError> {
        let Some(kind) = self.in_flight.take() else {
            return Err(AppError::IllegalAction {
                action: "resolve".to_string(),
                state: "no transition is in flight".to_string(),
            });
        };

        match result {
            Ok(response) => Ok(kind.outcome(&response)),
            Err(err) => {
                self.inline_error = Some(err.inline_message());
                Err(err)
            }
        }
    }
}

fn validate_selection(selection: &Selection) -> Result<TransitionKind, AppError> {
    match selection {
        Selection::CounteringWith(draft) => {
            let value = draft.counter_commission.unwrap_or(f64::NAN);
            let counter_commission = validate_commission(value)?;
            let message = validate_message(MessageKind::Justification, &draft.message)?;
            Ok(TransitionKind::CounterOffer { counter_commission, message })
        }
        Selection::RejectingWith(draft) => {
            let reason = validate_message(MessageKind::Reason, &draft.reason)?;
            Ok(TransitionKind::Reject { reason })
        }
        Selection::Accepting | Selection::Selecting => Err(AppError::IllegalAction {
            action: "submit transition".to_string(),
            state: selection.describe(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::workflow::presenter::{CounterDraft, RejectDraft};
    use crate::domain::{CollaborationStatus, ValidationError};

    fn counter(commission: f64, message: &str) -> Selection {
        Selection::CounteringWith(CounterDraft {
            counter_commission: Some(commission),
            message: message.to_string(),
        })
    }

    #[test]
    fn out_of_range_commission_is_stored_inline() {
        let mut dispatcher = ActionDispatcher::new();
        let err = dispatcher.begin(&counter(3.0, "audience mismatch")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::CommissionOutOfRange { .. })
        ));
        assert!(dispatcher.inline_error().unwrap().contains("between 5% and 50%"));
        assert!(!dispatcher.is_in_flight());
    }

    #[test]
    fn missing_commission_is_rejected() {
        let selection = Selection::CounteringWith(CounterDraft {
            counter_commission: None,
            message: "x".into(),
        });
        assert!(ActionDispatcher::new().begin(&selection).is_err());
    }

    #[test]
    fn resubmission_while_in_flight_is_a_noop() {
        let mut dispatcher = ActionDispatcher::new();
        let selection = Selection::RejectingWith(RejectDraft { reason: "not a fit".into() });
        assert!(dispatcher.begin(&selection).unwrap().is_some());
        assert!(dispatcher.begin(&selection).unwrap().is_none());
    }

    #[test]
    fn server_failure_keeps_error_and_releases_guard() {
        let mut dispatcher = ActionDispatcher::new();
        let selection = Selection::RejectingWith(RejectDraft { reason: "not a fit".into() });
        dispatcher.begin(&selection).unwrap();
        let result = dispatcher.finish(Err(AppError::api("HTTP request failed: offline", None)));
        assert!(result.is_err());
        assert_eq!(dispatcher.inline_error(), Some("HTTP request failed: offline"));
        assert!(!dispatcher.is_in_flight());
    }

    #[test]
    fn successful_counter_offer_yields_outcome() {
        let mut dispatcher = ActionDispatcher::new();
        dispatcher.begin(&counter(20.0, "audience mismatch")).unwrap();
        let outcome = dispatcher
            .finish(Ok(TransitionResponse {
                status: CollaborationStatus::CounterOffer,
                counter_commission: Some(20.0),
            }))
            .unwrap();
        assert_eq!(outcome, WorkflowOutcome::CounterOffered { counter_commission: 20.0 });
    }

    #[test]
    fn accept_is_not_a_transition() {
        let err = ActionDispatcher::new().begin(&Selection::Accepting).unwrap_err();
        assert!(matches!(err, AppError::IllegalAction { .. }));
    }
}
