//! Read-only view of a collaboration request and the actions legal from it.

use std::fmt::{self, Write as _};

use crate::domain::{AppError, CollaborationRecord, CollaborationRequest};

/// A response the user can pick for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationAction {
    Accept,
    CounterOffer,
    Reject,
}

impl NegotiationAction {
    pub const ALL: [NegotiationAction; 3] =
        [NegotiationAction::Accept, NegotiationAction::CounterOffer, NegotiationAction::Reject];

    pub fn label(&self) -> &'static str {
        match self {
            NegotiationAction::Accept => "accept",
            NegotiationAction::CounterOffer => "counter-offer",
            NegotiationAction::Reject => "reject",
        }
    }
}

impl fmt::Display for NegotiationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user may do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalAction {
    Choose(NegotiationAction),
    SubmitSelected,
    BackToSelection,
}

/// Counter-offer form contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CounterDraft {
    pub counter_commission: Option<f64>,
    pub message: String,
}

/// Rejection form contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RejectDraft {
    pub reason: String,
}

/// Which branch of the response form is open. Each branch owns its own draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Selecting,
    Accepting,
    CounteringWith(CounterDraft),
    RejectingWith(RejectDraft),
}

impl Selection {
    pub fn action(&self) -> Option<NegotiationAction> {
        match self {
            Selection::Selecting => None,
            Selection::Accepting => Some(NegotiationAction::Accept),
            Selection::CounteringWith(_) => Some(NegotiationAction::CounterOffer),
            Selection::RejectingWith(_) => Some(NegotiationAction::Reject),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self.action() {
            None => "choosing a response".to_string(),
            Some(action) => format!("the {} form is open", action),
        }
    }
}

pub struct NegotiationPresenter {
    request: CollaborationRequest,
    selection: Selection,
}

impl NegotiationPresenter {
    /// Validate `record` and present it. Incomplete records are refused.
    pub fn new(record: CollaborationRecord) -> Result<Self, AppError> {
        Ok(Self::from_request(CollaborationRequest::try_from(record)?))
    }

    pub fn from_request(request: CollaborationRequest) -> Self {
        Self { request, selection: Selection::Selecting }
    }

    pub fn request(&self) -> &CollaborationRequest {
        &self.request
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Actions legal from the current request state and local selection.
    pub fn legal_actions(&self) -> Vec<LegalAction> {
        if !self.request.status.is_pending() {
            return Vec::new();
        }
        match self.selection {
            Selection::Selecting => NegotiationAction::ALL.map(LegalAction::Choose).to_vec(),
            _ => vec![LegalAction::SubmitSelected, LegalAction::BackToSelection],
        }
    }

    pub fn select(&mut self, action: NegotiationAction) -> Result<(), AppError> {
        if !self.legal_actions().contains(&LegalAction::Choose(action)) {
            return Err(AppError::IllegalAction {
                action: action.label().to_string(),
                state: self.state_description(),
            });
        }
        self.selection = match action {
            NegotiationAction::Accept => Selection::Accepting,
            NegotiationAction::CounterOffer => Selection::CounteringWith(CounterDraft {
                counter_commission: Some(self.request.proposed_commission),
                message: String::new(),
            }),
            NegotiationAction::Reject => Selection::RejectingWith(RejectDraft::default()),
        };
        Ok(())
    }

    /// Close the open form and discard its draft.
    pub fn back_to_selection(&mut self) -> Result<(), AppError> {
        if !self.legal_actions().contains(&LegalAction::BackToSelection) {
            return Err(AppError::IllegalAction {
                action: "back".to_string(),
                state: self.state_description(),
            });
        }
        self.selection = Selection::Selecting;
        Ok(())
    }

    pub(crate) fn state_description(&self) -> String {
        if self.request.status.is_pending() {
            self.selection.describe()
        } else {
            format!("the request is {}", self.request.status)
        }
    }

    /// Plain-text rendering of the request facts.
    pub fn render(&self) -> String {
        let request = &self.request;
        let mut out = String::new();
        let _ = writeln!(out, "Collaboration {}", request.id);
        let _ = writeln!(out, "  Status:      {}", request.status);
        let _ = writeln!(out, "  Merchant:    {}", request.merchant.label());
        let _ = writeln!(out, "  Influencer:  {}", request.influencer.label());
        let _ = writeln!(out, "  Commission:  {}%", request.proposed_commission);
        if let Some(counter) = request.counter_commission {
            let _ = writeln!(out, "  Counter:     {}%", counter);
        }
        let _ = writeln!(out, "  Products:");
        for product in &request.products {
            match product.price {
                Some(price) => {
                    let _ = writeln!(out, "    - {} ({:.2})", product.name, price);
                }
                None => {
                    let _ = writeln!(out, "    - {}", product.name);
                }
            }
        }
        if let Some(message) = &request.message {
            let _ = writeln!(out, "  Message:     {}", message);
        }
        if let Some(created_at) = request.created_at {
            let _ = writeln!(out, "  Created:     {}", created_at.format("%Y-%m-%d %H:%M UTC"));
        }
        if let Some(reviewed_at) = request.reviewed_at {
            let _ = writeln!(out, "  Reviewed:    {}", reviewed_at.format("%Y-%m-%d %H:%M UTC"));
        }
        out
    }
}
