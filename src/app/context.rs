use crate::domain::{AppError, SessionConfig, SignerRole};
use crate::ports::MarketplaceClient;

/// Who is acting. Passed into every workflow at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    role: SignerRole,
    actor_id: Option<String>,
}

impl SessionContext {
    pub fn new(role: SignerRole, actor_id: Option<String>) -> Self {
        Self { role, actor_id }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, AppError> {
        Ok(Self::new(config.signer_role()?, config.actor_id.clone()))
    }

    pub fn role(&self) -> SignerRole {
        self.role
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}

/// Application context holding dependencies for command execution.
pub struct AppContext<C: MarketplaceClient> {
    client: C,
    session: SessionContext,
}

impl<C: MarketplaceClient> AppContext<C> {
    /// Create a new application context.
    pub fn new(client: C, session: SessionContext) -> Self {
        Self { client, session }
    }

    /// Get a reference to the marketplace client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get the acting session.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
