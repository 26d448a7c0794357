use slotledger_auth::{AuthzError, Capability, Identity, Principal, authorize, authorize_any};

/// Per-request caller context, inserted by the identity middleware.
///
/// Always present on routed requests; anonymous callers carry
/// [`Identity::Anonymous`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    identity: Identity,
    user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(identity: Identity, user_agent: Option<String>) -> Self {
        Self {
            identity,
            user_agent,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Raw `User-Agent`, the client fingerprint bound into issued tokens.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn require(&self, capability: Capability) -> Result<&Principal, AuthzError> {
        authorize(&self.identity, capability)
    }

    pub fn require_any(&self, capabilities: &[Capability]) -> Result<&Principal, AuthzError> {
        authorize_any(&self.identity, capabilities)
    }
}
