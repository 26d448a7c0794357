use slotledger_auth::{Principal, PrincipalDirectory};
use tracing::warn;

use super::PrincipalStore;

/// Exposes a [`PrincipalStore`] to the identity resolver.
///
/// Store failures resolve to "unknown principal"; the request then proceeds
/// as anonymous.
#[derive(Debug, Clone)]
pub struct StoreDirectory<S> {
    store: S,
}

impl<S> StoreDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: PrincipalStore> PrincipalDirectory for StoreDirectory<S> {
    fn find_by_email(&self, email: &str) -> Option<Principal> {
        match self.store.find_by_email(email) {
            Ok(record) => record.map(|r| r.principal),
            Err(e) => {
                warn!(error = %e, "principal lookup failed");
                None
            }
        }
    }
}
