//! Service wiring: stores, credential binder, and the order services.

use std::sync::Arc;

use slotledger_auth::{CredentialBinder, IdentityResolver, SessionCookieSpec};
use slotledger_infra::{
    AppConfig, BookingLedger, InMemoryOrderStore, InMemoryPrincipalStore, InMemoryResourceStore,
    Notifier, OrderVisibilityScoper, PlaceholderRenderer, StoreDirectory, TracingNotifier,
};

pub type Orders = Arc<InMemoryOrderStore>;
pub type Resources = Arc<InMemoryResourceStore>;
pub type Principals = Arc<InMemoryPrincipalStore>;

pub struct AppServices {
    pub config: AppConfig,
    pub orders: Orders,
    pub resources: Resources,
    pub principals: Principals,
    pub binder: Arc<CredentialBinder>,
    pub cookie: SessionCookieSpec,
    pub resolver: IdentityResolver<StoreDirectory<Principals>>,
    pub scoper: OrderVisibilityScoper<Orders, Resources>,
    pub ledger: BookingLedger<Orders, Resources, Arc<dyn Notifier>, PlaceholderRenderer>,
}

impl AppServices {
    /// In-memory stores, emails written to the log.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let orders: Orders = Arc::new(InMemoryOrderStore::new());
        let resources: Resources = Arc::new(InMemoryResourceStore::new());
        let principals: Principals = Arc::new(InMemoryPrincipalStore::new());

        let binder = Arc::new(CredentialBinder::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
        ));
        let cookie = SessionCookieSpec::new(config.session_cookie.clone(), config.token_ttl)
            .secure(config.cookie_secure);
        let resolver = IdentityResolver::new(binder.clone(), StoreDirectory::new(principals.clone()));

        let scoper = OrderVisibilityScoper::new(orders.clone(), resources.clone())
            .with_status_mode(config.status_mode)
            .with_max_page_size(config.max_page_size);
        let ledger = BookingLedger::new(
            orders.clone(),
            resources.clone(),
            notifier,
            PlaceholderRenderer::new(),
        )
        .with_payment_link_base(config.payment_link_base.clone());

        Self {
            config,
            orders,
            resources,
            principals,
            binder,
            cookie,
            resolver,
            scoper,
            ledger,
        }
    }
}
