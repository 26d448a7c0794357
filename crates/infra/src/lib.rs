//! Infrastructure layer: record stores, the order services built on them,
//! outbound notification and configuration.

pub mod config;
pub mod ledger;
pub mod notify;
pub mod ownership;
pub mod scoper;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use config::{AppConfig, ConfigError};
pub use ledger::{BookingLedger, BookingReceipt, LedgerError};
pub use notify::{
    InMemoryOutbox, Notifier, NotifyError, OutboundEmail, PlaceholderRenderer, TemplateContext,
    TemplateRenderer, TracingNotifier,
};
pub use ownership::ResourceOwnershipIndex;
pub use scoper::{OrderVisibilityScoper, ScopeError};
pub use store::{
    InMemoryOrderStore, InMemoryPrincipalStore, InMemoryResourceStore, NewPrincipal, OrderStore,
    PrincipalRecord, PrincipalStore, ResourceStore, StoreDirectory, StoreError,
};
