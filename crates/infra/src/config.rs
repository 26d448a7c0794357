//! Configuration loading and representation.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use slotledger_auth::{DEFAULT_SESSION_COOKIE, DEFAULT_TOKEN_TTL_DAYS};
use slotledger_orders::StatusUpdateMode;

use crate::ledger::DEFAULT_PAYMENT_LINK_BASE;
use crate::scoper::DEFAULT_MAX_PAGE_SIZE;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    pub session_cookie: String,
    pub cookie_secure: bool,
    pub payment_link_base: String,
    pub max_page_size: usize,
    pub status_mode: StatusUpdateMode,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("session_cookie", &self.session_cookie)
            .field("cookie_secure", &self.cookie_secure)
            .field("payment_link_base", &self.payment_link_base)
            .field("max_page_size", &self.max_page_size)
            .field("status_mode", &self.status_mode)
            .finish()
    }
}

impl AppConfig {
    /// Settings for tests and local runs; never reads the environment.
    pub fn development() -> Self {
        Self {
            jwt_secret: DEV_SECRET.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            cookie_secure: false,
            payment_link_base: DEFAULT_PAYMENT_LINK_BASE.to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            status_mode: StatusUpdateMode::Permissive,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables take
    /// their defaults; malformed ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::development();

        match get("SLOTLEDGER_JWT_SECRET") {
            Some(secret) => cfg.jwt_secret = secret,
            None => warn!("SLOTLEDGER_JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(v) = get("SLOTLEDGER_BIND_ADDR") {
            cfg.bind_addr = v.parse().map_err(|_| invalid("SLOTLEDGER_BIND_ADDR", &v, "expected host:port"))?;
        }

        if let Some(v) = get("SLOTLEDGER_TOKEN_TTL_DAYS") {
            let days: i64 = v
                .parse()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| invalid("SLOTLEDGER_TOKEN_TTL_DAYS", &v, "expected a positive integer"))?;
            cfg.token_ttl = Duration::try_days(days)
                .ok_or_else(|| invalid("SLOTLEDGER_TOKEN_TTL_DAYS", &v, "out of range"))?;
        }

        if let Some(v) = get("SLOTLEDGER_SESSION_COOKIE") {
            if !v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                return Err(invalid("SLOTLEDGER_SESSION_COOKIE", &v, "not a valid cookie name"));
            }
            cfg.session_cookie = v;
        }

        if let Some(v) = get("SLOTLEDGER_COOKIE_SECURE") {
            cfg.cookie_secure = parse_bool("SLOTLEDGER_COOKIE_SECURE", &v)?;
        }

        if let Some(v) = get("SLOTLEDGER_PAYMENT_LINK_BASE") {
            cfg.payment_link_base = v;
        }

        if let Some(v) = get("SLOTLEDGER_MAX_PAGE_SIZE") {
            cfg.max_page_size = v
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("SLOTLEDGER_MAX_PAGE_SIZE", &v, "expected a positive integer"))?;
        }

        if let Some(v) = get("SLOTLEDGER_STRICT_STATUS") {
            cfg.status_mode = if parse_bool("SLOTLEDGER_STRICT_STATUS", &v)? {
                StatusUpdateMode::Strict
            } else {
                StatusUpdateMode::Permissive
            };
        }

        Ok(cfg)
    }
}

fn invalid(var: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "expected a boolean")),
    }
}
