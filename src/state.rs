//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the optional LLM client, the assistant rate
//! limiter and the startup-time settings handlers need per request.

use std::sync::Arc;

use sqlx::PgPool;

use crate::env::{env_bool, env_string};
use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;

/// Resend credentials for access-code delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
}

impl EmailConfig {
    /// `None` unless both `RESEND_API_KEY` and `RESEND_FROM` are set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_parts(env_string("RESEND_API_KEY"), env_string("RESEND_FROM"))
    }

    fn from_parts(api_key: Option<String>, from: Option<String>) -> Option<Self> {
        Some(Self { api_key: api_key?, from: from? })
    }
}

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` when no LLM is configured; assistant routes answer 503.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub rate_limiter: RateLimiter,
    pub email: Option<EmailConfig>,
    pub cookie_secure: bool,
    /// Return login codes in the response body. Local development only.
    pub echo_login_codes: bool,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self {
            pool,
            llm,
            rate_limiter: RateLimiter::new(),
            email: EmailConfig::from_env(),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),
            echo_login_codes: env_bool("AUTH_ECHO_CODES").unwrap_or(false),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
